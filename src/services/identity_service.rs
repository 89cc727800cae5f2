use tracing::{debug, warn};

use crate::{
    dao::models::{RoleEntity, UserEntity},
    dto::{
        player::AnonymousIdentity,
        validation::{new_player_id, validate_player_id},
    },
    error::ServiceError,
    state::SharedState,
};

/// Header carrying the caller identity on every player and admin request.
pub const PLAYER_ID_HEADER: &str = "x-player-id";

/// Issue a fresh anonymous identity; no document is created until registration.
pub fn issue_anonymous() -> AnonymousIdentity {
    let player_id = new_player_id();
    debug!(player_id = %player_id, "issued anonymous identity");
    AnonymousIdentity { player_id }
}

/// Turn the raw `X-Player-Id` header value into a usable identity.
pub fn parse_identity(raw: Option<&str>) -> Result<String, ServiceError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("missing player id header `X-Player-Id`".into()))?;

    validate_player_id(raw).map_err(|err| {
        ServiceError::Unauthorized(
            err.message
                .map(|message| message.into_owned())
                .unwrap_or_else(|| "invalid player id".into()),
        )
    })?;

    Ok(raw.to_owned())
}

/// Load the profile of `identity` and check it carries the admin role.
pub async fn require_admin(state: &SharedState, identity: &str) -> Result<UserEntity, ServiceError> {
    let store = state.require_hunt_store().await?;
    let user = store
        .find_user(identity.to_owned())
        .await?
        .ok_or_else(|| ServiceError::Unauthorized(format!("unknown player `{identity}`")))?;

    if user.role != RoleEntity::Admin {
        warn!(player_id = %identity, "admin route refused");
        return Err(ServiceError::Forbidden("admin role required".into()));
    }

    Ok(user)
}
