use axum::{
    Router,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::{error::AppError, services::identity_service, state::SharedState};

pub mod admin;
pub mod auth;
pub mod docs;
pub mod health;
pub mod player;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(auth::router())
        .merge(player::router())
        .merge(admin::router(state.clone()))
        .merge(docs::router());

    api_router.with_state(state)
}

/// Caller identity taken from the `X-Player-Id` header.
#[derive(Debug, Clone)]
pub struct PlayerId(pub String);

impl<S> FromRequestParts<S> for PlayerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(identity_service::PLAYER_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        identity_service::parse_identity(raw)
            .map(PlayerId)
            .map_err(Into::into)
    }
}
