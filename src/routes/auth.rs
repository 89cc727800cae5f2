use axum::{Json, Router, routing::post};

use crate::{dto::player::AnonymousIdentity, services::identity_service, state::SharedState};

/// Issue a fresh anonymous identity to use as `X-Player-Id`.
#[utoipa::path(
    post,
    path = "/auth/anonymous",
    tag = "auth",
    responses((status = 200, description = "Identity issued", body = AnonymousIdentity))
)]
pub async fn anonymous() -> Json<AnonymousIdentity> {
    Json(identity_service::issue_anonymous())
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/auth/anonymous", post(anonymous))
}
