use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        admin::{QuestionInput, QuestionSummary},
        player::PlayerSummary,
    },
    error::AppError,
    services::{admin_service, identity_service},
    state::SharedState,
};

/// Admin-only endpoints for authoring questions and following players.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(
            "/admin/questions",
            get(list_questions).post(create_question),
        )
        .route(
            "/admin/questions/{id}",
            put(update_question).delete(delete_question),
        )
        .route("/admin/users", get(list_users))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// List every question by ascending order.
#[utoipa::path(
    get,
    path = "/admin/questions",
    tag = "admin",
    params(("X-Player-Id" = String, Header, description = "Identity of an admin profile")),
    responses((status = 200, description = "Question bank", body = [QuestionSummary]))
)]
pub async fn list_questions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<QuestionSummary>>, AppError> {
    Ok(Json(admin_service::list_questions(&state).await?))
}

/// Add a question to the hunt.
#[utoipa::path(
    post,
    path = "/admin/questions",
    tag = "admin",
    params(("X-Player-Id" = String, Header, description = "Identity of an admin profile")),
    request_body = QuestionInput,
    responses(
        (status = 201, description = "Question created", body = QuestionSummary),
        (status = 409, description = "Order already used")
    )
)]
pub async fn create_question(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<QuestionInput>>,
) -> Result<(StatusCode, Json<QuestionSummary>), AppError> {
    let created = admin_service::create_question(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing question.
#[utoipa::path(
    put,
    path = "/admin/questions/{id}",
    tag = "admin",
    params(("X-Player-Id" = String, Header, description = "Identity of an admin profile"),
    ("id" = String, Path, description = "Identifier of the question to replace")),
    request_body = QuestionInput,
    responses(
        (status = 200, description = "Question updated", body = QuestionSummary),
        (status = 404, description = "Unknown question"),
        (status = 409, description = "Order already used")
    )
)]
pub async fn update_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<QuestionInput>>,
) -> Result<Json<QuestionSummary>, AppError> {
    Ok(Json(
        admin_service::update_question(&state, id, payload).await?,
    ))
}

/// Remove a question.
#[utoipa::path(
    delete,
    path = "/admin/questions/{id}",
    tag = "admin",
    params(("X-Player-Id" = String, Header, description = "Identity of an admin profile"),
    ("id" = String, Path, description = "Identifier of the question to delete")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Unknown question")
    )
)]
pub async fn delete_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    admin_service::delete_question(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every registered player with their progress.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(("X-Player-Id" = String, Header, description = "Identity of an admin profile")),
    responses((status = 200, description = "Players", body = [PlayerSummary]))
)]
pub async fn list_users(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PlayerSummary>>, AppError> {
    Ok(Json(admin_service::list_users(&state).await?))
}

async fn require_admin(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let raw = req
        .headers()
        .get(identity_service::PLAYER_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    let identity = identity_service::parse_identity(raw)?;

    identity_service::require_admin(&state, &identity).await?;
    Ok(next.run(req).await)
}
