use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::player::{
        AnswerRequest, CurrentQuestionResponse, PlayerSummary, RegisterRequest,
        SubmissionResponse, UnlockRequest,
    },
    error::AppError,
    routes::PlayerId,
    services::player_service,
    state::SharedState,
};

/// Routes a player uses to register and walk through the hunt.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players/register", post(register))
        .route("/players/me", get(profile))
        .route("/players/me/question", get(current_question))
        .route("/players/me/answer", post(submit_answer))
        .route("/players/me/unlock", post(submit_unlock))
}

/// Create the caller's profile, or continue an existing one.
#[utoipa::path(
    post,
    path = "/players/register",
    tag = "player",
    params(("X-Player-Id" = String, Header, description = "Identity issued by /auth/anonymous")),
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Profile created or continued", body = PlayerSummary),
        (status = 400, description = "Invalid display name"),
        (status = 401, description = "Missing or malformed identity")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    PlayerId(identity): PlayerId,
    Valid(Json(payload)): Valid<Json<RegisterRequest>>,
) -> Result<Json<PlayerSummary>, AppError> {
    Ok(Json(
        player_service::register(&state, &identity, payload).await?,
    ))
}

/// Caller's profile and progress.
#[utoipa::path(
    get,
    path = "/players/me",
    tag = "player",
    params(("X-Player-Id" = String, Header, description = "Identity issued by /auth/anonymous")),
    responses(
        (status = 200, description = "Profile", body = PlayerSummary),
        (status = 404, description = "Player not registered")
    )
)]
pub async fn profile(
    State(state): State<SharedState>,
    PlayerId(identity): PlayerId,
) -> Result<Json<PlayerSummary>, AppError> {
    Ok(Json(player_service::profile(&state, &identity).await?))
}

/// Question the caller should answer next.
#[utoipa::path(
    get,
    path = "/players/me/question",
    tag = "player",
    params(("X-Player-Id" = String, Header, description = "Identity issued by /auth/anonymous")),
    responses(
        (status = 200, description = "Current question or completion", body = CurrentQuestionResponse),
        (status = 404, description = "Player not registered")
    )
)]
pub async fn current_question(
    State(state): State<SharedState>,
    PlayerId(identity): PlayerId,
) -> Result<Json<CurrentQuestionResponse>, AppError> {
    Ok(Json(
        player_service::current_question(&state, &identity).await?,
    ))
}

/// Submit an answer to the current question.
#[utoipa::path(
    post,
    path = "/players/me/answer",
    tag = "player",
    params(("X-Player-Id" = String, Header, description = "Identity issued by /auth/anonymous")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Submission outcome", body = SubmissionResponse),
        (status = 404, description = "Player not registered"),
        (status = 409, description = "Question is not the current one, or the hunt is over")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    PlayerId(identity): PlayerId,
    Valid(Json(payload)): Valid<Json<AnswerRequest>>,
) -> Result<Json<SubmissionResponse>, AppError> {
    Ok(Json(
        player_service::submit_answer(&state, &identity, payload).await?,
    ))
}

/// Submit the unlock code of the question whose answer was accepted.
#[utoipa::path(
    post,
    path = "/players/me/unlock",
    tag = "player",
    params(("X-Player-Id" = String, Header, description = "Identity issued by /auth/anonymous")),
    request_body = UnlockRequest,
    responses(
        (status = 200, description = "Submission outcome", body = SubmissionResponse),
        (status = 409, description = "No answer is waiting for an unlock code")
    )
)]
pub async fn submit_unlock(
    State(state): State<SharedState>,
    PlayerId(identity): PlayerId,
    Valid(Json(payload)): Valid<Json<UnlockRequest>>,
) -> Result<Json<SubmissionResponse>, AppError> {
    Ok(Json(
        player_service::submit_unlock(&state, &identity, payload).await?,
    ))
}
