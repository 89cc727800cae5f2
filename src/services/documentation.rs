use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for Treasure Hunt Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::anonymous,
        crate::routes::player::register,
        crate::routes::player::profile,
        crate::routes::player::current_question,
        crate::routes::player::submit_answer,
        crate::routes::player::submit_unlock,
        crate::routes::admin::list_questions,
        crate::routes::admin::create_question,
        crate::routes::admin::update_question,
        crate::routes::admin::delete_question,
        crate::routes::admin::list_users,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::player::AnonymousIdentity,
            crate::dto::player::RegisterRequest,
            crate::dto::player::AnswerRequest,
            crate::dto::player::UnlockRequest,
            crate::dto::player::PlayerSummary,
            crate::dto::player::CurrentQuestionResponse,
            crate::dto::player::SubmissionResponse,
            crate::dto::admin::QuestionInput,
            crate::dto::admin::QuestionSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Anonymous identities"),
        (name = "player", description = "Registration and progress through the hunt"),
        (name = "admin", description = "Question authoring and player overview"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/auth/anonymous",
            "/players/register",
            "/players/me",
            "/players/me/question",
            "/players/me/answer",
            "/players/me/unlock",
            "/admin/questions",
            "/admin/questions/{id}",
            "/admin/users",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
