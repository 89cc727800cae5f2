//! Business logic powering the admin REST routes: question authoring and the
//! player overview.

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        admin::{QuestionInput, QuestionSummary},
        player::PlayerSummary,
    },
    error::ServiceError,
    state::SharedState,
};

/// Every question, sorted by ascending order.
pub async fn list_questions(state: &SharedState) -> Result<Vec<QuestionSummary>, ServiceError> {
    let store = state.require_hunt_store().await?;
    let questions = store.list_questions().await?;
    Ok(questions.into_iter().map(Into::into).collect())
}

async fn ensure_order_free(
    state: &SharedState,
    order: u32,
    exclude: Option<Uuid>,
) -> Result<(), ServiceError> {
    let store = state.require_hunt_store().await?;
    match store.find_question_by_order(order).await? {
        Some(existing) if Some(existing.id) != exclude => Err(ServiceError::InvalidState(
            format!("order {order} is already used by question `{}`", existing.id),
        )),
        _ => Ok(()),
    }
}

/// Persist a new question; its order must not be taken.
pub async fn create_question(
    state: &SharedState,
    input: QuestionInput,
) -> Result<QuestionSummary, ServiceError> {
    let _writes = state.lock_question_writes().await;
    ensure_order_free(state, input.order, None).await?;

    let store = state.require_hunt_store().await?;
    let entity = input.into_entity(Uuid::new_v4());
    store.save_question(entity.clone()).await?;
    info!(question_id = %entity.id, order = entity.order, "question created");
    Ok(entity.into())
}

/// Replace the question `id` with `input`.
pub async fn update_question(
    state: &SharedState,
    id: Uuid,
    input: QuestionInput,
) -> Result<QuestionSummary, ServiceError> {
    let store = state.require_hunt_store().await?;
    if store.find_question(id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("question `{id}` not found")));
    }
    let _writes = state.lock_question_writes().await;
    ensure_order_free(state, input.order, Some(id)).await?;

    let entity = input.into_entity(id);
    store.save_question(entity.clone()).await?;
    info!(question_id = %id, order = entity.order, "question updated");
    Ok(entity.into())
}

/// Remove the question `id`; players already past its order keep their progress.
pub async fn delete_question(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_hunt_store().await?;
    if !store.delete_question(id).await? {
        return Err(ServiceError::NotFound(format!("question `{id}` not found")));
    }
    info!(question_id = %id, "question deleted");
    Ok(())
}

/// Every registered player with their progress.
pub async fn list_users(state: &SharedState) -> Result<Vec<PlayerSummary>, ServiceError> {
    let store = state.require_hunt_store().await?;
    let users = store.list_users().await?;
    Ok(users.iter().map(Into::into).collect())
}
