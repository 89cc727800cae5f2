//! Player-facing operations. Each call reads the player's profile and the
//! question they address, asks the [`ProgressController`] for a decision and
//! persists the mutations it returns.
//!
//! [`ProgressController`]: crate::progress::ProgressController

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    dao::{
        hunt_store::HuntStore,
        models::{ProgressUpdate, UserEntity},
    },
    dto::player::{
        AnswerRequest, CurrentQuestionResponse, PlayerSummary, RegisterRequest,
        SubmissionResponse, UnlockRequest,
    },
    error::ServiceError,
    progress::{Mutation, Outcome, ProgressError, Question, Resolution, UserProgress},
    state::{PendingUnlock, SharedState},
};

async fn load_user(store: &Arc<dyn HuntStore>, identity: &str) -> Result<UserEntity, ServiceError> {
    store
        .find_user(identity.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("player `{identity}` is not registered")))
}

fn ensure_not_completed(user: &UserEntity) -> Result<(), ServiceError> {
    if user.completed_at.is_some() {
        return Err(ServiceError::InvalidState(
            "the hunt is already won for this player".into(),
        ));
    }
    Ok(())
}

async fn apply_mutations(
    store: &Arc<dyn HuntStore>,
    mutations: Vec<Mutation>,
) -> Result<(), ServiceError> {
    for mutation in mutations {
        match mutation {
            Mutation::AdvanceTo { identity, order } => {
                let updated = store
                    .update_progress(identity.clone(), ProgressUpdate::advance_to(order))
                    .await?;
                if !updated {
                    return Err(ServiceError::NotFound(format!(
                        "player `{identity}` disappeared while advancing"
                    )));
                }
                info!(player_id = %identity, order, "player advanced");
            }
        }
    }
    Ok(())
}

/// Create the profile of `identity`, or return the existing one untouched.
pub async fn register(
    state: &SharedState,
    identity: &str,
    request: RegisterRequest,
) -> Result<PlayerSummary, ServiceError> {
    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "display name must not be empty".into(),
        ));
    }
    let max_len = state.config().display_name_max_len();
    if display_name.chars().count() > max_len {
        return Err(ServiceError::InvalidInput(format!(
            "display name must be at most {max_len} characters"
        )));
    }

    let store = state.require_hunt_store().await?;
    if let Some(existing) = store.find_user(identity.to_owned()).await? {
        debug!(player_id = %identity, "player already registered; continuing");
        return Ok((&existing).into());
    }

    let user = UserEntity::new_player(identity.to_owned(), display_name.to_owned());
    store.save_user(user.clone()).await?;
    info!(player_id = %identity, display_name = %user.display_name, "player registered");
    Ok((&user).into())
}

/// Profile and progress of `identity`.
pub async fn profile(state: &SharedState, identity: &str) -> Result<PlayerSummary, ServiceError> {
    let store = state.require_hunt_store().await?;
    let user = load_user(&store, identity).await?;
    Ok((&user).into())
}

/// Question the player should answer next, or completion.
pub async fn current_question(
    state: &SharedState,
    identity: &str,
) -> Result<CurrentQuestionResponse, ServiceError> {
    let store = state.require_hunt_store().await?;
    let user = load_user(&store, identity).await?;
    if user.completed_at.is_some() {
        return Ok(CurrentQuestionResponse::Complete {
            redemption_code: user.redemption_code,
        });
    }

    let progress = UserProgress::from(&user);
    let candidate: Option<Question> = store
        .find_question_by_order(progress.current_question_order)
        .await?
        .map(Into::into);

    match state
        .controller()
        .resolve_current_question(&progress, candidate.iter())
    {
        Resolution::Question(question) => {
            let pending_clue = state
                .pending_unlocks()
                .get(identity)
                .filter(|pending| pending.order == question.order)
                .map(|pending| pending.clue);
            Ok(CurrentQuestionResponse::question(question, pending_clue))
        }
        Resolution::GameComplete => Ok(CurrentQuestionResponse::Complete {
            redemption_code: user.redemption_code,
        }),
    }
}

/// Check an answer to the question of order `request.order`.
pub async fn submit_answer(
    state: &SharedState,
    identity: &str,
    request: AnswerRequest,
) -> Result<SubmissionResponse, ServiceError> {
    let store = state.require_hunt_store().await?;
    let user = load_user(&store, identity).await?;
    ensure_not_completed(&user)?;
    let progress = UserProgress::from(&user);

    let Some(entity) = store.find_question_by_order(request.order).await? else {
        if request.order != progress.current_question_order {
            return Err(ProgressError::NotAddressable {
                submitted: request.order,
                current: progress.current_question_order,
            }
            .into());
        }
        return Err(ServiceError::InvalidState(
            "no question left to answer; the hunt is complete".into(),
        ));
    };
    let question = Question::from(entity);

    let decision = state
        .controller()
        .submit_answer(&progress, &question, &request.answer)?;
    apply_mutations(&store, decision.mutations).await?;

    let response = match decision.outcome {
        Outcome::Incorrect => {
            debug!(player_id = %identity, order = question.order, "incorrect answer");
            SubmissionResponse::Incorrect
        }
        Outcome::Advanced { next_order } => {
            state.pending_unlocks().clear(identity, question.order);
            SubmissionResponse::Advanced {
                next_order,
                clue: Some(question.correct_response_text),
            }
        }
        Outcome::AwaitingUnlock { order, unlock_code } => {
            state.pending_unlocks().remember(
                identity,
                PendingUnlock {
                    order,
                    unlock_code,
                    clue: question.correct_response_text.clone(),
                },
            );
            debug!(player_id = %identity, order, "answer accepted; awaiting unlock code");
            SubmissionResponse::AwaitingUnlock {
                order,
                clue: question.correct_response_text,
            }
        }
        Outcome::GameWon { redemption_code } => {
            let recorded = store
                .update_progress(
                    identity.to_owned(),
                    ProgressUpdate::completed(redemption_code.clone()),
                )
                .await?;
            if !recorded {
                return Err(ServiceError::NotFound(format!(
                    "player `{identity}` disappeared before the win was recorded"
                )));
            }
            state.pending_unlocks().clear(identity, question.order);
            info!(player_id = %identity, code = %redemption_code, "hunt won");
            SubmissionResponse::GameWon {
                redemption_code,
                clue: question.correct_response_text,
            }
        }
    };

    Ok(response)
}

/// Check the unlock code of the question whose answer was last accepted.
pub async fn submit_unlock(
    state: &SharedState,
    identity: &str,
    request: UnlockRequest,
) -> Result<SubmissionResponse, ServiceError> {
    let pending = state.pending_unlocks().get(identity).ok_or_else(|| {
        ServiceError::InvalidState("no accepted answer is waiting for an unlock code".into())
    })?;

    let store = state.require_hunt_store().await?;
    let user = load_user(&store, identity).await?;
    ensure_not_completed(&user)?;
    let progress = UserProgress::from(&user);

    let decision = match state.controller().submit_unlock_code(
        &progress,
        pending.order,
        &pending.unlock_code,
        &request.code,
    ) {
        Ok(decision) => decision,
        Err(err) => {
            state.pending_unlocks().clear(identity, pending.order);
            return Err(err.into());
        }
    };
    apply_mutations(&store, decision.mutations).await?;

    match decision.outcome {
        Outcome::Advanced { next_order } => {
            state.pending_unlocks().clear(identity, pending.order);
            Ok(SubmissionResponse::Advanced {
                next_order,
                clue: Some(pending.clue),
            })
        }
        _ => {
            debug!(player_id = %identity, order = pending.order, "incorrect unlock code");
            Ok(SubmissionResponse::Incorrect)
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{hunt_store::memory::MemoryHuntStore, models::QuestionEntity, storage::StorageResult},
        progress::redemption::RedemptionCodeGenerator,
        state::AppState,
    };

    fn question(order: u32, answer: &str, unlock: Option<&str>, last: bool) -> QuestionEntity {
        QuestionEntity {
            id: Uuid::new_v4(),
            order,
            question_text: format!("Question {order}"),
            answer: answer.into(),
            correct_response_text: format!("Clue {order}"),
            unlock_code: unlock.map(Into::into),
            is_last_question: last,
        }
    }

    async fn state_with(questions: Vec<QuestionEntity>) -> (SharedState, MemoryHuntStore) {
        let store = MemoryHuntStore::new();
        for q in questions {
            store.save_question(q).await.unwrap();
        }
        let state = AppState::new(AppConfig::default());
        state.install_hunt_store(Arc::new(store.clone())).await;
        (state, store)
    }

    async fn registered(state: &SharedState, id: &str) {
        register(
            state,
            id,
            RegisterRequest {
                display_name: "Ada".into(),
            },
        )
        .await
        .unwrap();
    }

    fn answer(order: u32, text: &str) -> AnswerRequest {
        AnswerRequest {
            order,
            answer: text.into(),
        }
    }

    fn unlock(code: &str) -> UnlockRequest {
        UnlockRequest { code: code.into() }
    }

    #[tokio::test]
    async fn registration_is_idempotent() {
        let (state, store) = state_with(vec![question(1, "a", None, false)]).await;
        registered(&state, "p1").await;
        store
            .update_progress("p1".into(), ProgressUpdate::advance_to(3))
            .await
            .unwrap();

        let again = register(
            &state,
            "p1",
            RegisterRequest {
                display_name: "Someone else".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(again.current_question_order, 3);
        assert_eq!(again.display_name, "Ada");
    }

    #[tokio::test]
    async fn overlong_display_name_is_rejected() {
        let (state, _) = state_with(vec![]).await;
        let result = register(
            &state,
            "p1",
            RegisterRequest {
                display_name: "x".repeat(65),
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn unregistered_player_is_not_found() {
        let (state, _) = state_with(vec![question(1, "a", None, false)]).await;
        assert!(matches!(
            current_question(&state, "ghost").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            submit_answer(&state, "ghost", answer(1, "a")).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn correct_answer_without_unlock_advances() {
        let (state, store) = state_with(vec![
            question(1, "paris", None, false),
            question(2, "rome", None, false),
        ])
        .await;
        registered(&state, "p1").await;

        let wrong = submit_answer(&state, "p1", answer(1, "lyon")).await.unwrap();
        assert_eq!(wrong, SubmissionResponse::Incorrect);

        let right = submit_answer(&state, "p1", answer(1, "  PARIS ")).await.unwrap();
        assert_eq!(
            right,
            SubmissionResponse::Advanced {
                next_order: 2,
                clue: Some("Clue 1".into())
            }
        );

        let user = store.find_user("p1".into()).await.unwrap().unwrap();
        assert_eq!(user.current_question_order, 2);
        assert!(matches!(
            current_question(&state, "p1").await.unwrap(),
            CurrentQuestionResponse::Question { order: 2, .. }
        ));
    }

    #[tokio::test]
    async fn duplicated_answer_is_rejected_as_stale() {
        let (state, store) = state_with(vec![
            question(1, "a", None, false),
            question(2, "b", None, false),
        ])
        .await;
        registered(&state, "p1").await;

        submit_answer(&state, "p1", answer(1, "a")).await.unwrap();
        let replay = submit_answer(&state, "p1", answer(1, "a")).await;
        assert!(matches!(replay, Err(ServiceError::InvalidState(_))));

        let user = store.find_user("p1".into()).await.unwrap().unwrap();
        assert_eq!(user.current_question_order, 2);
    }

    #[tokio::test]
    async fn unlock_flow_requires_the_right_code() {
        let (state, store) = state_with(vec![
            question(1, "fountain", Some("QR-1"), false),
            question(2, "bridge", None, false),
        ])
        .await;
        registered(&state, "p1").await;

        assert!(matches!(
            submit_unlock(&state, "p1", unlock("QR-1")).await,
            Err(ServiceError::InvalidState(_))
        ));

        let accepted = submit_answer(&state, "p1", answer(1, "Fountain")).await.unwrap();
        assert_eq!(
            accepted,
            SubmissionResponse::AwaitingUnlock {
                order: 1,
                clue: "Clue 1".into()
            }
        );
        assert!(matches!(
            current_question(&state, "p1").await.unwrap(),
            CurrentQuestionResponse::Question {
                order: 1,
                awaiting_unlock: true,
                ..
            }
        ));

        let wrong = submit_unlock(&state, "p1", unlock("QR-2")).await.unwrap();
        assert_eq!(wrong, SubmissionResponse::Incorrect);
        let user = store.find_user("p1".into()).await.unwrap().unwrap();
        assert_eq!(user.current_question_order, 1);

        let right = submit_unlock(&state, "p1", unlock(" qr-1 ")).await.unwrap();
        assert!(matches!(
            right,
            SubmissionResponse::Advanced { next_order: 2, .. }
        ));

        let replay = submit_unlock(&state, "p1", unlock("QR-1")).await;
        assert!(matches!(replay, Err(ServiceError::InvalidState(_))));
        let user = store.find_user("p1".into()).await.unwrap().unwrap();
        assert_eq!(user.current_question_order, 2);
    }

    #[tokio::test]
    async fn stale_pending_unlock_is_dropped() {
        let (state, store) = state_with(vec![
            question(1, "a", Some("QR-1"), false),
            question(2, "b", None, false),
        ])
        .await;
        registered(&state, "p1").await;
        submit_answer(&state, "p1", answer(1, "a")).await.unwrap();

        store
            .update_progress("p1".into(), ProgressUpdate::advance_to(2))
            .await
            .unwrap();

        assert!(matches!(
            submit_unlock(&state, "p1", unlock("QR-1")).await,
            Err(ServiceError::InvalidState(_))
        ));
        assert!(state.pending_unlocks().get("p1").is_none());
    }

    #[tokio::test]
    async fn full_hunt_ends_with_a_recorded_win() {
        let (state, store) = state_with(vec![
            question(1, "one", None, false),
            question(2, "two", Some("QR-2"), false),
            question(3, "key", None, true),
        ])
        .await;
        registered(&state, "p1").await;

        submit_answer(&state, "p1", answer(1, "one")).await.unwrap();
        submit_answer(&state, "p1", answer(2, "two")).await.unwrap();
        submit_unlock(&state, "p1", unlock("QR-2")).await.unwrap();

        let won = submit_answer(&state, "p1", answer(3, "KEY")).await.unwrap();
        let SubmissionResponse::GameWon { redemption_code, .. } = won else {
            panic!("expected a win");
        };
        assert!(RedemptionCodeGenerator::default().matches_shape(&redemption_code));

        let user = store.find_user("p1".into()).await.unwrap().unwrap();
        assert_eq!(user.current_question_order, 3);
        assert_eq!(user.redemption_code.as_deref(), Some(redemption_code.as_str()));
        assert!(user.completed_at.is_some());

        assert_eq!(
            current_question(&state, "p1").await.unwrap(),
            CurrentQuestionResponse::Complete {
                redemption_code: Some(redemption_code)
            }
        );
        assert!(matches!(
            submit_answer(&state, "p1", answer(3, "key")).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    /// Store that forgets every progress write, as if the player document vanished.
    struct ForgetfulStore(MemoryHuntStore);

    impl HuntStore for ForgetfulStore {
        fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
            self.0.find_user(id)
        }
        fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.0.save_user(user)
        }
        fn update_progress(
            &self,
            _id: String,
            _update: ProgressUpdate,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            Box::pin(async { Ok(false) })
        }
        fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
            self.0.list_users()
        }
        fn find_question(
            &self,
            id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
            self.0.find_question(id)
        }
        fn find_question_by_order(
            &self,
            order: u32,
        ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
            self.0.find_question_by_order(order)
        }
        fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
            self.0.list_questions()
        }
        fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.0.save_question(question)
        }
        fn delete_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            self.0.delete_question(id)
        }
        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.0.health_check()
        }
        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.0.try_reconnect()
        }
    }

    #[tokio::test]
    async fn unrecorded_win_is_not_reported() {
        let inner = MemoryHuntStore::new();
        inner.save_question(question(1, "key", None, true)).await.unwrap();
        inner
            .save_user(UserEntity::new_player("p1".into(), "Ada".into()))
            .await
            .unwrap();
        let state = AppState::new(AppConfig::default());
        state.install_hunt_store(Arc::new(ForgetfulStore(inner))).await;

        assert!(matches!(
            submit_answer(&state, "p1", answer(1, "key")).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn exhausted_bank_reports_completion() {
        let (state, store) = state_with(vec![question(1, "a", None, false)]).await;
        registered(&state, "p1").await;
        store
            .update_progress("p1".into(), ProgressUpdate::advance_to(2))
            .await
            .unwrap();

        assert_eq!(
            current_question(&state, "p1").await.unwrap(),
            CurrentQuestionResponse::Complete {
                redemption_code: None
            }
        );
        assert!(matches!(
            submit_answer(&state, "p1", answer(2, "a")).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn degraded_mode_is_surfaced() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            profile(&state, "p1").await,
            Err(ServiceError::Degraded)
        ));
    }
}
