//! Process-local store used for development runs and tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    hunt_store::HuntStore,
    models::{ProgressUpdate, QuestionEntity, UserEntity},
    storage::StorageResult,
};

/// In-memory [`HuntStore`]; players keep their registration order.
#[derive(Clone, Default)]
pub struct MemoryHuntStore {
    users: Arc<RwLock<IndexMap<String, UserEntity>>>,
    questions: Arc<DashMap<Uuid, QuestionEntity>>,
}

impl MemoryHuntStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HuntStore for MemoryHuntStore {
    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.users.read().await.get(&id).cloned()) })
    }

    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.users.write().await.insert(user.id.clone(), user);
            Ok(())
        })
    }

    fn update_progress(
        &self,
        id: String,
        update: ProgressUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut users = store.users.write().await;
            let Some(user) = users.get_mut(&id) else {
                return Ok(false);
            };
            update.apply_to(user);
            Ok(true)
        })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.users.read().await.values().cloned().collect()) })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.questions.get(&id).map(|entry| entry.value().clone())) })
    }

    fn find_question_by_order(
        &self,
        order: u32,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .questions
                .iter()
                .find(|entry| entry.order == order)
                .map(|entry| entry.value().clone()))
        })
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut questions = store
                .questions
                .iter()
                .map(|entry| entry.value().clone())
                .collect::<Vec<_>>();
            questions.sort_by_key(|question| question.order);
            Ok(questions)
        })
    }

    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.questions.insert(question.id, question);
            Ok(())
        })
    }

    fn delete_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.questions.remove(&id).is_some()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
