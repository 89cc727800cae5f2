#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{ProgressUpdate, QuestionEntity, UserEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the document store holding the `users` and `questions` collections.
pub trait HuntStore: Send + Sync {
    /// Get a player document by identity.
    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Insert or replace a player document.
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Merge `update` into an existing player document; `false` when the player is unknown.
    fn update_progress(
        &self,
        id: String,
        update: ProgressUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Every player document, in no particular order.
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Get a question by document identifier.
    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Get the question whose `order` equals `order`.
    fn find_question_by_order(
        &self,
        order: u32,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Every question, sorted by ascending `order`.
    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Insert or replace a question document.
    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove a question; `false` when it did not exist.
    fn delete_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Cheap round trip used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
