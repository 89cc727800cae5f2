use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoQuestionDocument, MongoUserDocument, doc_id, order_filter, progress_set},
};
use crate::dao::{
    hunt_store::HuntStore,
    models::{ProgressUpdate, QuestionEntity, UserEntity},
    storage::StorageResult,
};

const USER_COLLECTION_NAME: &str = "users";
const QUESTION_COLLECTION_NAME: &str = "questions";

/// MongoDB-backed [`HuntStore`].
#[derive(Clone)]
pub struct MongoHuntStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

impl MongoHuntStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let index = IndexModel::builder()
            .keys(doc! {"order": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("question_order_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        self.question_collection()
            .await
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: QUESTION_COLLECTION_NAME,
                index: "order",
                source,
            })?;

        Ok(())
    }

    async fn user_collection(&self) -> Collection<MongoUserDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoUserDocument>(USER_COLLECTION_NAME)
    }

    async fn question_collection(&self) -> Collection<MongoQuestionDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoQuestionDocument>(QUESTION_COLLECTION_NAME)
    }

    async fn find_user(&self, id: String) -> MongoResult<Option<UserEntity>> {
        let document = self
            .user_collection()
            .await
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadUser { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn save_user(&self, user: UserEntity) -> MongoResult<()> {
        let id = user.id.clone();
        let document: MongoUserDocument = user.into();
        self.user_collection()
            .await
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveUser { id, source })?;

        Ok(())
    }

    async fn update_progress(&self, id: String, update: ProgressUpdate) -> MongoResult<bool> {
        let result = self
            .user_collection()
            .await
            .update_one(doc_id(&id), progress_set(&update))
            .await
            .map_err(|source| MongoDaoError::UpdateProgress { id, source })?;

        Ok(result.matched_count > 0)
    }

    async fn list_users(&self) -> MongoResult<Vec<UserEntity>> {
        let documents: Vec<MongoUserDocument> = self
            .user_collection()
            .await
            .find(doc! {})
            .sort(doc! {"registered_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_question(&self, id: Uuid) -> MongoResult<Option<QuestionEntity>> {
        let key = id.to_string();
        let document = self
            .question_collection()
            .await
            .find_one(doc_id(&key))
            .await
            .map_err(|source| MongoDaoError::LoadQuestion { key, source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn find_question_by_order(&self, order: u32) -> MongoResult<Option<QuestionEntity>> {
        let document = self
            .question_collection()
            .await
            .find_one(order_filter(order))
            .await
            .map_err(|source| MongoDaoError::LoadQuestion {
                key: format!("order={order}"),
                source,
            })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn list_questions(&self) -> MongoResult<Vec<QuestionEntity>> {
        let documents: Vec<MongoQuestionDocument> = self
            .question_collection()
            .await
            .find(doc! {})
            .sort(doc! {"order": 1})
            .await
            .map_err(|source| MongoDaoError::ListQuestions { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListQuestions { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn save_question(&self, question: QuestionEntity) -> MongoResult<()> {
        let id = question.id;
        let key = id.to_string();
        let document: MongoQuestionDocument = question.into();
        self.question_collection()
            .await
            .replace_one(doc_id(&key), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveQuestion { id, source })?;

        Ok(())
    }

    async fn delete_question(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .question_collection()
            .await
            .delete_one(doc_id(&id.to_string()))
            .await
            .map_err(|source| MongoDaoError::DeleteQuestion { id, source })?;

        Ok(result.deleted_count > 0)
    }
}

impl HuntStore for MongoHuntStore {
    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(id).await.map_err(Into::into) })
    }

    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_user(user).await.map_err(Into::into) })
    }

    fn update_progress(
        &self,
        id: String,
        update: ProgressUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.update_progress(id, update).await.map_err(Into::into) })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_users().await.map_err(Into::into) })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_question(id).await.map_err(Into::into) })
    }

    fn find_question_by_order(
        &self,
        order: u32,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_question_by_order(order)
                .await
                .map_err(Into::into)
        })
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_questions().await.map_err(Into::into) })
    }

    fn save_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_question(question).await.map_err(Into::into) })
    }

    fn delete_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_question(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
