use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value};
use uuid::Uuid;

use crate::dao::{
    hunt_store::HuntStore,
    models::{ProgressUpdate, QuestionEntity, UserEntity},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchQuestionDocument, CouchUserDocument, END_SUFFIX, FindResponse,
        QUESTION_PREFIX, USER_PREFIX, question_doc_id, question_order_selector, user_doc_id,
    },
};

/// CouchDB-backed [`HuntStore`] speaking the HTTP document API.
#[derive(Clone)]
pub struct CouchHuntStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchHuntStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::Client { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        self.authorize(self.client.request(method, url))
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .authorize(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::Transport {
                        path: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::Status {
                        path: database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::Status {
                path: database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::Transport {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::Status {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_id.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::Status {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn delete_document(&self, doc_id: &str, rev: &str) -> CouchResult<()> {
        let response = self
            .request(Method::DELETE, doc_id)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_id.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::Status {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::Status {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::Transport {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        payload
            .rows
            .into_iter()
            .filter_map(|row| row.doc)
            .map(|doc| decode(ALL_DOCS, doc))
            .collect()
    }

    async fn find_documents<T>(&self, query: &Value) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const FIND: &str = "_find";
        let response = self
            .request(Method::POST, FIND)
            .json(query)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: FIND.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::Status {
                path: FIND.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<FindResponse>().await.map_err(|source| {
            CouchDaoError::Transport {
                path: FIND.to_string(),
                source,
            }
        })?;

        payload
            .docs
            .into_iter()
            .map(|doc| decode(FIND, doc))
            .collect()
    }

    async fn save_user(&self, user: UserEntity) -> CouchResult<()> {
        let doc_id = user_doc_id(&user.id);
        let rev = self
            .get_document::<CouchUserDocument>(&doc_id)
            .await?
            .and_then(|existing| existing.rev);
        let doc: CouchUserDocument = (user, rev).into();
        self.put_document(&doc_id, &doc).await
    }

    async fn update_progress(&self, id: String, update: ProgressUpdate) -> CouchResult<bool> {
        let doc_id = user_doc_id(&id);
        let Some(existing) = self.get_document::<CouchUserDocument>(&doc_id).await? else {
            return Ok(false);
        };

        let rev = existing.rev.clone();
        let mut user = UserEntity::try_from(existing)?;
        update.apply_to(&mut user);
        let doc: CouchUserDocument = (user, rev).into();
        self.put_document(&doc_id, &doc).await?;
        Ok(true)
    }

    async fn save_question(&self, question: QuestionEntity) -> CouchResult<()> {
        let doc_id = question_doc_id(question.id);
        let rev = self
            .get_document::<CouchQuestionDocument>(&doc_id)
            .await?
            .and_then(|existing| existing.rev);
        let doc: CouchQuestionDocument = (question, rev).into();
        self.put_document(&doc_id, &doc).await
    }

    async fn delete_question(&self, id: Uuid) -> CouchResult<bool> {
        let doc_id = question_doc_id(id);
        let Some(rev) = self
            .get_document::<CouchQuestionDocument>(&doc_id)
            .await?
            .and_then(|existing| existing.rev)
        else {
            return Ok(false);
        };
        self.delete_document(&doc_id, &rev).await?;
        Ok(true)
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> CouchResult<T> {
    from_value(value).map_err(|source| CouchDaoError::Malformed {
        path: path.to_string(),
        source,
    })
}

impl HuntStore for CouchHuntStore {
    fn find_user(&self, id: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = store
                .get_document::<CouchUserDocument>(&user_doc_id(&id))
                .await?;
            Ok(doc.map(UserEntity::try_from).transpose()?)
        })
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
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchUserDocument>(USER_PREFIX)
                .await?;
            let mut users = docs
                .into_iter()
                .map(UserEntity::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            users.sort_by_key(|user| user.registered_at);
            Ok(users)
        })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc = store
                .get_document::<CouchQuestionDocument>(&question_doc_id(id))
                .await?;
            Ok(doc.map(QuestionEntity::try_from).transpose()?)
        })
    }

    fn find_question_by_order(
        &self,
        order: u32,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .find_documents::<CouchQuestionDocument>(&question_order_selector(order))
                .await?;
            Ok(docs
                .into_iter()
                .next()
                .map(QuestionEntity::try_from)
                .transpose()?)
        })
    }

    fn list_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchQuestionDocument>(QUESTION_PREFIX)
                .await?;
            let mut questions = docs
                .into_iter()
                .map(QuestionEntity::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            questions.sort_by_key(|question| question.order);
            Ok(questions)
        })
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
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .authorize(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::Transport {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::Status {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
