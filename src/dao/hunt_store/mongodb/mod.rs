mod config;
mod connection;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoHuntStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::InvalidDocumentId { id, source } => {
                StorageError::corrupted(id, source.to_string())
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
