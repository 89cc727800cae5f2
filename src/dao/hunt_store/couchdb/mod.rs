mod config;
mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use error::CouchDaoError;
pub use store::CouchHuntStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::InvalidDocId { doc_id, kind } => StorageError::corrupted(doc_id, kind),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn bad_document_id_is_corruption_not_an_outage() {
        let err = StorageError::from(CouchDaoError::InvalidDocId {
            doc_id: "question::oops".into(),
            kind: "question id is not a UUID",
        });
        assert!(matches!(err, StorageError::Corrupted { ref id, .. } if id == "question::oops"));

        let err = StorageError::from(CouchDaoError::Status {
            path: "_find".into(),
            status: StatusCode::BAD_GATEWAY,
        });
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }
}
