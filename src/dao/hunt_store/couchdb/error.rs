use reqwest::StatusCode;
use thiserror::Error;

pub type CouchResult<T> = Result<T, CouchDaoError>;

/// What can go wrong between the hunt store and the CouchDB HTTP API.
///
/// `path` is the database name, a document id or a special endpoint such as `_find`.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("could not build the CouchDB HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    /// The request never completed, or its body could not be read.
    #[error("CouchDB request on `{path}` failed")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB answered {status} on `{path}`")]
    Status { path: String, status: StatusCode },
    /// JSON came back but does not fit the hunt document shape.
    #[error("CouchDB document on `{path}` does not match the expected shape")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// Stored `_id` is not `user::<identity>` or `question::<uuid>`.
    #[error("invalid document ID `{doc_id}`: {kind}")]
    InvalidDocId { doc_id: String, kind: &'static str },
}
