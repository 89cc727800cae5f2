/// Persistence of players and questions.
pub mod hunt_store;
/// Entities exchanged with the storage backends.
pub mod models;
/// Backend-agnostic storage errors.
pub mod storage;
