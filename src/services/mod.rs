/// Question authoring and player overview for admins.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Anonymous identities and role checks.
pub mod identity_service;
/// Registration and progress through the hunt.
pub mod player_service;
/// Background storage connection and reconnection loop.
pub mod storage_supervisor;
