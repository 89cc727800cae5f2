//! Validation helpers for DTOs.

use uuid::Uuid;
use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a player identity as carried in the `X-Player-Id` header.
///
/// Identities are opaque, but they end up as document keys, so only a
/// conservative character set is accepted.
///
/// ```ignore
/// validate_player_id("3f1c0e9a-5b7d-4c1e-9a55-0c2b1f9e7d11") // Ok
/// validate_player_id("firebase_uid_42")                      // Ok
/// validate_player_id("user::42")                             // Err - separator
/// ```
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > 128 {
        let mut err = ValidationError::new("player_id_length");
        err.message = Some(
            format!(
                "Player ID must be between 1 and 128 characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("player_id_format");
        err.message =
            Some("Player ID may only contain ASCII letters, digits, '-' and '_'".into());
        return Err(err);
    }

    Ok(())
}

/// Fresh anonymous identity.
pub fn new_player_id() -> String {
    Uuid::new_v4().to_string()
}
