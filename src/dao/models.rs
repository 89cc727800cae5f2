use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::progress::{FIRST_ORDER, Question, Role, UserProgress};

/// Role stored on the player document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoleEntity {
    #[default]
    Player,
    Admin,
}

/// Player profile and progress persisted in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Identity issued by the identity collaborator, used as document key.
    pub id: String,
    /// Name chosen at registration.
    pub display_name: String,
    /// Progress cursor; starts at 1.
    pub current_question_order: u32,
    /// Player or admin, assigned out-of-band.
    pub role: RoleEntity,
    /// When the profile was created.
    pub registered_at: SystemTime,
    /// Last time the profile changed.
    pub updated_at: SystemTime,
    /// Last prize code issued to this player, if they won.
    pub redemption_code: Option<String>,
    /// When the player won.
    pub completed_at: Option<SystemTime>,
}

impl UserEntity {
    /// Profile of a freshly registered player.
    pub fn new_player(id: String, display_name: String) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            display_name,
            current_question_order: FIRST_ORDER,
            role: RoleEntity::Player,
            registered_at: now,
            updated_at: now,
            redemption_code: None,
            completed_at: None,
        }
    }
}

/// Partial update merged into an existing user document.
///
/// Fields left to `None` are not touched by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub current_question_order: Option<u32>,
    pub redemption_code: Option<String>,
    pub completed_at: Option<SystemTime>,
    pub updated_at: SystemTime,
}

impl ProgressUpdate {
    /// Move the progress cursor to `order`.
    pub fn advance_to(order: u32) -> Self {
        Self {
            current_question_order: Some(order),
            redemption_code: None,
            completed_at: None,
            updated_at: SystemTime::now(),
        }
    }

    /// Record a win and the code issued for it.
    pub fn completed(redemption_code: String) -> Self {
        let now = SystemTime::now();
        Self {
            current_question_order: None,
            redemption_code: Some(redemption_code),
            completed_at: Some(now),
            updated_at: now,
        }
    }

    /// Merge this update into an in-memory copy of the document.
    pub fn apply_to(&self, user: &mut UserEntity) {
        if let Some(order) = self.current_question_order {
            user.current_question_order = order;
        }
        if let Some(code) = &self.redemption_code {
            user.redemption_code = Some(code.clone());
        }
        if let Some(completed_at) = self.completed_at {
            user.completed_at = Some(completed_at);
        }
        user.updated_at = self.updated_at;
    }
}

/// Question persisted in the `questions` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Document identifier.
    pub id: Uuid,
    /// Unique position in the hunt.
    pub order: u32,
    /// Text shown to the player.
    pub question_text: String,
    /// Expected answer, stored trimmed and lower-cased.
    pub answer: String,
    /// Clue revealed after a correct answer.
    pub correct_response_text: String,
    /// Code to scan or type before moving on, if any.
    pub unlock_code: Option<String>,
    /// Whether a correct answer ends the game.
    pub is_last_question: bool,
}

impl From<RoleEntity> for Role {
    fn from(value: RoleEntity) -> Self {
        match value {
            RoleEntity::Player => Role::Player,
            RoleEntity::Admin => Role::Admin,
        }
    }
}

impl From<&UserEntity> for UserProgress {
    fn from(user: &UserEntity) -> Self {
        Self {
            identity: user.id.clone(),
            display_name: user.display_name.clone(),
            current_question_order: user.current_question_order.max(FIRST_ORDER),
            role: user.role.into(),
        }
    }
}

impl From<QuestionEntity> for Question {
    fn from(entity: QuestionEntity) -> Self {
        Self {
            order: entity.order,
            question_text: entity.question_text,
            answer: entity.answer,
            correct_response_text: entity.correct_response_text,
            unlock_code: entity.unlock_code,
            is_last_question: entity.is_last_question,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_update_only_touches_provided_fields() {
        let mut user = UserEntity::new_player("p1".into(), "Ada".into());
        ProgressUpdate::advance_to(4).apply_to(&mut user);
        assert_eq!(user.current_question_order, 4);
        assert_eq!(user.redemption_code, None);

        ProgressUpdate::completed("HUNT-ABC123".into()).apply_to(&mut user);
        assert_eq!(user.current_question_order, 4);
        assert_eq!(user.redemption_code.as_deref(), Some("HUNT-ABC123"));
        assert!(user.completed_at.is_some());
    }

    #[test]
    fn zero_order_is_read_as_first_question() {
        let mut user = UserEntity::new_player("p1".into(), "Ada".into());
        user.current_question_order = 0;
        let progress = UserProgress::from(&user);
        assert_eq!(progress.current_question_order, FIRST_ORDER);
    }
}
