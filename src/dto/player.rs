//! DTO definitions used by the player REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{RoleEntity, UserEntity},
    dto::{format_system_time, validation::validate_not_blank},
    progress::Question,
};

/// Identity issued by `POST /auth/anonymous`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnonymousIdentity {
    /// Value to send back in the `X-Player-Id` header.
    pub player_id: String,
}

/// Registration payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = validate_not_blank))]
    pub display_name: String,
}

/// Answer to the question the player believes they are on.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AnswerRequest {
    /// Order of the question being answered.
    #[validate(range(min = 1))]
    pub order: u32,
    #[validate(length(max = 256))]
    pub answer: String,
}

/// Unlock code found at the location revealed by the last clue.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UnlockRequest {
    #[validate(length(min = 1, max = 128))]
    pub code: String,
}

/// Player profile together with progress.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct PlayerSummary {
    pub player_id: String,
    pub display_name: String,
    pub current_question_order: u32,
    pub role: String,
    pub registered_at: String,
    pub redemption_code: Option<String>,
    pub completed_at: Option<String>,
}

impl From<&UserEntity> for PlayerSummary {
    fn from(user: &UserEntity) -> Self {
        Self {
            player_id: user.id.clone(),
            display_name: user.display_name.clone(),
            current_question_order: user.current_question_order,
            role: match user.role {
                RoleEntity::Player => "player",
                RoleEntity::Admin => "admin",
            }
            .to_owned(),
            registered_at: format_system_time(user.registered_at),
            redemption_code: user.redemption_code.clone(),
            completed_at: user.completed_at.map(format_system_time),
        }
    }
}

/// What the player should see right now.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CurrentQuestionResponse {
    /// A question is waiting for an answer or, when `awaiting_unlock` is set, for its unlock code.
    Question {
        order: u32,
        question_text: String,
        awaiting_unlock: bool,
        /// Clue of the answered question while its unlock code is pending.
        clue: Option<String>,
    },
    /// Every question has been answered.
    Complete {
        redemption_code: Option<String>,
    },
}

impl CurrentQuestionResponse {
    /// Show `question`, flagged as awaiting its unlock code when `pending_clue` is set.
    pub fn question(question: &Question, pending_clue: Option<String>) -> Self {
        Self::Question {
            order: question.order,
            question_text: question.question_text.clone(),
            awaiting_unlock: pending_clue.is_some(),
            clue: pending_clue,
        }
    }
}

/// Result of an answer or unlock submission.
///
/// Unlock codes are never echoed back to the player.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionResponse {
    Incorrect,
    /// Correct answer; the unlock code hidden at the clue's location is required next.
    AwaitingUnlock { order: u32, clue: String },
    /// The player moved on to `next_order`.
    Advanced {
        next_order: u32,
        clue: Option<String>,
    },
    /// Last question answered.
    GameWon {
        redemption_code: String,
        clue: String,
    },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn submission_outcomes_are_tagged() {
        let body = serde_json::to_value(SubmissionResponse::AwaitingUnlock {
            order: 2,
            clue: "Under the bridge".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "outcome": "awaiting_unlock", "order": 2, "clue": "Under the bridge" })
        );

        let body = serde_json::to_value(SubmissionResponse::Incorrect).unwrap();
        assert_eq!(body, json!({ "outcome": "incorrect" }));
    }

    #[test]
    fn blank_display_name_is_rejected() {
        let request = RegisterRequest {
            display_name: "   ".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn summary_formats_timestamps() {
        let user = UserEntity::new_player("p1".into(), "Ada".into());
        let summary = PlayerSummary::from(&user);
        assert_eq!(summary.role, "player");
        assert_eq!(summary.current_question_order, 1);
        assert!(summary.completed_at.is_none());
        assert!(summary.registered_at.contains('T'));
    }
}
