//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::QuestionEntity, dto::validation::validate_not_blank};

/// Question definition submitted by an admin.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct QuestionInput {
    /// Position in the hunt; unique across questions, starting at 1.
    #[validate(range(min = 1))]
    pub order: u32,
    /// Prompt shown to the player.
    #[validate(custom(function = validate_not_blank))]
    pub question_text: String,
    /// Stored trimmed and lower-cased.
    #[validate(custom(function = validate_not_blank))]
    pub answer: String,
    /// Clue revealed once the answer is accepted.
    #[validate(custom(function = validate_not_blank))]
    pub correct_response_text: String,
    /// Blank or missing means the question has no unlock step.
    #[serde(default)]
    pub unlock_code: Option<String>,
    /// Answering this question wins the hunt.
    #[serde(default)]
    pub is_last_question: bool,
}

impl QuestionInput {
    /// Normalise the input into a storable entity with identifier `id`.
    pub fn into_entity(self, id: Uuid) -> QuestionEntity {
        QuestionEntity {
            id,
            order: self.order,
            question_text: self.question_text.trim().to_owned(),
            answer: self.answer.trim().to_lowercase(),
            correct_response_text: self.correct_response_text.trim().to_owned(),
            unlock_code: self
                .unlock_code
                .map(|code| code.trim().to_owned())
                .filter(|code| !code.is_empty()),
            is_last_question: self.is_last_question,
        }
    }
}

/// Full question view, answers and unlock codes included.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct QuestionSummary {
    pub id: Uuid,
    pub order: u32,
    pub question_text: String,
    pub answer: String,
    pub correct_response_text: String,
    pub unlock_code: Option<String>,
    pub is_last_question: bool,
}

impl From<QuestionEntity> for QuestionSummary {
    fn from(entity: QuestionEntity) -> Self {
        Self {
            id: entity.id,
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

    fn input(answer: &str, unlock_code: Option<&str>) -> QuestionInput {
        QuestionInput {
            order: 1,
            question_text: " Where is the fountain? ".into(),
            answer: answer.into(),
            correct_response_text: "Look behind the statue".into(),
            unlock_code: unlock_code.map(Into::into),
            is_last_question: false,
        }
    }

    #[test]
    fn answer_is_normalised_and_blank_unlock_code_dropped() {
        let entity = input("  Town Square ", Some("   ")).into_entity(Uuid::new_v4());
        assert_eq!(entity.answer, "town square");
        assert_eq!(entity.question_text, "Where is the fountain?");
        assert_eq!(entity.unlock_code, None);
    }

    #[test]
    fn required_texts_and_positive_order_are_validated() {
        assert!(input("x", None).validate().is_ok());
        assert!(input(" ", None).validate().is_err());

        let mut zero = input("x", None);
        zero.order = 0;
        assert!(zero.validate().is_err());
    }
}
