use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::{
    dao::models::{ProgressUpdate, QuestionEntity, RoleEntity, UserEntity},
    progress::FIRST_ORDER,
};

fn first_order() -> u32 {
    FIRST_ORDER
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: String,
    display_name: String,
    #[serde(default = "first_order")]
    current_question_order: u32,
    #[serde(default)]
    role: RoleEntity,
    registered_at: DateTime,
    updated_at: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redemption_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime>,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            display_name: value.display_name,
            current_question_order: value.current_question_order,
            role: value.role,
            registered_at: DateTime::from_system_time(value.registered_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            redemption_code: value.redemption_code,
            completed_at: value.completed_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: value.id,
            display_name: value.display_name,
            current_question_order: value.current_question_order,
            role: value.role,
            registered_at: value.registered_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            redemption_code: value.redemption_code,
            completed_at: value.completed_at.map(|at| at.to_system_time()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    id: String,
    order: u32,
    question_text: String,
    answer: String,
    correct_response_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unlock_code: Option<String>,
    #[serde(default)]
    is_last_question: bool,
}

impl From<QuestionEntity> for MongoQuestionDocument {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id.to_string(),
            order: value.order,
            question_text: value.question_text,
            answer: value.answer,
            correct_response_text: value.correct_response_text,
            unlock_code: value.unlock_code,
            is_last_question: value.is_last_question,
        }
    }
}

impl TryFrom<MongoQuestionDocument> for QuestionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoQuestionDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id).map_err(|source| MongoDaoError::InvalidDocumentId {
            id: value.id.clone(),
            source,
        })?;
        Ok(Self {
            id,
            order: value.order,
            question_text: value.question_text,
            answer: value.answer,
            correct_response_text: value.correct_response_text,
            unlock_code: value.unlock_code,
            is_last_question: value.is_last_question,
        })
    }
}

pub fn doc_id(id: &str) -> Document {
    doc! {"_id": id}
}

pub fn order_filter(order: u32) -> Document {
    doc! {"order": i64::from(order)}
}

/// `$set` document merging the provided fields of `update`.
pub fn progress_set(update: &ProgressUpdate) -> Document {
    let mut fields = doc! {
        "updated_at": DateTime::from_system_time(update.updated_at),
    };
    if let Some(order) = update.current_question_order {
        fields.insert("current_question_order", i64::from(order));
    }
    if let Some(code) = &update.redemption_code {
        fields.insert("redemption_code", code.clone());
    }
    if let Some(completed_at) = update.completed_at {
        fields.insert("completed_at", DateTime::from_system_time(completed_at));
    }
    doc! {"$set": fields}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::storage::StorageError;

    #[test]
    fn win_update_leaves_the_order_alone() {
        let update = progress_set(&ProgressUpdate::completed("HUNT-ABC123".into()));
        let fields = update.get_document("$set").unwrap();

        assert_eq!(fields.get_str("redemption_code").unwrap(), "HUNT-ABC123");
        assert!(fields.contains_key("completed_at"));
        assert!(fields.contains_key("updated_at"));
        assert!(!fields.contains_key("current_question_order"));
    }

    #[test]
    fn advance_update_sets_only_the_order() {
        let update = progress_set(&ProgressUpdate::advance_to(3));
        let fields = update.get_document("$set").unwrap();

        assert_eq!(fields.get_i64("current_question_order").unwrap(), 3);
        assert!(!fields.contains_key("redemption_code"));
        assert!(!fields.contains_key("completed_at"));
    }

    #[test]
    fn user_without_order_starts_at_the_first_question() {
        let now = DateTime::now();
        let document = doc! {
            "_id": "p1",
            "display_name": "Ada",
            "registered_at": now,
            "updated_at": now,
        };
        let stored: MongoUserDocument = mongodb::bson::deserialize_from_document(document).unwrap();
        let user = UserEntity::from(stored);

        assert_eq!(user.current_question_order, FIRST_ORDER);
        assert_eq!(user.role, RoleEntity::Player);
        assert!(user.redemption_code.is_none());
    }

    #[test]
    fn question_with_malformed_id_is_corrupted() {
        let stored = MongoQuestionDocument {
            id: "not-a-uuid".into(),
            order: 1,
            question_text: "Where?".into(),
            answer: "here".into(),
            correct_response_text: "Look up".into(),
            unlock_code: None,
            is_last_question: false,
        };
        let err = QuestionEntity::try_from(stored).unwrap_err();
        assert!(matches!(
            &err,
            MongoDaoError::InvalidDocumentId { id, .. } if id == "not-a-uuid"
        ));
        assert!(matches!(
            StorageError::from(err),
            StorageError::Corrupted { id, .. } if id == "not-a-uuid"
        ));
    }
}
