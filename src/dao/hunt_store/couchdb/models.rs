use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    dao::{
        hunt_store::couchdb::error::CouchDaoError,
        models::{QuestionEntity, RoleEntity, UserEntity},
    },
    progress::FIRST_ORDER,
};

pub const USER_PREFIX: &str = "user::";
pub const QUESTION_PREFIX: &str = "question::";
pub const END_SUFFIX: &str = "\u{ffff}";

/// Discriminator stored on question documents so `_find` can select them.
pub const QUESTION_KIND: &str = "question";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct FindResponse {
    pub docs: Vec<Value>,
}

fn first_order() -> u32 {
    FIRST_ORDER
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchUserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub user: UserBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBody {
    pub display_name: String,
    #[serde(default = "first_order")]
    pub current_question_order: u32,
    #[serde(default)]
    pub role: RoleEntity,
    pub registered_at: SystemTime,
    pub updated_at: SystemTime,
    #[serde(default)]
    pub redemption_code: Option<String>,
    #[serde(default)]
    pub completed_at: Option<SystemTime>,
}

impl From<(UserEntity, Option<String>)> for CouchUserDocument {
    fn from((user, rev): (UserEntity, Option<String>)) -> Self {
        Self {
            id: user_doc_id(&user.id),
            rev,
            user: UserBody {
                display_name: user.display_name,
                current_question_order: user.current_question_order,
                role: user.role,
                registered_at: user.registered_at,
                updated_at: user.updated_at,
                redemption_code: user.redemption_code,
                completed_at: user.completed_at,
            },
        }
    }
}

impl TryFrom<CouchUserDocument> for UserEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchUserDocument) -> Result<Self, Self::Error> {
        let id = extract_key(&doc.id)?.to_owned();
        Ok(Self {
            id,
            display_name: doc.user.display_name,
            current_question_order: doc.user.current_question_order,
            role: doc.user.role,
            registered_at: doc.user.registered_at,
            updated_at: doc.user.updated_at,
            redemption_code: doc.user.redemption_code,
            completed_at: doc.user.completed_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchQuestionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub question: QuestionBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBody {
    pub kind: String,
    pub order: u32,
    pub question_text: String,
    pub answer: String,
    pub correct_response_text: String,
    #[serde(default)]
    pub unlock_code: Option<String>,
    #[serde(default)]
    pub is_last_question: bool,
}

impl From<(QuestionEntity, Option<String>)> for CouchQuestionDocument {
    fn from((question, rev): (QuestionEntity, Option<String>)) -> Self {
        Self {
            id: question_doc_id(question.id),
            rev,
            question: QuestionBody {
                kind: QUESTION_KIND.to_owned(),
                order: question.order,
                question_text: question.question_text,
                answer: question.answer,
                correct_response_text: question.correct_response_text,
                unlock_code: question.unlock_code,
                is_last_question: question.is_last_question,
            },
        }
    }
}

impl TryFrom<CouchQuestionDocument> for QuestionEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchQuestionDocument) -> Result<Self, Self::Error> {
        let key = extract_key(&doc.id)?;
        let id = Uuid::parse_str(key).map_err(|_| CouchDaoError::InvalidDocId {
            doc_id: doc.id.clone(),
            kind: "invalid UUID",
        })?;
        Ok(Self {
            id,
            order: doc.question.order,
            question_text: doc.question.question_text,
            answer: doc.question.answer,
            correct_response_text: doc.question.correct_response_text,
            unlock_code: doc.question.unlock_code,
            is_last_question: doc.question.is_last_question,
        })
    }
}

/// Mango selector matching the question with the given order.
pub fn question_order_selector(order: u32) -> Value {
    json!({
        "selector": { "kind": QUESTION_KIND, "order": order },
        "limit": 1,
    })
}

pub fn user_doc_id(id: &str) -> String {
    format!("{}{}", USER_PREFIX, id)
}

pub fn question_doc_id(id: Uuid) -> String {
    format!("{}{}", QUESTION_PREFIX, id)
}

pub fn extract_key(doc_id: &str) -> Result<&str, CouchDaoError> {
    let (_, key) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing separator",
        })?;

    if key.is_empty() {
        return Err(CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "empty key",
        });
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_document_round_trips_identity() {
        let user = UserEntity::new_player("f00d".into(), "Ada".into());
        let doc: CouchUserDocument = (user.clone(), None).into();
        assert_eq!(doc.id, "user::f00d");

        let back = UserEntity::try_from(doc).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn question_document_is_tagged_for_mango_queries() {
        let question = QuestionEntity {
            id: Uuid::new_v4(),
            order: 3,
            question_text: "Where?".into(),
            answer: "here".into(),
            correct_response_text: "Go there".into(),
            unlock_code: Some("QR3".into()),
            is_last_question: false,
        };
        let doc: CouchQuestionDocument = (question, Some("1-abc".into())).into();
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["kind"], QUESTION_KIND);
        assert_eq!(json["order"], 3);
        assert_eq!(json["_rev"], "1-abc");
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(extract_key("user-without-separator").is_err());
        assert!(extract_key("user::").is_err());

        let doc = CouchQuestionDocument {
            id: "question::not-a-uuid".into(),
            rev: None,
            question: QuestionBody {
                kind: QUESTION_KIND.into(),
                order: 1,
                question_text: String::new(),
                answer: String::new(),
                correct_response_text: String::new(),
                unlock_code: None,
                is_last_question: false,
            },
        };
        assert!(QuestionEntity::try_from(doc).is_err());
    }
}
