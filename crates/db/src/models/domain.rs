//! Domain question and answer models.

use lookslab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `domain_questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DomainQuestion {
    pub id: DbId,
    pub domain: String,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub options: Option<serde_json::Value>,
    pub constraints: Option<serde_json::Value>,
    pub seq: i32,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub updated_at: Timestamp,
}

/// A row from the `domain_answers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DomainAnswer {
    pub id: DbId,
    pub user_id: DbId,
    pub question_id: DbId,
    pub domain: String,
    pub answer: serde_json::Value,
    pub completed_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A domain answer joined with its question text.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DomainAnswerDetail {
    pub question_id: DbId,
    pub seq: i32,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub answer: serde_json::Value,
    pub completed_at: Timestamp,
}
