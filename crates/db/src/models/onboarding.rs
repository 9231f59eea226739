//! Onboarding session, question, and answer models.

use lookslab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `onboarding_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingSession {
    pub id: Uuid,
    pub user_id: Option<DbId>,
    pub selected_domain: Option<String>,
    pub is_paid: bool,
    pub payment_confirmed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `onboarding_questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingQuestion {
    pub id: DbId,
    pub step: String,
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

/// A row from the `onboarding_answers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingAnswer {
    pub id: DbId,
    pub session_id: Uuid,
    pub question_id: DbId,
    pub answer: serde_json::Value,
    pub completed_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An answer joined with the question it responds to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingAnswerDetail {
    pub question_id: DbId,
    pub step: String,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub answer: serde_json::Value,
    pub completed_at: Timestamp,
}
