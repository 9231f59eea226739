//! Repository for the `onboarding_answers` table.

use lookslab_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::onboarding::{OnboardingAnswer, OnboardingAnswerDetail};

const COLUMNS: &str = "id, session_id, question_id, answer, completed_at, created_at, updated_at";

const DETAIL_COLUMNS: &str = "a.question_id, q.step, q.question, q.question_type, a.answer, a.completed_at";

/// Provides queries for onboarding answers.
pub struct OnboardingAnswerRepo;

impl OnboardingAnswerRepo {
    /// Insert or replace the answer to a question within a session.
    pub async fn upsert(
        pool: &PgPool,
        session_id: Uuid,
        question_id: DbId,
        answer: &serde_json::Value,
    ) -> Result<OnboardingAnswer, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_answers (session_id, question_id, answer)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_onboarding_answers_session_question DO UPDATE SET
                answer = EXCLUDED.answer,
                completed_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingAnswer>(&query)
            .bind(session_id)
            .bind(question_id)
            .bind(answer)
            .fetch_one(pool)
            .await
    }

    /// Ids of every question answered in a session.
    pub async fn answered_question_ids(pool: &PgPool, session_id: Uuid) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT question_id FROM onboarding_answers WHERE session_id = $1")
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// A session's answers with question context, in flow order.
    pub async fn list_details_for_session(
        pool: &PgPool,
        session_id: Uuid,
    ) -> Result<Vec<OnboardingAnswerDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM onboarding_answers a
             JOIN onboarding_questions q ON q.id = a.question_id
             WHERE a.session_id = $1
             ORDER BY a.completed_at, q.seq"
        );
        sqlx::query_as::<_, OnboardingAnswerDetail>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Answers across every session linked to `user_id`, oldest first.
    pub async fn list_details_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<OnboardingAnswerDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM onboarding_answers a
             JOIN onboarding_questions q ON q.id = a.question_id
             JOIN onboarding_sessions s ON s.id = a.session_id
             WHERE s.user_id = $1
             ORDER BY a.completed_at, q.seq"
        );
        sqlx::query_as::<_, OnboardingAnswerDetail>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
