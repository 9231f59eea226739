//! Repository for the `domain_answers` table.

use lookslab_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::domain::{DomainAnswer, DomainAnswerDetail};

const COLUMNS: &str =
    "id, user_id, question_id, domain, answer, completed_at, created_at, updated_at";

/// Provides queries for domain answers.
pub struct DomainAnswerRepo;

impl DomainAnswerRepo {
    /// Insert or replace the user's answer to a domain question.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        question_id: DbId,
        domain: &str,
        answer: &serde_json::Value,
    ) -> Result<DomainAnswer, sqlx::Error> {
        let query = format!(
            "INSERT INTO domain_answers (user_id, question_id, domain, answer)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_domain_answers_user_question DO UPDATE SET
                answer = EXCLUDED.answer,
                completed_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DomainAnswer>(&query)
            .bind(user_id)
            .bind(question_id)
            .bind(domain)
            .bind(answer)
            .fetch_one(pool)
            .await
    }

    pub async fn answered_question_ids(
        pool: &PgPool,
        user_id: DbId,
        domain: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT question_id FROM domain_answers WHERE user_id = $1 AND domain = $2",
        )
        .bind(user_id)
        .bind(domain)
        .fetch_all(pool)
        .await
    }

    /// Completion times of every domain answer the user has given.
    pub async fn completed_times(pool: &PgPool, user_id: DbId) -> Result<Vec<Timestamp>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT completed_at FROM domain_answers WHERE user_id = $1 ORDER BY completed_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Answer count per domain for one user.
    pub async fn count_by_domain(pool: &PgPool, user_id: DbId) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT domain, COUNT(*) FROM domain_answers WHERE user_id = $1 GROUP BY domain",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// The user's answers in one domain with question text, in question order.
    pub async fn list_details(
        pool: &PgPool,
        user_id: DbId,
        domain: &str,
    ) -> Result<Vec<DomainAnswerDetail>, sqlx::Error> {
        sqlx::query_as::<_, DomainAnswerDetail>(
            "SELECT a.question_id, q.seq, q.question, q.question_type, a.answer, a.completed_at
             FROM domain_answers a
             JOIN domain_questions q ON q.id = a.question_id
             WHERE a.user_id = $1 AND a.domain = $2
             ORDER BY q.seq",
        )
        .bind(user_id)
        .bind(domain)
        .fetch_all(pool)
        .await
    }
}
