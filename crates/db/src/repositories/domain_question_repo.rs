//! Repository for the `domain_questions` table.

use lookslab_core::types::DbId;
use sqlx::PgPool;

use crate::models::domain::DomainQuestion;

const COLUMNS: &str =
    "id, domain, question, question_type, options, constraints, seq, created_at, updated_at";

/// Provides read access to the seeded domain questions.
pub struct DomainQuestionRepo;

impl DomainQuestionRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DomainQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM domain_questions WHERE id = $1");
        sqlx::query_as::<_, DomainQuestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Questions for a domain in presentation order.
    pub async fn list_by_domain(pool: &PgPool, domain: &str) -> Result<Vec<DomainQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM domain_questions WHERE domain = $1 ORDER BY seq");
        sqlx::query_as::<_, DomainQuestion>(&query)
            .bind(domain)
            .fetch_all(pool)
            .await
    }

    /// Total number of domain questions across every domain.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM domain_questions")
            .fetch_one(pool)
            .await
    }

    /// Question count per domain.
    pub async fn count_by_domain(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as("SELECT domain, COUNT(*) FROM domain_questions GROUP BY domain")
            .fetch_all(pool)
            .await
    }
}
