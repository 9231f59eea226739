//! Repository for the `onboarding_questions` table.

use lookslab_core::types::DbId;
use sqlx::PgPool;

use crate::models::onboarding::OnboardingQuestion;

const COLUMNS: &str =
    "id, step, question, question_type, options, constraints, seq, created_at, updated_at";

/// Provides read access to the seeded onboarding questions.
pub struct OnboardingQuestionRepo;

impl OnboardingQuestionRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OnboardingQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_questions WHERE id = $1");
        sqlx::query_as::<_, OnboardingQuestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Questions for one step in presentation order.
    pub async fn list_by_step(pool: &PgPool, step: &str) -> Result<Vec<OnboardingQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_questions WHERE step = $1 ORDER BY seq");
        sqlx::query_as::<_, OnboardingQuestion>(&query)
            .bind(step)
            .fetch_all(pool)
            .await
    }

    /// Every question, ordered by step then sequence.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<OnboardingQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_questions ORDER BY step, seq");
        sqlx::query_as::<_, OnboardingQuestion>(&query)
            .fetch_all(pool)
            .await
    }
}
