//! Repository for the `onboarding_sessions` table.

use lookslab_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::onboarding::OnboardingSession;

const COLUMNS: &str =
    "id, user_id, selected_domain, is_paid, payment_confirmed_at, created_at, updated_at";

/// Provides queries for onboarding sessions.
pub struct OnboardingSessionRepo;

impl OnboardingSessionRepo {
    /// Create an anonymous session.
    pub async fn create(pool: &PgPool) -> Result<OnboardingSession, sqlx::Error> {
        let query = format!("INSERT INTO onboarding_sessions DEFAULT VALUES RETURNING {COLUMNS}");
        sqlx::query_as::<_, OnboardingSession>(&query)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_sessions WHERE id = $1");
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The user's most recently updated session, which governs domain access.
    pub async fn find_latest_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_sessions
             WHERE user_id = $1
             ORDER BY updated_at DESC, created_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Attach an anonymous session to an account. `None` when the session
    /// does not exist or is already linked.
    pub async fn link_user(
        pool: &PgPool,
        id: Uuid,
        user_id: DbId,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET user_id = $2
             WHERE id = $1 AND user_id IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn select_domain(
        pool: &PgPool,
        id: Uuid,
        domain: &str,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET selected_domain = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .bind(domain)
            .fetch_optional(pool)
            .await
    }

    /// Mark the session paid, stamping the first confirmation time.
    pub async fn confirm_payment(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET
                is_paid = true,
                payment_confirmed_at = COALESCE(payment_confirmed_at, NOW())
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
