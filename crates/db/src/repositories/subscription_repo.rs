//! Repository for the `subscriptions` table.

use lookslab_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription::{CreateSubscription, Subscription};

const COLUMNS: &str = "id, user_id, plan, status, payment_id, start_date, end_date, trial_end, \
                       cancelled_at, created_at, updated_at";

/// Provides queries for user subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Insert a subscription. A second row for the same user violates
    /// `uq_subscriptions_user_id`.
    pub async fn create(pool: &PgPool, input: &CreateSubscription) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (user_id, plan, status, payment_id, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(&input.plan)
            .bind(&input.status)
            .bind(&input.payment_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Insert or replace the user's subscription from a store receipt.
    pub async fn upsert_for_user(
        pool: &PgPool,
        input: &CreateSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (user_id, plan, status, payment_id, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id) DO UPDATE SET
                plan = EXCLUDED.plan,
                status = EXCLUDED.status,
                payment_id = EXCLUDED.payment_id,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                cancelled_at = NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(&input.plan)
            .bind(&input.status)
            .bind(&input.payment_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user(pool: &PgPool, user_id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Set status `cancelled` and stamp `cancelled_at`.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET status = 'cancelled', cancelled_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
