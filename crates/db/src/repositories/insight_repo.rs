//! Repository for the `insights` table.

use lookslab_core::types::DbId;
use sqlx::PgPool;

use crate::models::insight::{CreateInsight, Insight, UpdateInsight};

const COLUMNS: &str = "id, user_id, category, content, source, is_read, created_at, updated_at";

/// Provides CRUD operations for insights.
pub struct InsightRepo;

impl InsightRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateInsight,
    ) -> Result<Insight, sqlx::Error> {
        let query = format!(
            "INSERT INTO insights (user_id, category, content, source, is_read)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Insight>(&query)
            .bind(user_id)
            .bind(&input.category)
            .bind(&input.content)
            .bind(&input.source)
            .bind(input.is_read)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Insight>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM insights WHERE id = $1");
        sqlx::query_as::<_, Insight>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's insights, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Insight>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM insights WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Insight>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInsight,
    ) -> Result<Option<Insight>, sqlx::Error> {
        let query = format!(
            "UPDATE insights SET
                category = COALESCE($2, category),
                content = COALESCE($3, content),
                source = COALESCE($4, source),
                is_read = COALESCE($5, is_read)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Insight>(&query)
            .bind(id)
            .bind(&input.category)
            .bind(&input.content)
            .bind(&input.source)
            .bind(input.is_read)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM insights WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
