//! Repository for the `images` table.

use lookslab_core::types::DbId;
use sqlx::PgPool;

use crate::models::image::{CreateImage, Image, ImageFilter, UpdateImage};

const COLUMNS: &str = "id, user_id, file_path, s3_key, url, mime_type, file_size, image_type, \
                       domain, view, status, analysis_result, error_message, uploaded_at, \
                       processed_at, created_at, updated_at";

/// Provides CRUD operations for uploaded images.
pub struct ImageRepo;

impl ImageRepo {
    /// Insert a stored upload with status `pending`.
    pub async fn create(pool: &PgPool, input: &CreateImage) -> Result<Image, sqlx::Error> {
        let query = format!(
            "INSERT INTO images
                (user_id, file_path, s3_key, url, mime_type, file_size, image_type, domain, view)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(input.user_id)
            .bind(&input.file_path)
            .bind(&input.s3_key)
            .bind(&input.url)
            .bind(&input.mime_type)
            .bind(input.file_size)
            .bind(&input.image_type)
            .bind(&input.domain)
            .bind(&input.view)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = $1");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's images, newest first. `None` filters match everything.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: &ImageFilter,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images
             WHERE user_id = $1
               AND ($2::TEXT IS NULL OR domain = $2)
               AND ($3::TEXT IS NULL OR view = $3)
               AND ($4::TEXT IS NULL OR status = $4)
             ORDER BY uploaded_at DESC, id DESC"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(user_id)
            .bind(&filter.domain)
            .bind(&filter.view)
            .bind(&filter.status)
            .fetch_all(pool)
            .await
    }

    /// Count a user's images in one domain.
    pub async fn count_for_domain(pool: &PgPool, user_id: DbId, domain: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM images WHERE user_id = $1 AND domain = $2")
            .bind(user_id)
            .bind(domain)
            .fetch_one(pool)
            .await
    }

    /// A user's images in one domain, for building analysis context.
    pub async fn list_for_domain(
        pool: &PgPool,
        user_id: DbId,
        domain: &str,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images
             WHERE user_id = $1 AND domain = $2
             ORDER BY uploaded_at DESC"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(user_id)
            .bind(domain)
            .fetch_all(pool)
            .await
    }

    /// Update metadata. Only non-`None` fields are applied; moving to
    /// `processed` stamps `processed_at`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateImage,
    ) -> Result<Option<Image>, sqlx::Error> {
        let query = format!(
            "UPDATE images SET
                analysis_result = COALESCE($2, analysis_result),
                status = COALESCE($3, status),
                image_type = COALESCE($4, image_type),
                domain = COALESCE($5, domain),
                view = COALESCE($6, view),
                processed_at = CASE WHEN $3 = 'processed' THEN NOW() ELSE processed_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .bind(&input.analysis_result)
            .bind(&input.status)
            .bind(&input.image_type)
            .bind(&input.domain)
            .bind(&input.view)
            .fetch_optional(pool)
            .await
    }

    pub async fn mark_processed(
        pool: &PgPool,
        id: DbId,
        analysis_result: &serde_json::Value,
    ) -> Result<Option<Image>, sqlx::Error> {
        let query = format!(
            "UPDATE images SET
                status = 'processed',
                analysis_result = $2,
                error_message = NULL,
                processed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .bind(analysis_result)
            .fetch_optional(pool)
            .await
    }

    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        error_message: Option<&str>,
    ) -> Result<Option<Image>, sqlx::Error> {
        let query = format!(
            "UPDATE images SET
                status = 'failed',
                error_message = $2,
                processed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }

    /// Delete an image row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
