//! Repository for the `refresh_tokens` table.

use lookslab_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::refresh_token::RefreshToken;

const COLUMNS: &str =
    "id, user_id, token_hash, is_revoked, device_info, expires_at, created_at, updated_at";

/// Provides queries for per-user refresh tokens.
pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    /// Store a new token hash for `user_id`, replacing any previous token.
    pub async fn upsert_for_user(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
        expires_at: Timestamp,
        device_info: Option<&str>,
    ) -> Result<RefreshToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at, device_info)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET
                token_hash = EXCLUDED.token_hash,
                expires_at = EXCLUDED.expires_at,
                device_info = EXCLUDED.device_info,
                is_revoked = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .bind(device_info)
            .fetch_one(pool)
            .await
    }

    /// Swap a live token for a new hash in one statement. `None` when the
    /// presented token is unknown, revoked, expired, or was rotated first by
    /// a concurrent request.
    pub async fn rotate(
        pool: &PgPool,
        token_hash: &str,
        new_hash: &str,
        expires_at: Timestamp,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!(
            "UPDATE refresh_tokens SET token_hash = $2, expires_at = $3
             WHERE token_hash = $1 AND NOT is_revoked AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(token_hash)
            .bind(new_hash)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Find a token by hash regardless of revocation or expiry.
    pub async fn find_by_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM refresh_tokens WHERE token_hash = $1");
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a token. Returns `true` if the row was updated.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE refresh_tokens SET is_revoked = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
