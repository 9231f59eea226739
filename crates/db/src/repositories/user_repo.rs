//! Repository for the `users` table.

use lookslab_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{OAuthProfile, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, name, provider, is_active, is_verified, onboarding_complete, \
                       google_sub, google_picture, last_google_id_token, apple_sub, \
                       last_apple_id_token, age, gender, profile_image, notifications_enabled, \
                       last_login, created_at, updated_at";

/// Provides queries for user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user from a verified OAuth sign-in.
    ///
    /// The provider subject and identity token land in the provider's own
    /// columns; `last_login` is set to now.
    pub async fn create_from_oauth(pool: &PgPool, input: &OAuthProfile) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (
                email, name, provider, is_verified,
                google_sub, google_picture, last_google_id_token,
                apple_sub, last_apple_id_token, last_login
             ) VALUES (
                $1, $2, $3, true,
                CASE WHEN $3 = 'google' THEN $4 END,
                CASE WHEN $3 = 'google' THEN $5 END,
                CASE WHEN $3 = 'google' THEN $6 END,
                CASE WHEN $3 = 'apple' THEN $4 END,
                CASE WHEN $3 = 'apple' THEN $6 END,
                NOW()
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.provider)
            .bind(&input.subject)
            .bind(&input.picture)
            .bind(&input.id_token)
            .fetch_one(pool)
            .await
    }

    /// Refresh an existing account after a successful sign-in.
    ///
    /// `name` is only filled when empty and `provider` only when unset. The
    /// provider subject and token are always refreshed; the picture only
    /// for Google sign-ins. The account is reactivated and `last_login` is
    /// set to now.
    pub async fn apply_oauth_login(
        pool: &PgPool,
        id: DbId,
        input: &OAuthProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = CASE WHEN name IS NULL OR name = '' THEN $2 ELSE name END,
                provider = COALESCE(provider, $3),
                google_sub = CASE WHEN $3 = 'google' THEN $4 ELSE google_sub END,
                last_google_id_token = CASE WHEN $3 = 'google' THEN $6 ELSE last_google_id_token END,
                google_picture = CASE WHEN $3 = 'google' THEN COALESCE($5, google_picture) ELSE google_picture END,
                apple_sub = CASE WHEN $3 = 'apple' THEN $4 ELSE apple_sub END,
                last_apple_id_token = CASE WHEN $3 = 'apple' THEN $6 ELSE last_apple_id_token END,
                is_active = true,
                last_login = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.provider)
            .bind(&input.subject)
            .bind(&input.picture)
            .bind(&input.id_token)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Callers pass the normalized (lowercase) form.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Update profile fields. Only non-`None` fields in `input` are applied.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender),
                profile_image = COALESCE($5, profile_image),
                notifications_enabled = COALESCE($6, notifications_enabled)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.gender)
            .bind(&input.profile_image)
            .bind(input.notifications_enabled)
            .fetch_optional(pool)
            .await
    }

    /// Flag the user as having finished onboarding. Returns `true` if a row changed.
    pub async fn mark_onboarding_complete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET onboarding_complete = true
             WHERE id = $1 AND onboarding_complete = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a user. Owned rows cascade. Returns `true` if removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
