//! User account model and DTOs.

use lookslab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
///
/// Stored identity tokens are never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub onboarding_complete: bool,
    #[serde(skip_serializing)]
    pub google_sub: Option<String>,
    pub google_picture: Option<String>,
    #[serde(skip_serializing)]
    pub last_google_id_token: Option<String>,
    #[serde(skip_serializing)]
    pub apple_sub: Option<String>,
    #[serde(skip_serializing)]
    pub last_apple_id_token: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub notifications_enabled: bool,
    pub last_login: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Identity fields captured from a verified OAuth sign-in.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub email: String,
    pub name: Option<String>,
    /// `"google"` or `"apple"`.
    pub provider: String,
    pub subject: String,
    pub picture: Option<String>,
    pub id_token: String,
}

/// DTO for `PATCH /users/me`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub notifications_enabled: Option<bool>,
}
