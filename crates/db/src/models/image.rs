//! Uploaded image model and DTOs.

use lookslab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Image {
    pub id: DbId,
    pub user_id: DbId,
    pub file_path: String,
    pub s3_key: Option<String>,
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub image_type: String,
    pub domain: Option<String>,
    pub view: Option<String>,
    pub status: String,
    pub analysis_result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub uploaded_at: Timestamp,
    pub processed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a freshly stored upload.
#[derive(Debug, Clone)]
pub struct CreateImage {
    pub user_id: DbId,
    pub file_path: String,
    pub s3_key: Option<String>,
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub image_type: String,
    pub domain: Option<String>,
    pub view: Option<String>,
}

/// DTO for `PATCH /images/{id}`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateImage {
    pub analysis_result: Option<serde_json::Value>,
    pub status: Option<String>,
    pub image_type: Option<String>,
    pub domain: Option<String>,
    pub view: Option<String>,
}

/// Optional filters for listing a user's images.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageFilter {
    pub domain: Option<String>,
    pub view: Option<String>,
    pub status: Option<String>,
}
