//! Insight model and DTOs.

use lookslab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `insights` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Insight {
    pub id: DbId,
    pub user_id: DbId,
    pub category: String,
    pub content: serde_json::Value,
    pub source: Option<String>,
    pub is_read: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an insight. `category` is validated by the handler.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInsight {
    pub category: String,
    pub content: serde_json::Value,
    pub source: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

/// DTO for updating an insight. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInsight {
    pub category: Option<String>,
    pub content: Option<serde_json::Value>,
    pub source: Option<String>,
    pub is_read: Option<bool>,
}
