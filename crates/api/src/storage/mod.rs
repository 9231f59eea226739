//! Object storage for uploaded images.
//!
//! - [`local::LocalStorage`] -- files under a directory served at `/media`.
//! - [`s3::S3Storage`] -- an S3 bucket, optionally fronted by CloudFront.

pub mod local;
pub mod s3;

use async_trait::async_trait;

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend-relative key (`users/{id}/images/{uuid}.jpg`).
    pub key: String,
    /// Local filesystem path or `s3://bucket/key`.
    pub path: String,
    /// A URL the client can fetch the object from.
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// A URL for `key` valid for at least `expires_in` seconds.
    async fn url(&self, key: &str, expires_in: u64) -> Result<String, StorageError>;

    fn backend_name(&self) -> &'static str;
}

impl From<StorageError> for crate::error::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => Self::BadRequest(msg),
            other => Self::InternalError(other.to_string()),
        }
    }
}
