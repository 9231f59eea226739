//! Image upload validation, storage keys, and lifecycle enums.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Allowed file extensions, lowercase with leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpeg", ".jpg", ".png", ".webp"];

/// Allowed upload MIME types.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

pub const MIN_URL_EXPIRY_SECS: u64 = 60;
pub const MAX_URL_EXPIRY_SECS: u64 = 86_400;
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 3600;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Pending,
    Processed,
    Failed,
}

impl ImageStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!(
                "Invalid image status '{s}'. Must be one of: pending, processed, failed"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    #[default]
    Uploaded,
    Generated,
    Preview,
    Final,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Generated => "generated",
            Self::Preview => "preview",
            Self::Final => "final",
        }
    }
}

// ---------------------------------------------------------------------------
// Upload validation
// ---------------------------------------------------------------------------

/// Lowercase extension of `filename` including the dot, or an empty string.
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!(".{}", ext.to_lowercase()),
        _ => String::new(),
    }
}

/// Validate an upload's metadata and size before it is stored.
///
/// A missing `content_type` is not an error; the bytes are sniffed later
/// with [`sniff_mime_type`].
pub fn validate_upload(
    filename: Option<&str>,
    content_type: Option<&str>,
    size: usize,
    max_bytes: usize,
) -> Result<(), CoreError> {
    let filename = filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| CoreError::Validation("Filename is required".into()))?;

    let ext = file_extension(filename);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CoreError::Validation(format!(
            "File type '{ext}' not allowed. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    if let Some(ct) = content_type.filter(|ct| !ALLOWED_MIME_TYPES.contains(ct)) {
        return Err(CoreError::Validation(format!(
            "Content type '{ct}' not allowed. Allowed: {}",
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    if size == 0 {
        return Err(CoreError::Validation("File is empty".into()));
    }

    if size > max_bytes {
        return Err(CoreError::PayloadTooLarge(format!(
            "File size {:.1}MB exceeds maximum allowed {:.0}MB",
            size as f64 / BYTES_PER_MB,
            max_bytes as f64 / BYTES_PER_MB
        )));
    }

    Ok(())
}

/// Detect the MIME type of an image from its leading bytes.
///
/// Returns `None` for anything that is not JPEG, PNG, or WebP.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Object key for a user's upload: `users/{user_id}/images/{uuid}{ext}`.
pub fn storage_key(user_id: DbId, extension: &str) -> String {
    format!("users/{user_id}/images/{}{extension}", uuid::Uuid::new_v4())
}

/// Validate a presigned URL lifetime in seconds.
pub fn validate_url_expiry(secs: u64) -> Result<u64, CoreError> {
    if (MIN_URL_EXPIRY_SECS..=MAX_URL_EXPIRY_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(CoreError::Validation(format!(
            "expires_in must be between {MIN_URL_EXPIRY_SECS} and {MAX_URL_EXPIRY_SECS} seconds"
        )))
    }
}
