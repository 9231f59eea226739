//! Handlers for user image uploads.
//!
//! Uploads are validated on filename, declared content type, size, and
//! magic bytes before anything is written to storage. Every per-image
//! route checks ownership.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lookslab_core::domains::validate_domain;
use lookslab_core::error::CoreError;
use lookslab_core::images::{
    file_extension, sniff_mime_type, storage_key, validate_upload, validate_url_expiry,
    ImageStatus, ImageType, DEFAULT_URL_EXPIRY_SECS,
};
use lookslab_core::types::DbId;
use lookslab_db::models::image::{CreateImage, Image, ImageFilter, UpdateImage};
use lookslab_db::repositories::ImageRepo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rate_limit::{RateLimit, UploadClass};
use crate::response::DataResponse;
use crate::state::AppState;

/// Name of the multipart field carrying the image.
const FILE_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub domain: Option<String>,
    pub view: Option<String>,
    pub image_type: Option<ImageType>,
}

#[derive(Debug, Deserialize)]
pub struct UrlParams {
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct FailedParams {
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisResultPayload {
    pub analysis_result: Value,
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub image_id: DbId,
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedImage {
    pub status: &'static str,
    pub image_id: DbId,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/images?domain=skincare&view=front&image_type=uploaded
///
/// Accept a single multipart `file` field, store it, and record it as pending.
pub async fn upload_image(
    auth: AuthUser,
    _limit: RateLimit<UploadClass>,
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Image>>)> {
    if let Some(domain) = params.domain.as_deref() {
        validate_domain(domain)?;
    }

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, content_type, data));
        break;
    }

    let Some((filename, content_type, data)) = upload else {
        return Err(AppError::BadRequest(
            "No file received in multipart upload".to_string(),
        ));
    };

    validate_upload(
        filename.as_deref(),
        content_type.as_deref(),
        data.len(),
        state.config.storage.max_file_size_bytes(),
    )?;
    let mime_type = sniff_mime_type(&data).ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "File content is not a supported image".into(),
        ))
    })?;

    let extension = file_extension(filename.as_deref().unwrap_or_default());
    let key = storage_key(auth.user_id, &extension);
    let file_size = data.len() as i64;
    let stored = state.storage.upload(&key, data.to_vec(), mime_type).await?;

    let image = ImageRepo::create(
        &state.pool,
        &CreateImage {
            user_id: auth.user_id,
            file_path: stored.path,
            s3_key: Some(stored.key),
            url: Some(stored.url),
            mime_type: Some(mime_type.to_string()),
            file_size: Some(file_size),
            image_type: params.image_type.unwrap_or_default().as_str().to_string(),
            domain: params.domain,
            view: params.view,
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        image_id = image.id,
        backend = state.storage.backend_name(),
        size_kb = file_size / 1024,
        "Uploaded image",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// GET /api/v1/images?domain=&view=&status=
pub async fn list_images(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ImageFilter>,
) -> AppResult<Json<DataResponse<Vec<Image>>>> {
    if let Some(status) = filter.status.as_deref() {
        ImageStatus::from_str_db(status)?;
    }
    let images = ImageRepo::list_for_user(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(DataResponse { data: images }))
}

/// GET /api/v1/images/{id}
pub async fn get_image(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Image>>> {
    let image = find_owned(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: image }))
}

/// GET /api/v1/images/{id}/url?expires_in=3600
///
/// Always issues a fresh URL; the one stored at upload may have expired.
pub async fn get_image_url(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<UrlParams>,
) -> AppResult<Json<DataResponse<ImageUrl>>> {
    let expires_in = validate_url_expiry(params.expires_in.unwrap_or(DEFAULT_URL_EXPIRY_SECS))?;
    let image = find_owned(&state.pool, id, auth.user_id).await?;

    let key = image.s3_key.as_deref().unwrap_or(&image.file_path);
    let url = state.storage.url(key, expires_in).await?;

    Ok(Json(DataResponse {
        data: ImageUrl {
            image_id: image.id,
            url,
            expires_in,
        },
    }))
}

/// PATCH /api/v1/images/{id}
pub async fn update_image(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateImage>,
) -> AppResult<Json<DataResponse<Image>>> {
    if let Some(status) = input.status.as_deref() {
        ImageStatus::from_str_db(status)?;
    }
    if let Some(domain) = input.domain.as_deref() {
        validate_domain(domain)?;
    }
    find_owned(&state.pool, id, auth.user_id).await?;

    let image = ImageRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(image_not_found)?;
    Ok(Json(DataResponse { data: image }))
}

/// PATCH /api/v1/images/{id}/processed
pub async fn mark_processed(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AnalysisResultPayload>,
) -> AppResult<Json<DataResponse<Image>>> {
    find_owned(&state.pool, id, auth.user_id).await?;

    let image = ImageRepo::mark_processed(&state.pool, id, &input.analysis_result)
        .await?
        .ok_or_else(image_not_found)?;
    tracing::info!(image_id = id, "Marked image processed");
    Ok(Json(DataResponse { data: image }))
}

/// PATCH /api/v1/images/{id}/failed?error_message=
pub async fn mark_failed(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FailedParams>,
) -> AppResult<Json<DataResponse<Image>>> {
    find_owned(&state.pool, id, auth.user_id).await?;

    let image = ImageRepo::mark_failed(&state.pool, id, params.error_message.as_deref())
        .await?
        .ok_or_else(image_not_found)?;
    tracing::warn!(image_id = id, error = ?params.error_message, "Marked image failed");
    Ok(Json(DataResponse { data: image }))
}

/// DELETE /api/v1/images/{id}
///
/// Storage deletion failures are logged and the row is removed anyway.
pub async fn delete_image(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DeletedImage>> {
    let image = find_owned(&state.pool, id, auth.user_id).await?;

    let key = image.s3_key.as_deref().unwrap_or(&image.file_path);
    if let Err(e) = state.storage.delete(key).await {
        tracing::warn!(image_id = id, key, error = %e, "Failed to delete image from storage");
    }

    ImageRepo::delete(&state.pool, id).await?;
    tracing::info!(user_id = auth.user_id, image_id = id, "Deleted image");

    Ok(Json(DeletedImage {
        status: "deleted",
        image_id: id,
        message: "Image deleted successfully",
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn image_not_found() -> AppError {
    AppError::Core(CoreError::NotFoundMessage("Image not found".into()))
}

async fn find_owned(pool: &PgPool, id: DbId, user_id: DbId) -> AppResult<Image> {
    let image = ImageRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(image_not_found)?;
    if image.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not authorized to access this image".into(),
        )));
    }
    Ok(image)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Core(CoreError::PayloadTooLarge(e.body_text()))
    } else {
        AppError::BadRequest(e.body_text())
    }
}
