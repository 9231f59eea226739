//! Route definitions for the `/images` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// POST   /                 -> upload_image (multipart)
/// GET    /                 -> list_images
/// GET    /{id}             -> get_image
/// PATCH  /{id}             -> update_image
/// DELETE /{id}             -> delete_image
/// GET    /{id}/url         -> get_image_url
/// PATCH  /{id}/processed   -> mark_processed
/// PATCH  /{id}/failed      -> mark_failed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(images::list_images).post(images::upload_image))
        .route(
            "/{id}",
            get(images::get_image)
                .patch(images::update_image)
                .delete(images::delete_image),
        )
        .route("/{id}/url", get(images::get_image_url))
        .route("/{id}/processed", patch(images::mark_processed))
        .route("/{id}/failed", patch(images::mark_failed))
}
