//! Route definitions for in-app purchases.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::iap;
use crate::state::AppState;

/// Routes mounted at `/iap`.
///
/// ```text
/// POST /validate-receipt    -> validate_receipt (requires auth)
/// POST /restore-purchases   -> restore_purchases (requires auth)
/// POST /webhooks/apple      -> apple_webhook
/// POST /webhooks/google     -> google_webhook
/// GET  /products            -> list_products
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/validate-receipt", post(iap::validate_receipt))
        .route("/restore-purchases", post(iap::restore_purchases))
        .route("/webhooks/apple", post(iap::apple_webhook))
        .route("/webhooks/google", post(iap::google_webhook))
        .route("/products", get(iap::list_products))
}
