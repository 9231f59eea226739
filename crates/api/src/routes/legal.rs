use axum::routing::get;
use axum::Router;

use crate::handlers::legal;
use crate::state::AppState;

/// Routes mounted at `/legal`.
///
/// ```text
/// GET /privacy-policy     -> privacy_policy
/// GET /terms-of-service   -> terms_of_service
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/privacy-policy", get(legal::privacy_policy))
        .route("/terms-of-service", get(legal::terms_of_service))
}
