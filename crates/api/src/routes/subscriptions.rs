//! Route definitions for the `/subscriptions` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::subscriptions;
use crate::state::AppState;

/// Routes mounted at `/subscriptions`.
///
/// ```text
/// POST  /               -> create_subscription
/// GET   /me             -> get_my_subscription
/// GET   /plans          -> list_plans (public)
/// PATCH /{id}/cancel    -> cancel_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(subscriptions::create_subscription))
        .route("/me", get(subscriptions::get_my_subscription))
        .route("/plans", get(subscriptions::list_plans))
        .route("/{id}/cancel", patch(subscriptions::cancel_subscription))
}
