//! Route definitions for the `/insights` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::insights;
use crate::state::AppState;

/// Routes mounted at `/insights`.
///
/// ```text
/// POST   /        -> create_insight
/// GET    /me      -> list_my_insights
/// GET    /{id}    -> get_insight
/// PATCH  /{id}    -> update_insight
/// DELETE /{id}    -> delete_insight
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(insights::create_insight))
        .route("/me", get(insights::list_my_insights))
        .route(
            "/{id}",
            get(insights::get_insight)
                .patch(insights::update_insight)
                .delete(insights::delete_insight),
        )
}
