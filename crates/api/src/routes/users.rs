//! Route definitions for the signed-in user's own resources.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /me                      -> get_me
/// PATCH  /me                      -> update_me
/// DELETE /me                      -> delete_me
/// GET    /me/progress/weekly      -> weekly_progress
/// GET    /me/answers              -> onboarding_answers
/// GET    /me/wellness             -> wellness
/// GET    /me/domains/progress     -> domains_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(users::get_me)
                .patch(users::update_me)
                .delete(users::delete_me),
        )
        .route("/me/progress/weekly", get(users::weekly_progress))
        .route("/me/answers", get(users::onboarding_answers))
        .route("/me/wellness", get(users::wellness))
        .route("/me/domains/progress", get(users::domains_progress))
}
