//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /google     -> google_sign_in
/// POST /apple      -> apple_sign_in
/// POST /refresh    -> refresh
/// POST /sign-out   -> sign_out
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google", post(auth::google_sign_in))
        .route("/apple", post(auth::apple_sign_in))
        .route("/refresh", post(auth::refresh))
        .route("/sign-out", post(auth::sign_out))
}
