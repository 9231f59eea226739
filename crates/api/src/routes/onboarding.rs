//! Route definitions for anonymous onboarding sessions.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Routes mounted at `/onboarding`.
///
/// ```text
/// POST  /sessions                  -> create_session
/// GET   /sessions/{id}             -> get_session
/// GET   /sessions/{id}/flow        -> get_flow (?step=)
/// POST  /sessions/{id}/answers     -> submit_answer
/// PATCH /sessions/{id}/domain      -> select_domain (?domain=)
/// PATCH /sessions/{id}/payment     -> confirm_payment
/// PATCH /sessions/{id}/link        -> link_session (requires auth)
/// GET   /sessions/{id}/progress    -> get_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(onboarding::create_session))
        .route("/sessions/{id}", get(onboarding::get_session))
        .route("/sessions/{id}/flow", get(onboarding::get_flow))
        .route("/sessions/{id}/answers", post(onboarding::submit_answer))
        .route("/sessions/{id}/domain", patch(onboarding::select_domain))
        .route("/sessions/{id}/payment", patch(onboarding::confirm_payment))
        .route("/sessions/{id}/link", patch(onboarding::link_session))
        .route("/sessions/{id}/progress", get(onboarding::get_progress))
}
