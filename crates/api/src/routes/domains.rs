//! Route definitions for the per-domain flows and plan generators.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{domains, plans};
use crate::state::AppState;

/// Routes mounted at `/domains`. All require auth.
///
/// ```text
/// GET  /{domain}/questions            -> list_questions
/// GET  /{domain}/flow                 -> get_flow
/// POST /{domain}/answers              -> submit_answer
/// GET  /{domain}/answers              -> list_answers
/// GET  /{domain}/progress             -> get_progress
/// POST /{domain}/retry-ai             -> retry_ai
/// GET  /{domain}/access               -> get_access
/// POST /{domain}/generate-plan        -> generate_workout_plan (workout only)
/// POST /{domain}/generate-meal-plan   -> generate_meal_plan (diet only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{domain}/questions", get(domains::list_questions))
        .route("/{domain}/flow", get(domains::get_flow))
        .route(
            "/{domain}/answers",
            get(domains::list_answers).post(domains::submit_answer),
        )
        .route("/{domain}/progress", get(domains::get_progress))
        .route("/{domain}/retry-ai", post(domains::retry_ai))
        .route("/{domain}/access", get(domains::get_access))
        .route("/{domain}/generate-plan", post(plans::generate_workout_plan))
        .route("/{domain}/generate-meal-plan", post(plans::generate_meal_plan))
}
