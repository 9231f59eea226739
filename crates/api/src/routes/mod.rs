pub mod auth;
pub mod domains;
pub mod health;
pub mod iap;
pub mod images;
pub mod insights;
pub mod legal;
pub mod onboarding;
pub mod subscriptions;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/google                                  Google sign-in (public)
/// /auth/apple                                   Apple sign-in (public)
/// /auth/refresh                                 refresh (public)
/// /auth/sign-out                                revoke refresh token (public)
///
/// /users/me                                     get, update, delete
/// /users/me/progress/weekly                     seven-day activity scores
/// /users/me/answers                             onboarding answers
/// /users/me/wellness                            wellness metrics + daily quote
/// /users/me/domains/progress                    all-domain overview
///
/// /onboarding/sessions                          create (anonymous)
/// /onboarding/sessions/{id}                     get
/// /onboarding/sessions/{id}/flow                next question
/// /onboarding/sessions/{id}/answers             submit answer
/// /onboarding/sessions/{id}/domain              select domain
/// /onboarding/sessions/{id}/payment             confirm payment
/// /onboarding/sessions/{id}/link                link to account (requires auth)
/// /onboarding/sessions/{id}/progress            per-step progress
///
/// /domains/{domain}/questions                   list questions
/// /domains/{domain}/flow                        next question or AI completion
/// /domains/{domain}/answers                     submit, list
/// /domains/{domain}/progress                    progress + subscription status
/// /domains/{domain}/retry-ai                    re-run completion
/// /domains/{domain}/access                      access decision
/// /domains/workout/generate-plan                workout plan (AI rate limit)
/// /domains/diet/generate-meal-plan              meal plan (AI rate limit)
///
/// /images                                       upload (multipart), list
/// /images/{id}                                  get, update, delete
/// /images/{id}/url                              fresh URL
/// /images/{id}/processed                        mark processed
/// /images/{id}/failed                           mark failed
///
/// /insights                                     create
/// /insights/me                                  list own
/// /insights/{id}                                get, update, delete
///
/// /subscriptions                                create
/// /subscriptions/me                             get own
/// /subscriptions/plans                          plan catalog (public)
/// /subscriptions/{id}/cancel                    cancel
///
/// /iap/validate-receipt                         verify store receipt
/// /iap/restore-purchases                        active purchases
/// /iap/webhooks/apple                           App Store notifications
/// /iap/webhooks/google                          Play notifications
/// /iap/products                                 product catalog
///
/// /legal/privacy-policy                         privacy policy
/// /legal/terms-of-service                       terms of service
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Sign-in, refresh, sign-out.
        .nest("/auth", auth::router())
        // The signed-in user's profile and progress.
        .nest("/users", users::router())
        // Anonymous onboarding sessions.
        .nest("/onboarding", onboarding::router())
        // Paid domain flows and plan generators.
        .nest("/domains", domains::router())
        .nest("/images", images::router())
        .nest("/insights", insights::router())
        .nest("/subscriptions", subscriptions::router())
        // In-app purchases and store webhooks.
        .nest("/iap", iap::router())
        .nest("/legal", legal::router())
}
