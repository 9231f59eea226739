//! HTTP-level integration tests for sign-in, token refresh, sign-out, and
//! the bearer-token extractor.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn google_sign_in(app: axum::Router, id_token: &str) -> Value {
    let response = post_json(app, "/api/v1/auth/google", json!({ "id_token": id_token })).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

/// First sign-in creates the account and returns both tokens.
#[sqlx::test(migrations = "../../db/migrations")]
async fn google_sign_in_creates_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let json = google_sign_in(app, "valid:g-123:Alice@Example.com").await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["provider"], "google");
}

/// Signing in twice reuses the same account.
#[sqlx::test(migrations = "../../db/migrations")]
async fn repeat_sign_in_reuses_account(pool: PgPool) {
    let app = common::build_test_app(pool);

    let first = google_sign_in(app.clone(), "valid:g-1:repeat@example.com").await;
    let second = google_sign_in(app, "valid:g-1:repeat@example.com").await;

    assert_eq!(first["user"]["id"], second["user"]["id"]);
    assert_ne!(first["refresh_token"], second["refresh_token"]);
}

/// An email registered with Google cannot sign in through Apple.
#[sqlx::test(migrations = "../../db/migrations")]
async fn provider_mismatch_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    google_sign_in(app.clone(), "valid:g-2:mixed@example.com").await;

    let response = post_json(
        app,
        "/api/v1/auth/apple",
        json!({ "id_token": "valid:a-2:mixed@example.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("registered with google"));
}

/// Apple may omit the email claim; the request body supplies it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn apple_sign_in_falls_back_to_body_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/apple",
        json!({ "id_token": "valid:a-3", "email": "hidden@privaterelay.example" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "hidden@privaterelay.example");
    assert_eq!(json["user"]["provider"], "apple");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_in_without_any_email_is_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/auth/apple", json!({ "id_token": "valid:a-4" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Email not provided by Apple");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_identity_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/auth/google", json!({ "id_token": "forged" })).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Refresh and sign-out
// ---------------------------------------------------------------------------

/// A refresh token is single-use: the rotated token works, the old one does not.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let login = google_sign_in(app.clone(), "valid:g-5:rotate@example.com").await;
    let original = login["refresh_token"].clone();

    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": original }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert_ne!(refreshed["refresh_token"], original);

    let reuse = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": original }),
    )
    .await;
    assert_eq!(reuse.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_out_revokes_refresh_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let login = google_sign_in(app.clone(), "valid:g-6:bye@example.com").await;
    let refresh_token = login["refresh_token"].clone();

    let response = post_json(
        app.clone(),
        "/api/v1/auth/sign-out",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["detail"], "Successfully signed out");

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Refresh token has been revoked");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_out_with_unknown_token_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/sign-out",
        json!({ "refresh_token": "never-issued" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Bearer tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_route_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/users/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/users/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid or expired token");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn access_token_from_sign_in_authenticates(pool: PgPool) {
    let app = common::build_test_app(pool);
    let login = google_sign_in(app.clone(), "valid:g-7:me@example.com").await;
    let token = login["access_token"].as_str().unwrap();

    let response = get_auth(app, "/api/v1/users/me", token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["email"], "me@example.com");
}

/// The auth routes have their own tighter per-client limit.
#[sqlx::test(migrations = "../../db/migrations")]
async fn auth_routes_are_rate_limited(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut statuses = Vec::new();
    for _ in 0..11 {
        let response =
            post_json(app.clone(), "/api/v1/auth/google", json!({ "id_token": "forged" })).await;
        statuses.push(response.status());
    }

    assert!(statuses[..10].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    assert_eq!(statuses[10], StatusCode::TOO_MANY_REQUESTS);
}
