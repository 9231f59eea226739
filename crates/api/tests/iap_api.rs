//! HTTP-level integration tests for in-app purchase receipts, restores,
//! store webhooks, and the product catalog.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use base64::Engine;
use chrono::Utc;
use common::{body_json, get, get_auth, post_auth, post_json, post_json_auth};
use httpmock::prelude::*;
use lookslab_api::iap::IapClient;
use lookslab_api::router::build_app_router;
use serde_json::json;
use sqlx::PgPool;

fn google_receipt(product_id: &str) -> serde_json::Value {
    json!({
        "provider": "google",
        "product_id": product_id,
        "receipt_data": "play-receipt",
        "purchase_token": "play-token",
    })
}

// ---------------------------------------------------------------------------
// Receipt validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn google_receipt_activates_subscription(pool: PgPool) {
    let user = common::create_user(&pool, "android@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/iap/validate-receipt",
        google_receipt("looks_lab_yearly"),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["subscription_active"], true);
    assert_eq!(json["plan"], "yearly");
    assert!(json["expires_at"].is_string());

    let response = get_auth(app, "/api/v1/subscriptions/me", &token).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["plan"], "yearly");
    assert_eq!(data["payment_id"], "looks_lab_yearly");
    assert_eq!(data["subscription_status"], "active");
}

/// A second receipt replaces the existing subscription instead of conflicting.
#[sqlx::test(migrations = "../../db/migrations")]
async fn later_receipt_replaces_plan(pool: PgPool) {
    let user = common::create_user(&pool, "upgrader@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    for product in ["looks_lab_weekly", "looks_lab_monthly"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/iap/validate-receipt",
            google_receipt(product),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(app, "/api/v1/subscriptions/me", &token).await;
    assert_eq!(body_json(response).await["data"]["plan"], "monthly");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unreachable_apple_endpoint_is_bad_request(pool: PgPool) {
    let user = common::create_user(&pool, "offline@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/iap/validate-receipt",
        json!({
            "provider": "apple",
            "product_id": "com.lookslab.monthly",
            "receipt_data": "apple-receipt",
        }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .starts_with("Apple validation failed"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn apple_receipt_uses_store_expiry(pool: PgPool) {
    let server = MockServer::start_async().await;
    let expires_ms = (Utc::now() + chrono::Duration::days(5)).timestamp_millis();
    server
        .mock_async(|when, then| {
            when.method(POST).path("/verifyReceipt");
            then.status(200).json_body(json!({
                "status": 0,
                "latest_receipt_info": [{ "expires_date_ms": expires_ms.to_string() }],
            }));
        })
        .await;

    let user = common::create_user(&pool, "iphone@example.com").await;
    let token = common::token_for(&user);
    let mut state = common::test_state(pool, None);
    state.iap = Arc::new(IapClient::new(
        server.url("/verifyReceipt"),
        server.url("/sandbox/verifyReceipt"),
        Some("secret".into()),
    ));
    let config = Arc::clone(&state.config);
    let app = build_app_router(state, &config);

    let response = post_json_auth(
        app,
        "/api/v1/iap/validate-receipt",
        json!({
            "provider": "apple",
            "product_id": "com.lookslab.weekly",
            "receipt_data": "apple-receipt",
        }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["subscription_active"], true);
    assert_eq!(json["plan"], "weekly");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn validate_receipt_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/iap/validate-receipt",
        google_receipt("looks_lab_monthly"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn restore_lists_active_subscription(pool: PgPool) {
    let user = common::create_user(&pool, "restorer@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = post_auth(app.clone(), "/api/v1/iap/restore-purchases", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["message"], "Found 0 active subscription(s)");

    post_json_auth(
        app.clone(),
        "/api/v1/iap/validate-receipt",
        google_receipt("looks_lab_monthly"),
        &token,
    )
    .await;

    let response = post_auth(app, "/api/v1/iap/restore-purchases", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Found 1 active subscription(s)");
    assert_eq!(json["purchases"][0]["plan"], "monthly");
}

// ---------------------------------------------------------------------------
// Webhooks and catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn webhooks_acknowledge_notifications(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/iap/webhooks/apple",
        json!({ "notification_type": "DID_RENEW" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "success");

    let data = base64::engine::general_purpose::STANDARD
        .encode(json!({ "subscriptionNotification": { "notificationType": 2 } }).to_string());
    let response = post_json(
        app.clone(),
        "/api/v1/iap/webhooks/google",
        json!({ "message": { "data": data } }),
    )
    .await;
    assert_eq!(body_json(response).await["status"], "success");

    let response = post_json(
        app,
        "/api/v1/iap/webhooks/google",
        json!({ "message": { "data": "%%%" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "error");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn products_cover_both_platforms(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/iap/products").await;

    assert_eq!(response.status(), StatusCode::OK);
    let products = body_json(response).await["products"].as_array().unwrap().clone();
    assert_eq!(products.len(), 6);
    assert_eq!(products[0]["id"], "com.lookslab.weekly");
    assert_eq!(products[0]["type"], "subscription");
    assert_eq!(
        products.iter().filter(|p| p["platform"] == "android").count(),
        3
    );
}
