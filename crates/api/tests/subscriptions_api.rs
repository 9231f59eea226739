//! HTTP-level integration tests for direct subscriptions and the plan catalog.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, patch_auth, post_json_auth};
use serde_json::{json, Value};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn plans_are_public_and_priced(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/subscriptions/plans").await;

    assert_eq!(response.status(), StatusCode::OK);
    let plans = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["plan"], "weekly");
    assert_eq!(plans[0]["price"], 4.99);
    assert_eq!(plans[0]["savings_percent"], Value::Null);
    assert_eq!(plans[1]["duration_days"], 30);
    assert_eq!(plans[1]["savings_percent"], 53);
    assert_eq!(plans[2]["duration_days"], 365);
    assert_eq!(plans[2]["savings_percent"], 88);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_activates_once(pool: PgPool) {
    let user = common::create_user(&pool, "subscriber@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/subscriptions/me", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "No subscription found");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/subscriptions",
        json!({ "plan": "monthly" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["plan"], "monthly");
    assert_eq!(data["subscription_status"], "active");
    assert!(data["end_date"].is_string());

    let response = post_json_auth(
        app.clone(),
        "/api/v1/subscriptions",
        json!({ "plan": "yearly" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(app, "/api/v1/subscriptions/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], data["id"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancel_requires_ownership(pool: PgPool) {
    let owner = common::create_user(&pool, "canceller@example.com").await;
    let other = common::create_user(&pool, "meddler@example.com").await;
    let owner_token = common::token_for(&owner);
    let other_token = common::token_for(&other);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/subscriptions",
        json!({ "plan": "weekly" }),
        &owner_token,
    )
    .await;
    let id = body_json(response).await["data"]["id"].clone();
    let uri = format!("/api/v1/subscriptions/{id}/cancel");

    let response = patch_auth(app.clone(), &uri, &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_auth(app.clone(), &uri, &owner_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], "cancelled");
    assert_eq!(data["subscription_status"], "cancelled");

    let response = patch_auth(app, "/api/v1/subscriptions/999999/cancel", &owner_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_plan_is_rejected(pool: PgPool) {
    let user = common::create_user(&pool, "lifetime@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/subscriptions",
        json!({ "plan": "lifetime" }),
        &token,
    )
    .await;

    assert!(response.status().is_client_error());
}
