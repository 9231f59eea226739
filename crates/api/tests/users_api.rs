//! HTTP-level integration tests for the signed-in user's profile, wellness
//! cards, and progress summaries.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, patch_json_auth};
use lookslab_db::repositories::{DomainAnswerRepo, OnboardingAnswerRepo, OnboardingSessionRepo};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn question_id(pool: &PgPool, table: &str, like: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE question LIKE $1"))
        .bind(format!("%{like}%"))
        .fetch_one(pool)
        .await
        .expect("seeded question should exist")
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_me_changes_profile_fields(pool: PgPool) {
    let user = common::create_user(&pool, "profile@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = patch_json_auth(
        app.clone(),
        "/api/v1/users/me",
        json!({ "name": "Renamed", "age": 29, "notifications_enabled": false }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["name"], "Renamed");
    assert_eq!(data["age"], 29);
    assert_eq!(data["notifications_enabled"], false);
    assert_eq!(data["email"], "profile@example.com");
    assert!(data.get("last_google_id_token").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_me_rejects_out_of_range_age(pool: PgPool) {
    let user = common::create_user(&pool, "age@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = patch_json_auth(app, "/api/v1/users/me", json!({ "age": 0 }), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Age must be between 1 and 120");
}

/// After deletion the old access token no longer authenticates.
#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_me_removes_account(pool: PgPool) {
    let user = common::create_user(&pool, "leaving@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = delete_auth(app.clone(), "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], "deleted");
    assert_eq!(data["user_id"], user.id);

    let response = get_auth(app, "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Onboarding answers and wellness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn wellness_reads_linked_session_answers(pool: PgPool) {
    let user = common::create_user(&pool, "well@example.com").await;
    let token = common::token_for(&user);

    let session = OnboardingSessionRepo::create(&pool).await.unwrap();
    OnboardingSessionRepo::link_user(&pool, session.id, user.id)
        .await
        .unwrap();
    let answers: [(&str, Value); 4] = [
        ("height", json!("180 cm")),
        ("weight", json!("75 kg")),
        ("sleep", json!("7-8")),
        ("glasses of water", json!(8)),
    ];
    for (like, answer) in &answers {
        let id = question_id(&pool, "onboarding_questions", like).await;
        OnboardingAnswerRepo::upsert(&pool, session.id, id, answer)
            .await
            .unwrap();
    }

    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/users/me/wellness", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["height"], "180 cm");
    assert_eq!(data["weight"], "75 kg");
    assert_eq!(data["sleep_hours"], "7-8");
    assert_eq!(data["water_intake"], 8);
    assert!(!data["daily_quote"].as_str().unwrap().is_empty());

    let response = get_auth(app, "/api/v1/users/me/answers", &token).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["user_id"], user.id);
    assert_eq!(data["answers"].as_array().unwrap().len(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wellness_without_answers_is_empty(pool: PgPool) {
    let user = common::create_user(&pool, "blank@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/users/me/wellness", &token).await;

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["height"], Value::Null);
    assert_eq!(data["water_intake"], Value::Null);
    assert!(data["daily_quote"].is_string());
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn weekly_progress_covers_seven_days(pool: PgPool) {
    let user = common::create_user(&pool, "weekly@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/users/me/progress/weekly", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["user_id"], user.id);
    assert_eq!(data["labels"].as_array().unwrap().len(), 7);
    assert_eq!(data["scores"].as_array().unwrap().len(), 7);
    assert_eq!(data["week_average"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn domains_progress_counts_answers_per_domain(pool: PgPool) {
    let user = common::create_user(&pool, "domains@example.com").await;
    let token = common::token_for(&user);

    let hair_type = question_id(&pool, "domain_questions", "hair type").await;
    DomainAnswerRepo::upsert(&pool, user.id, hair_type, "haircare", &json!("Wavy"))
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/me/domains/progress", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["total_domains"], 8);
    assert_eq!(data["domains_started"], 1);
    assert_eq!(data["domains_completed"], 0);

    let haircare = data["domains"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["domain"] == "haircare")
        .expect("haircare summary should be listed")
        .clone();
    assert_eq!(haircare["answered_questions"], 1);
    assert_eq!(haircare["total_questions"], 5);
    assert_eq!(haircare["progress_percent"], 20.0);
}
