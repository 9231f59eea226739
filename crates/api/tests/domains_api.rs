//! HTTP-level integration tests for the paid domain flows: access gating,
//! answer submission, completion with AI analysis, and plan generation.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, get_auth, post_json_auth, FailingLlm, FakeLlm};
use lookslab_api::ai::LlmClient;
use lookslab_db::models::subscription::CreateSubscription;
use lookslab_db::models::user::User;
use lookslab_db::repositories::{OnboardingSessionRepo, SubscriptionRepo};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Give `user` a paid session for `domain`, optionally with a subscription
/// of the given status and end date.
async fn grant(
    pool: &PgPool,
    user: &User,
    domain: &str,
    subscription: Option<(&str, chrono::DateTime<Utc>)>,
) {
    let session = OnboardingSessionRepo::create(pool).await.unwrap();
    OnboardingSessionRepo::link_user(pool, session.id, user.id)
        .await
        .unwrap();
    OnboardingSessionRepo::select_domain(pool, session.id, domain)
        .await
        .unwrap();
    OnboardingSessionRepo::confirm_payment(pool, session.id)
        .await
        .unwrap();

    if let Some((status, end_date)) = subscription {
        SubscriptionRepo::create(
            pool,
            &CreateSubscription {
                user_id: user.id,
                plan: "monthly".to_string(),
                status: status.to_string(),
                payment_id: None,
                start_date: Some(Utc::now()),
                end_date: Some(end_date),
            },
        )
        .await
        .unwrap();
    }
}

async fn grant_active(pool: &PgPool, user: &User, domain: &str) {
    grant(pool, user, domain, Some(("active", Utc::now() + Duration::days(30)))).await;
}

/// A valid answer for a seeded domain question.
fn answer_for(question: &Value) -> Value {
    let first_option = || question["options"][0].clone();
    match question["question_type"].as_str().unwrap() {
        "choice" => first_option(),
        "multi-choice" => json!([first_option()]),
        "number" => question["constraints"]["min"].clone(),
        _ => json!("Nothing special"),
    }
}

/// Answer every question in `domain` and return the final flow.
async fn complete_domain(app: axum::Router, token: &str, domain: &str) -> Value {
    let response = get_auth(app.clone(), &format!("/api/v1/domains/{domain}/flow"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let mut flow = body_json(response).await["data"].clone();

    while flow["status"] == "ok" {
        let question = flow["current"].clone();
        let response = post_json_auth(
            app.clone(),
            &format!("/api/v1/domains/{domain}/answers"),
            json!({ "question_id": question["id"], "answer": answer_for(&question) }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "question {question}");
        flow = body_json(response).await["data"].clone();
    }
    flow
}

async fn access_message(app: axum::Router, token: &str, domain: &str) -> (bool, String) {
    let response = get_auth(app, &format!("/api/v1/domains/{domain}/access"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    (
        data["has_access"].as_bool().unwrap(),
        data["message"].as_str().unwrap().to_string(),
    )
}

fn with_llm(llm: impl LlmClient + 'static) -> Option<Arc<dyn LlmClient>> {
    Some(Arc::new(llm))
}

// ---------------------------------------------------------------------------
// Questions and access
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn questions_are_listed_in_order(pool: PgPool) {
    let user = common::create_user(&pool, "questions@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/domains/skincare/questions", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let questions = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(questions.len(), 6);
    let seqs: Vec<i64> = questions.iter().map(|q| q["seq"].as_i64().unwrap()).collect();
    assert_eq!(seqs, [1, 2, 3, 4, 5, 6]);

    let response = get_auth(app, "/api/v1/domains/tarot/questions", &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Each unmet requirement is reported in order until access is granted.
#[sqlx::test(migrations = "../../db/migrations")]
async fn access_checks_run_in_order(pool: PgPool) {
    let user = common::create_user(&pool, "gate@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool.clone());

    assert_eq!(
        access_message(app.clone(), &token, "haircare").await,
        (false, "No onboarding session found".to_string())
    );

    let session = OnboardingSessionRepo::create(&pool).await.unwrap();
    OnboardingSessionRepo::link_user(&pool, session.id, user.id)
        .await
        .unwrap();
    assert_eq!(
        access_message(app.clone(), &token, "haircare").await,
        (false, "Access denied. Your selected domain is 'none'".to_string())
    );

    OnboardingSessionRepo::select_domain(&pool, session.id, "fashion")
        .await
        .unwrap();
    assert_eq!(
        access_message(app.clone(), &token, "haircare").await,
        (false, "Access denied. Your selected domain is 'fashion'".to_string())
    );

    OnboardingSessionRepo::select_domain(&pool, session.id, "haircare")
        .await
        .unwrap();
    assert_eq!(
        access_message(app.clone(), &token, "haircare").await,
        (false, "Payment required for domain access".to_string())
    );

    OnboardingSessionRepo::confirm_payment(&pool, session.id)
        .await
        .unwrap();
    assert_eq!(
        access_message(app.clone(), &token, "haircare").await,
        (false, "No active subscription found".to_string())
    );

    SubscriptionRepo::create(
        &pool,
        &CreateSubscription {
            user_id: user.id,
            plan: "weekly".to_string(),
            status: "active".to_string(),
            payment_id: None,
            start_date: Some(Utc::now()),
            end_date: Some(Utc::now() + Duration::days(7)),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        access_message(app, &token, "haircare").await,
        (true, "Access granted".to_string())
    );
}

/// A domain with no seeded questions is 404 rather than instantly complete.
#[sqlx::test(migrations = "../../db/migrations")]
async fn flow_for_domain_without_questions_is_404(pool: PgPool) {
    let user = common::create_user(&pool, "empty@example.com").await;
    let token = common::token_for(&user);
    grant_active(&pool, &user, "height").await;
    sqlx::query("DELETE FROM domain_questions WHERE domain = 'height'")
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/domains/height/flow", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "No questions found for domain 'height'"
    );

    let response = post_json_auth(app, "/api/v1/domains/height/retry-ai", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn flow_without_payment_is_402(pool: PgPool) {
    let user = common::create_user(&pool, "unpaid@example.com").await;
    let token = common::token_for(&user);
    let session = OnboardingSessionRepo::create(&pool).await.unwrap();
    OnboardingSessionRepo::link_user(&pool, session.id, user.id)
        .await
        .unwrap();
    OnboardingSessionRepo::select_domain(&pool, session.id, "haircare")
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/domains/haircare/flow", &token).await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body_json(response).await["code"], "PAYMENT_REQUIRED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_subscription_is_402(pool: PgPool) {
    let user = common::create_user(&pool, "expired@example.com").await;
    let token = common::token_for(&user);
    grant(
        &pool,
        &user,
        "haircare",
        Some(("active", Utc::now() - Duration::days(1))),
    )
    .await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/domains/haircare/flow", &token).await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body_json(response).await["error"], "Subscription expired");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_subscription_is_403(pool: PgPool) {
    let user = common::create_user(&pool, "cancelled@example.com").await;
    let token = common::token_for(&user);
    grant(
        &pool,
        &user,
        "haircare",
        Some(("cancelled", Utc::now() + Duration::days(10))),
    )
    .await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/domains/haircare/progress", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "Subscription not active (status: cancelled)"
    );
}

// ---------------------------------------------------------------------------
// Answers and completion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn answer_from_another_domain_is_rejected(pool: PgPool) {
    let user = common::create_user(&pool, "crossed@example.com").await;
    let token = common::token_for(&user);
    grant_active(&pool, &user, "haircare").await;
    let skin_type: i64 = sqlx::query_scalar(
        "SELECT id FROM domain_questions WHERE domain = 'skincare' AND seq = 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/domains/haircare/answers",
        json!({ "question_id": skin_type, "answer": "Oily" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        format!("Question {skin_type} does not belong to domain 'haircare'")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_choice_is_rejected(pool: PgPool) {
    let user = common::create_user(&pool, "choice@example.com").await;
    let token = common::token_for(&user);
    grant_active(&pool, &user, "haircare").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/domains/haircare/flow", &token).await;
    let question = body_json(response).await["data"]["current"].clone();

    let response = post_json_auth(
        app,
        "/api/v1/domains/haircare/answers",
        json!({ "question_id": question["id"], "answer": "Purple" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

/// Finishing the flow runs the analysis and maps the output onto the response.
#[sqlx::test(migrations = "../../db/migrations")]
async fn completing_haircare_returns_ai_fields(pool: PgPool) {
    let user = common::create_user(&pool, "hair@example.com").await;
    let token = common::token_for(&user);
    grant_active(&pool, &user, "haircare").await;
    let app = common::build_test_app_with_llm(
        pool,
        with_llm(FakeLlm(json!({
            "attributes": { "hair_type": "Straight" },
            "health": { "score": 72 },
            "concerns": ["Hair fall"],
            "motivational_message": "Keep going",
        }))),
    );

    let flow = complete_domain(app.clone(), &token, "haircare").await;

    assert_eq!(flow["status"], "completed");
    assert_eq!(flow["redirect"], "completed_flow");
    assert_eq!(flow["progress"]["progress_percent"], 100.0);
    assert_eq!(flow["ai_attributes"]["hair_type"], "Straight");
    assert_eq!(flow["ai_health"]["score"], 72);
    assert_eq!(flow["ai_message"], "Keep going");
    assert_eq!(flow["ai_products"], Value::Null);

    let response = get_auth(app, "/api/v1/domains/haircare/answers", &token).await;
    let answers = body_json(response).await["data"]["answers"]
        .as_array()
        .unwrap()
        .len();
    assert_eq!(answers, 5);
}

/// A failing model still completes the flow, just without AI output.
#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_analysis_still_completes(pool: PgPool) {
    let user = common::create_user(&pool, "flaky@example.com").await;
    let token = common::token_for(&user);
    grant_active(&pool, &user, "haircare").await;
    let app = common::build_test_app_with_llm(pool, with_llm(FailingLlm));

    let flow = complete_domain(app.clone(), &token, "haircare").await;

    assert_eq!(flow["status"], "completed");
    assert_eq!(flow["ai_attributes"], Value::Null);

    let response = post_json_auth(app, "/api/v1/domains/haircare/retry-ai", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "completed");
}

/// Skincare analysis needs a photo; without one the flow completes with no AI output.
#[sqlx::test(migrations = "../../db/migrations")]
async fn skincare_without_images_skips_analysis(pool: PgPool) {
    let user = common::create_user(&pool, "skin@example.com").await;
    let token = common::token_for(&user);
    grant_active(&pool, &user, "skincare").await;
    let app = common::build_test_app_with_llm(
        pool,
        with_llm(FakeLlm(json!({ "attributes": { "skin_type": "Oily" } }))),
    );

    let flow = complete_domain(app, &token, "skincare").await;

    assert_eq!(flow["status"], "completed");
    assert_eq!(flow["ai_attributes"], Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn progress_tracks_answered_questions(pool: PgPool) {
    let user = common::create_user(&pool, "progress@example.com").await;
    let token = common::token_for(&user);
    grant_active(&pool, &user, "haircare").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/domains/haircare/flow", &token).await;
    let question = body_json(response).await["data"]["current"].clone();
    post_json_auth(
        app.clone(),
        "/api/v1/domains/haircare/answers",
        json!({ "question_id": question["id"], "answer": answer_for(&question) }),
        &token,
    )
    .await;

    let response = get_auth(app, "/api/v1/domains/haircare/progress", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["total_questions"], 5);
    assert_eq!(data["answered_questions"].as_array().unwrap().len(), 1);
    assert_eq!(data["progress_percent"], 20.0);
    assert_eq!(data["subscription_status"], "active");
}

// ---------------------------------------------------------------------------
// Plan generation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn workout_plan_is_generated(pool: PgPool) {
    let user = common::create_user(&pool, "lifter@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app_with_llm(
        pool,
        with_llm(FakeLlm(json!({ "title": "Strength Day", "exercises": [] }))),
    );

    let response = post_json_auth(
        app,
        "/api/v1/domains/workout/generate-plan",
        json!({ "focus": "strength", "duration_minutes": 45 }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let plan = body_json(response).await;
    assert_eq!(plan["title"], "Strength Day");
    assert!(plan["generated_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn meal_plan_is_generated(pool: PgPool) {
    let user = common::create_user(&pool, "eater@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app_with_llm(
        pool,
        with_llm(FakeLlm(json!({ "meals": [], "total_calories": 2200 }))),
    );

    let response = post_json_auth(
        app,
        "/api/v1/domains/diet/generate-meal-plan",
        json!({ "focus": "maintenance", "calorie_target": 2200 }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total_calories"], 2200);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn plan_requests_are_validated(pool: PgPool) {
    let user = common::create_user(&pool, "planner@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app_with_llm(pool, with_llm(FakeLlm(json!({}))));

    let response = post_json_auth(
        app.clone(),
        "/api/v1/domains/workout/generate-plan",
        json!({ "focus": "strength", "duration_minutes": 500 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = post_json_auth(
        app,
        "/api/v1/domains/skincare/generate-plan",
        json!({ "focus": "strength" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn plan_generation_without_model_is_500(pool: PgPool) {
    let user = common::create_user(&pool, "nomodel@example.com").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/domains/workout/generate-plan",
        json!({ "focus": "fatloss" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
