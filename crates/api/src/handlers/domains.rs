//! Handlers for the paid per-domain question flows.
//!
//! Every route except `/questions` sits behind [`check_domain_access`]:
//! the caller's latest onboarding session must have selected this domain
//! and been paid for, and their subscription must be active and unexpired.
//! Answering the last question runs the domain's AI analysis and returns
//! the mapped output alongside the completed flow.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::Json;
use lookslab_core::domains::{validate_domain, DomainAiProfile};
use lookslab_core::error::CoreError;
use lookslab_core::onboarding::validate_answer;
use lookslab_core::progress::progress_percent;
use lookslab_core::subscription::{effective_status, SubscriptionStatus};
use lookslab_core::types::DbId;
use lookslab_db::models::domain::{DomainAnswerDetail, DomainQuestion};
use lookslab_db::repositories::{
    DomainAnswerRepo, DomainQuestionRepo, ImageRepo, OnboardingSessionRepo, SubscriptionRepo,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::ai::analyzer::{self, AiFields};
use crate::error::{AppError, AppResult};
use crate::handlers::onboarding::string_options;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitDomainAnswer {
    pub question_id: DbId,
    pub answer: Value,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgressCounts {
    pub total: usize,
    pub answered: usize,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct DomainProgress {
    pub user_id: DbId,
    pub domain: String,
    pub progress: ProgressCounts,
    pub answered_questions: Vec<DbId>,
    pub total_questions: usize,
    pub progress_percent: f64,
    pub subscription_status: Option<SubscriptionStatus>,
}

/// The next question in a domain, or the completed state with AI output.
#[derive(Debug, Serialize)]
pub struct DomainFlow {
    pub status: &'static str,
    pub current: Option<DomainQuestion>,
    pub next: Option<DomainQuestion>,
    pub progress: DomainProgress,
    pub redirect: Option<&'static str>,
    #[serde(flatten)]
    pub ai: AiFields,
}

#[derive(Debug, Serialize)]
pub struct DomainAnswers {
    pub user_id: DbId,
    pub domain: String,
    pub answers: Vec<DomainAnswerDetail>,
}

#[derive(Debug, Serialize)]
pub struct DomainAccess {
    pub has_access: bool,
    pub domain: String,
    pub user_id: DbId,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/domains/{domain}/questions
pub async fn list_questions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> AppResult<Json<DataResponse<Vec<DomainQuestion>>>> {
    validate_domain(&domain)?;

    let questions = domain_questions(&state.pool, &domain).await?;
    Ok(Json(DataResponse { data: questions }))
}

/// GET /api/v1/domains/{domain}/flow
pub async fn get_flow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> AppResult<Json<DataResponse<DomainFlow>>> {
    validate_domain(&domain)?;
    check_domain_access(&state.pool, auth.user_id, &domain).await?;

    let flow = next_or_complete(&state, auth.user_id, &domain).await?;
    Ok(Json(DataResponse { data: flow }))
}

/// POST /api/v1/domains/{domain}/retry-ai
///
/// Re-runs completion for a finished flow; an unfinished flow simply
/// returns its next question.
pub async fn retry_ai(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> AppResult<Json<DataResponse<DomainFlow>>> {
    validate_domain(&domain)?;
    check_domain_access(&state.pool, auth.user_id, &domain).await?;

    tracing::info!(user_id = auth.user_id, domain = %domain, "Retrying AI analysis");
    let flow = next_or_complete(&state, auth.user_id, &domain).await?;
    Ok(Json(DataResponse { data: flow }))
}

/// POST /api/v1/domains/{domain}/answers
pub async fn submit_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(input): Json<SubmitDomainAnswer>,
) -> AppResult<Json<DataResponse<DomainFlow>>> {
    validate_domain(&domain)?;
    check_domain_access(&state.pool, auth.user_id, &domain).await?;

    let question = DomainQuestionRepo::find_by_id(&state.pool, input.question_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFoundMessage("Question not found".into())))?;
    if question.domain != domain {
        return Err(AppError::BadRequest(format!(
            "Question {} does not belong to domain '{domain}'",
            question.id
        )));
    }

    let options = string_options(question.options.as_ref());
    validate_answer(
        &input.answer,
        Some(&question.question_type),
        &options,
        question.constraints.as_ref(),
    )?;

    DomainAnswerRepo::upsert(&state.pool, auth.user_id, question.id, &domain, &input.answer)
        .await?;
    tracing::info!(
        user_id = auth.user_id,
        domain = %domain,
        question_id = question.id,
        "Saved domain answer",
    );

    let flow = next_or_complete(&state, auth.user_id, &domain).await?;
    Ok(Json(DataResponse { data: flow }))
}

/// GET /api/v1/domains/{domain}/answers
pub async fn list_answers(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> AppResult<Json<DataResponse<DomainAnswers>>> {
    validate_domain(&domain)?;
    check_domain_access(&state.pool, auth.user_id, &domain).await?;

    let answers = DomainAnswerRepo::list_details(&state.pool, auth.user_id, &domain).await?;
    Ok(Json(DataResponse {
        data: DomainAnswers {
            user_id: auth.user_id,
            domain,
            answers,
        },
    }))
}

/// GET /api/v1/domains/{domain}/progress
pub async fn get_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> AppResult<Json<DataResponse<DomainProgress>>> {
    validate_domain(&domain)?;
    check_domain_access(&state.pool, auth.user_id, &domain).await?;

    let progress = calculate_progress(&state.pool, auth.user_id, &domain).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/domains/{domain}/access
///
/// Reports the access decision instead of failing with it.
pub async fn get_access(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> AppResult<Json<DataResponse<DomainAccess>>> {
    validate_domain(&domain)?;

    let (has_access, message) =
        match check_domain_access(&state.pool, auth.user_id, &domain).await {
            Ok(()) => (true, "Access granted".to_string()),
            Err(AppError::Core(CoreError::Forbidden(msg) | CoreError::PaymentRequired(msg))) => {
                (false, msg)
            }
            Err(e) => return Err(e),
        };

    Ok(Json(DataResponse {
        data: DomainAccess {
            has_access,
            domain,
            user_id: auth.user_id,
            message,
        },
    }))
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// Gate a user's entry into `domain`.
///
/// Checks run in a fixed order so the first unmet requirement is the one
/// reported: session, selected domain, payment, subscription presence,
/// expiry, then status.
pub async fn check_domain_access(pool: &PgPool, user_id: DbId, domain: &str) -> AppResult<()> {
    let session = OnboardingSessionRepo::find_latest_for_user(pool, user_id)
        .await?
        .ok_or_else(|| forbidden("No onboarding session found"))?;

    match session.selected_domain.as_deref() {
        Some(selected) if selected == domain => {}
        selected => {
            return Err(forbidden(&format!(
                "Access denied. Your selected domain is '{}'",
                selected.unwrap_or("none")
            )));
        }
    }

    if !session.is_paid {
        return Err(payment_required("Payment required for domain access"));
    }

    let subscription = SubscriptionRepo::find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| forbidden("No active subscription found"))?;

    if subscription
        .end_date
        .is_some_and(|end| end < chrono::Utc::now())
    {
        return Err(payment_required("Subscription expired"));
    }

    if subscription.status != SubscriptionStatus::Active.as_str() {
        return Err(forbidden(&format!(
            "Subscription not active (status: {})",
            subscription.status
        )));
    }

    Ok(())
}

fn forbidden(msg: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(msg.to_string()))
}

fn payment_required(msg: &str) -> AppError {
    AppError::Core(CoreError::PaymentRequired(msg.to_string()))
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

async fn calculate_progress(pool: &PgPool, user_id: DbId, domain: &str) -> AppResult<DomainProgress> {
    let total = DomainQuestionRepo::list_by_domain(pool, domain).await?.len();
    let answered_questions = DomainAnswerRepo::answered_question_ids(pool, user_id, domain).await?;
    let answered = answered_questions.len();

    let subscription_status = SubscriptionRepo::find_by_user(pool, user_id)
        .await?
        .map(|s| effective_status(&s.status, s.end_date, chrono::Utc::now()))
        .transpose()?;

    Ok(DomainProgress {
        user_id,
        domain: domain.to_string(),
        progress: ProgressCounts {
            total,
            answered,
            completed: total > 0 && answered == total,
        },
        answered_questions,
        total_questions: total,
        progress_percent: progress_percent(answered, total),
        subscription_status,
    })
}

/// Return the first unanswered question with the one after it, or run
/// completion once every question has an answer.
/// The domain's questions in order. A domain without seeded questions is 404.
async fn domain_questions(pool: &PgPool, domain: &str) -> AppResult<Vec<DomainQuestion>> {
    let questions = DomainQuestionRepo::list_by_domain(pool, domain).await?;
    if questions.is_empty() {
        return Err(AppError::Core(CoreError::NotFoundMessage(format!(
            "No questions found for domain '{domain}'"
        ))));
    }
    Ok(questions)
}

async fn next_or_complete(state: &AppState, user_id: DbId, domain: &str) -> AppResult<DomainFlow> {
    let questions = domain_questions(&state.pool, domain).await?;
    let answered: HashSet<DbId> =
        DomainAnswerRepo::answered_question_ids(&state.pool, user_id, domain)
            .await?
            .into_iter()
            .collect();

    if let Some(idx) = questions.iter().position(|q| !answered.contains(&q.id)) {
        let mut rest = questions.into_iter().skip(idx);
        return Ok(DomainFlow {
            status: "ok",
            current: rest.next(),
            next: rest.next(),
            progress: calculate_progress(&state.pool, user_id, domain).await?,
            redirect: None,
            ai: AiFields::default(),
        });
    }

    complete_domain(state, user_id, domain).await
}

async fn complete_domain(state: &AppState, user_id: DbId, domain: &str) -> AppResult<DomainFlow> {
    let progress = calculate_progress(&state.pool, user_id, domain).await?;
    let answers = DomainAnswerRepo::list_details(&state.pool, user_id, domain).await?;
    let images = ImageRepo::list_for_domain(&state.pool, user_id, domain).await?;

    let profile = DomainAiProfile::for_domain(domain);
    let ai = if answers.len() < profile.min_answers {
        tracing::warn!(
            user_id,
            domain,
            answers = answers.len(),
            required = profile.min_answers,
            "Too few answers for AI analysis",
        );
        AiFields::default()
    } else if !profile.can_run_analysis(answers.len(), images.len()) {
        tracing::warn!(user_id, domain, "AI analysis requires images but none were uploaded");
        AiFields::default()
    } else if let Some(llm) = state.llm.as_deref() {
        match analyzer::analyze(llm, domain, &answers, &images).await {
            Some(output) => {
                tracing::info!(user_id, domain, "AI analysis complete");
                AiFields::from_output(&output)
            }
            None => AiFields::default(),
        }
    } else {
        tracing::warn!(user_id, domain, "AI client not configured; skipping analysis");
        AiFields::default()
    };

    Ok(DomainFlow {
        status: "completed",
        current: None,
        next: None,
        progress,
        redirect: Some("completed_flow"),
        ai,
    })
}
