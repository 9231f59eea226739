//! Handlers for anonymous onboarding sessions.
//!
//! A session walks the fixed step order one question at a time. When the
//! last step is answered the flow completes and returns a redirect telling
//! the client what is still missing (domain, payment, or sign-in).

use std::collections::{BTreeMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lookslab_core::domains::validate_domain;
use lookslab_core::error::CoreError;
use lookslab_core::onboarding::{
    determine_redirect, next_step, validate_answer, validate_step, StepProgress,
    ONBOARDING_ORDER, STEP_COMPLETED, STEP_PROFILE_SETUP,
};
use lookslab_core::subscription::SubscriptionStatus;
use lookslab_core::types::{DbId, Timestamp};
use lookslab_db::models::onboarding::{OnboardingQuestion, OnboardingSession};
use lookslab_db::repositories::{
    OnboardingAnswerRepo, OnboardingQuestionRepo, OnboardingSessionRepo, UserRepo,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FlowQuery {
    pub step: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DomainQuery {
    pub domain: String,
}

/// Request body for `POST /onboarding/sessions/{id}/answers`.
///
/// `question_type`, `question_options`, and `constraints` override the
/// stored question's values during validation.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswer {
    pub question_id: DbId,
    pub answer: Value,
    pub question_type: Option<String>,
    pub question_options: Option<Vec<String>>,
    pub constraints: Option<Value>,
}

/// Per-step and overall answer counts for a session.
#[derive(Debug, Serialize)]
pub struct SessionProgress {
    pub sections: BTreeMap<&'static str, StepProgress>,
    pub overall: StepProgress,
}

#[derive(Debug, Serialize)]
pub struct FlowProgress {
    pub session_id: Uuid,
    pub step: String,
    pub answered_questions: Vec<DbId>,
    pub total_questions: usize,
    pub progress: SessionProgress,
}

/// The next question to show, or the completed state with a redirect.
#[derive(Debug, Serialize)]
pub struct OnboardingFlow {
    pub status: &'static str,
    pub current: Option<OnboardingQuestion>,
    pub next: Option<OnboardingQuestion>,
    pub progress: FlowProgress,
    pub redirect: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DomainSelection {
    pub session_id: Uuid,
    pub selected_domain: String,
    pub subscription_status: SubscriptionStatus,
    pub is_paid: bool,
    pub payment_confirmed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/onboarding/sessions
pub async fn create_session(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let session = OnboardingSessionRepo::create(&state.pool).await?;
    tracing::info!(session_id = %session.id, "Created onboarding session");
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/v1/onboarding/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<OnboardingSession>>> {
    let session = find_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: session }))
}

/// GET /api/v1/onboarding/sessions/{id}/flow?step=profile_setup
pub async fn get_flow(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<FlowQuery>,
) -> AppResult<Json<DataResponse<OnboardingFlow>>> {
    let step = query.step.unwrap_or_else(|| STEP_PROFILE_SETUP.to_string());
    validate_step(&step)?;
    find_session(&state.pool, session_id).await?;

    let flow = next_or_complete(&state.pool, session_id, &step).await?;
    Ok(Json(DataResponse { data: flow }))
}

/// POST /api/v1/onboarding/sessions/{id}/answers
///
/// Save (or replace) an answer, then return the flow for the question's step.
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<SubmitAnswer>,
) -> AppResult<Json<DataResponse<OnboardingFlow>>> {
    find_session(&state.pool, session_id).await?;

    let question = OnboardingQuestionRepo::find_by_id(&state.pool, input.question_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFoundMessage("Question not found".into())))?;

    let question_type = input
        .question_type
        .as_deref()
        .unwrap_or(&question.question_type);
    let options = input
        .question_options
        .unwrap_or_else(|| string_options(question.options.as_ref()));
    let constraints = input.constraints.as_ref().or(question.constraints.as_ref());

    validate_answer(&input.answer, Some(question_type), &options, constraints)?;

    OnboardingAnswerRepo::upsert(&state.pool, session_id, question.id, &input.answer).await?;
    tracing::info!(
        session_id = %session_id,
        question_id = question.id,
        step = %question.step,
        "Saved onboarding answer",
    );

    let flow = next_or_complete(&state.pool, session_id, &question.step).await?;
    Ok(Json(DataResponse { data: flow }))
}

/// PATCH /api/v1/onboarding/sessions/{id}/domain?domain=skincare
pub async fn select_domain(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<DomainQuery>,
) -> AppResult<Json<DataResponse<DomainSelection>>> {
    validate_domain(&query.domain)?;

    let session = OnboardingSessionRepo::select_domain(&state.pool, session_id, &query.domain)
        .await?
        .ok_or_else(session_not_found)?;
    tracing::info!(session_id = %session_id, domain = %query.domain, "Selected domain");

    let subscription_status = if session.is_paid {
        SubscriptionStatus::Active
    } else {
        SubscriptionStatus::Pending
    };

    Ok(Json(DataResponse {
        data: DomainSelection {
            session_id: session.id,
            selected_domain: query.domain,
            subscription_status,
            is_paid: session.is_paid,
            payment_confirmed_at: session.payment_confirmed_at,
        },
    }))
}

/// PATCH /api/v1/onboarding/sessions/{id}/payment
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<OnboardingSession>>> {
    let session = OnboardingSessionRepo::confirm_payment(&state.pool, session_id)
        .await?
        .ok_or_else(session_not_found)?;
    tracing::info!(session_id = %session_id, "Payment confirmed");
    Ok(Json(DataResponse { data: session }))
}

/// PATCH /api/v1/onboarding/sessions/{id}/link
///
/// Attach an anonymous session to the signed-in user.
pub async fn link_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<OnboardingSession>>> {
    find_session(&state.pool, session_id).await?;

    let session = OnboardingSessionRepo::link_user(&state.pool, session_id, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("Session is already linked to a user account".into())
        })?;
    tracing::info!(session_id = %session_id, user_id = auth.user_id, "Linked session to user");
    Ok(Json(DataResponse { data: session }))
}

/// GET /api/v1/onboarding/sessions/{id}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<SessionProgress>>> {
    find_session(&state.pool, session_id).await?;
    let progress = session_progress(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: progress }))
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

fn session_not_found() -> AppError {
    AppError::Core(CoreError::NotFoundMessage(
        "Onboarding session not found".into(),
    ))
}

async fn find_session(pool: &PgPool, session_id: Uuid) -> AppResult<OnboardingSession> {
    OnboardingSessionRepo::find_by_id(pool, session_id)
        .await?
        .ok_or_else(session_not_found)
}

/// String entries of a stored JSON options array.
pub(crate) fn string_options(options: Option<&Value>) -> Vec<String> {
    options
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

async fn session_progress(pool: &PgPool, session_id: Uuid) -> AppResult<SessionProgress> {
    let questions = OnboardingQuestionRepo::list_all(pool).await?;
    let answered: HashSet<DbId> = OnboardingAnswerRepo::answered_question_ids(pool, session_id)
        .await?
        .into_iter()
        .collect();

    let sections = ONBOARDING_ORDER
        .iter()
        .map(|step| {
            let in_step = questions.iter().filter(|q| q.step == *step);
            let total = in_step.clone().count();
            let done = in_step.filter(|q| answered.contains(&q.id)).count();
            (*step, StepProgress::new(total, done))
        })
        .collect();

    Ok(SessionProgress {
        sections,
        overall: StepProgress::new(questions.len(), answered.len()),
    })
}

/// Return the first unanswered question in `step`, else the first question
/// of the following step, else complete the session.
async fn next_or_complete(pool: &PgPool, session_id: Uuid, step: &str) -> AppResult<OnboardingFlow> {
    let questions = OnboardingQuestionRepo::list_by_step(pool, step).await?;
    let answered_ids = OnboardingAnswerRepo::answered_question_ids(pool, session_id).await?;

    if let Some(idx) = questions.iter().position(|q| !answered_ids.contains(&q.id)) {
        let total_questions = questions.len();
        let mut rest = questions.into_iter().skip(idx);
        return Ok(OnboardingFlow {
            status: "ok",
            current: rest.next(),
            next: rest.next(),
            progress: FlowProgress {
                session_id,
                step: step.to_string(),
                answered_questions: answered_ids,
                total_questions,
                progress: session_progress(pool, session_id).await?,
            },
            redirect: None,
        });
    }

    if let Some(following) = next_step(step) {
        let next_questions = OnboardingQuestionRepo::list_by_step(pool, following).await?;
        if !next_questions.is_empty() {
            let total_questions = next_questions.len();
            let mut rest = next_questions.into_iter();
            return Ok(OnboardingFlow {
                status: "ok",
                current: rest.next(),
                next: rest.next(),
                progress: FlowProgress {
                    session_id,
                    step: following.to_string(),
                    answered_questions: answered_ids,
                    total_questions,
                    progress: session_progress(pool, session_id).await?,
                },
                redirect: None,
            });
        }
    }

    complete_onboarding(pool, session_id).await
}

async fn complete_onboarding(pool: &PgPool, session_id: Uuid) -> AppResult<OnboardingFlow> {
    let session = find_session(pool, session_id).await?;
    let progress = session_progress(pool, session_id).await?;

    if let Some(user_id) = session.user_id {
        if UserRepo::mark_onboarding_complete(pool, user_id).await? {
            tracing::info!(user_id, "Marked onboarding complete");
        }
    }

    let redirect = determine_redirect(
        session.selected_domain.as_deref(),
        session.is_paid,
        session.user_id.is_some(),
    );

    Ok(OnboardingFlow {
        status: "completed",
        current: None,
        next: None,
        progress: FlowProgress {
            session_id,
            step: STEP_COMPLETED.to_string(),
            answered_questions: Vec::new(),
            total_questions: 0,
            progress,
        },
        redirect: Some(redirect),
    })
}
