//! Handlers for the signed-in user's account, progress, and wellness data.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use lookslab_core::domains::VALID_DOMAINS;
use lookslab_core::error::CoreError;
use lookslab_core::onboarding::{match_wellness_metric, WELLNESS_STEPS};
use lookslab_core::progress::{weekly_scores, DomainProgressSummary, DomainsOverview, WeeklyProgress};
use lookslab_core::quotes::daily_quote;
use lookslab_core::types::DbId;
use lookslab_db::models::onboarding::OnboardingAnswerDetail;
use lookslab_db::models::user::{UpdateUser, User};
use lookslab_db::repositories::{
    DomainAnswerRepo, DomainQuestionRepo, OnboardingAnswerRepo, UserRepo,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DeletedUser {
    pub status: &'static str,
    pub user_id: DbId,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserWeeklyProgress {
    pub user_id: DbId,
    #[serde(flatten)]
    pub progress: WeeklyProgress,
}

#[derive(Debug, Serialize)]
pub struct UserAnswers {
    pub user_id: DbId,
    pub answers: Vec<OnboardingAnswerDetail>,
}

/// Home-screen wellness cards. Each metric is the raw onboarding answer.
#[derive(Debug, Default, Serialize)]
pub struct WellnessMetrics {
    pub height: Option<Value>,
    pub weight: Option<Value>,
    pub sleep_hours: Option<Value>,
    pub water_intake: Option<Value>,
    pub daily_quote: &'static str,
}

impl WellnessMetrics {
    /// Fill metrics from wellness-step answers. Later answers win.
    pub fn from_answers(answers: &[OnboardingAnswerDetail], daily_quote: &'static str) -> Self {
        let mut metrics = Self {
            daily_quote,
            ..Self::default()
        };
        for answer in answers
            .iter()
            .filter(|a| WELLNESS_STEPS.contains(&a.step.as_str()))
        {
            let slot = match match_wellness_metric(&answer.question) {
                Some("height") => &mut metrics.height,
                Some("weight") => &mut metrics.weight,
                Some("sleep_hours") => &mut metrics.sleep_hours,
                Some("water_intake") => &mut metrics.water_intake,
                _ => continue,
            };
            *slot = Some(answer.answer.clone());
        }
        metrics
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: user }))
}

/// PATCH /api/v1/users/me
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<User>>> {
    if input.age.is_some_and(|age| !(1..=120).contains(&age)) {
        return Err(AppError::Core(CoreError::Validation(
            "Age must be between 1 and 120".into(),
        )));
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    tracing::info!(user_id = auth.user_id, "Updated profile");
    Ok(Json(DataResponse { data: user }))
}

/// DELETE /api/v1/users/me
///
/// Permanently remove the account. Owned rows cascade.
pub async fn delete_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DeletedUser>>> {
    if !UserRepo::delete(&state.pool, auth.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }));
    }
    tracing::info!(user_id = auth.user_id, "Deleted user account");

    Ok(Json(DataResponse {
        data: DeletedUser {
            status: "deleted",
            user_id: auth.user_id,
            message: "User account deleted successfully",
        },
    }))
}

/// GET /api/v1/users/me/progress/weekly
pub async fn weekly_progress(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserWeeklyProgress>>> {
    let total = DomainQuestionRepo::count_all(&state.pool).await?;
    let completed = DomainAnswerRepo::completed_times(&state.pool, auth.user_id).await?;

    let progress = weekly_scores(Utc::now().date_naive(), &completed, total as usize);
    Ok(Json(DataResponse {
        data: UserWeeklyProgress {
            user_id: auth.user_id,
            progress,
        },
    }))
}

/// GET /api/v1/users/me/answers
pub async fn onboarding_answers(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserAnswers>>> {
    let answers = OnboardingAnswerRepo::list_details_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UserAnswers {
            user_id: auth.user_id,
            answers,
        },
    }))
}

/// GET /api/v1/users/me/wellness
pub async fn wellness(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<WellnessMetrics>>> {
    let answers = OnboardingAnswerRepo::list_details_for_user(&state.pool, auth.user_id).await?;
    let quote = daily_quote(Utc::now().date_naive());
    Ok(Json(DataResponse {
        data: WellnessMetrics::from_answers(&answers, quote),
    }))
}

/// GET /api/v1/users/me/domains/progress
pub async fn domains_progress(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DomainsOverview>>> {
    let totals: HashMap<String, i64> = DomainQuestionRepo::count_by_domain(&state.pool)
        .await?
        .into_iter()
        .collect();
    let answered: HashMap<String, i64> = DomainAnswerRepo::count_by_domain(&state.pool, auth.user_id)
        .await?
        .into_iter()
        .collect();

    let summaries = VALID_DOMAINS
        .iter()
        .map(|domain| {
            let total = totals.get(*domain).copied().unwrap_or(0) as usize;
            let done = answered.get(*domain).copied().unwrap_or(0) as usize;
            DomainProgressSummary::new(domain, done.min(total), total)
        })
        .collect();

    Ok(Json(DataResponse {
        data: DomainsOverview::from_summaries(summaries),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(step: &str, question: &str, value: Value) -> OnboardingAnswerDetail {
        OnboardingAnswerDetail {
            question_id: 1,
            step: step.into(),
            question: question.into(),
            question_type: "text".into(),
            answer: value,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn wellness_reads_only_wellness_steps() {
        let answers = vec![
            answer("profile_setup", "What is your height?", json!("170 cm")),
            answer("daily_lifestyle", "Hours of sleep", json!(7)),
            answer("motivation", "Ideal weight?", json!("60 kg")),
        ];
        let metrics = WellnessMetrics::from_answers(&answers, "quote");
        assert_eq!(metrics.height, Some(json!("170 cm")));
        assert_eq!(metrics.sleep_hours, Some(json!(7)));
        assert_eq!(metrics.weight, None);
        assert_eq!(metrics.water_intake, None);
        assert_eq!(metrics.daily_quote, "quote");
    }

    #[test]
    fn later_wellness_answer_wins() {
        let answers = vec![
            answer("profile_setup", "Current weight", json!("80 kg")),
            answer("profile_setup", "Current weight", json!("78 kg")),
        ];
        let metrics = WellnessMetrics::from_answers(&answers, "q");
        assert_eq!(metrics.weight, Some(json!("78 kg")));
    }
}
