//! Handlers for direct subscription management and the plan catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use lookslab_core::error::CoreError;
use lookslab_core::subscription::{
    calculate_end_date, effective_status, plan_features, savings_percent, PlanType,
    SubscriptionStatus,
};
use lookslab_core::types::DbId;
use lookslab_db::models::subscription::{CreateSubscription, Subscription};
use lookslab_db::repositories::SubscriptionRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub plan: PlanType,
}

/// A subscription with the status a client should act on.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub subscription_status: SubscriptionStatus,
}

impl SubscriptionView {
    fn new(subscription: Subscription) -> AppResult<Self> {
        let subscription_status =
            effective_status(&subscription.status, subscription.end_date, Utc::now())?;
        Ok(Self {
            subscription,
            subscription_status,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PlanInfo {
    pub plan: PlanType,
    pub price: f64,
    pub duration_days: i64,
    pub savings_percent: Option<i64>,
    pub features: Vec<&'static str>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/subscriptions
pub async fn create_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSubscriptionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SubscriptionView>>)> {
    if SubscriptionRepo::find_by_user(&state.pool, auth.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "User already has a subscription".into(),
        )));
    }

    let now = Utc::now();
    let subscription = SubscriptionRepo::create(
        &state.pool,
        &CreateSubscription {
            user_id: auth.user_id,
            plan: input.plan.as_str().to_string(),
            status: SubscriptionStatus::Active.as_str().to_string(),
            payment_id: None,
            start_date: Some(now),
            end_date: Some(calculate_end_date(now, input.plan)),
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        subscription_id = subscription.id,
        plan = input.plan.as_str(),
        "Created subscription",
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubscriptionView::new(subscription)?,
        }),
    ))
}

/// GET /api/v1/subscriptions/me
pub async fn get_my_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SubscriptionView>>> {
    let subscription = SubscriptionRepo::find_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFoundMessage("No subscription found".into())))?;
    Ok(Json(DataResponse {
        data: SubscriptionView::new(subscription)?,
    }))
}

/// PATCH /api/v1/subscriptions/{id}/cancel
pub async fn cancel_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SubscriptionView>>> {
    let not_found = || AppError::Core(CoreError::NotFoundMessage("Subscription not found".into()));

    let subscription = SubscriptionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    if subscription.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden("Not authorized".into())));
    }

    let subscription = SubscriptionRepo::cancel(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(user_id = auth.user_id, subscription_id = id, "Cancelled subscription");
    Ok(Json(DataResponse {
        data: SubscriptionView::new(subscription)?,
    }))
}

/// GET /api/v1/subscriptions/plans
pub async fn list_plans() -> Json<DataResponse<Vec<PlanInfo>>> {
    let plans = PlanType::ALL
        .into_iter()
        .map(|plan| PlanInfo {
            plan,
            price: plan.price(),
            duration_days: plan.duration_days(),
            savings_percent: savings_percent(plan),
            features: plan_features(plan),
        })
        .collect();
    Json(DataResponse { data: plans })
}
