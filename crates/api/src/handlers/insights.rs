//! Handlers for per-user insights.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lookslab_core::error::CoreError;
use lookslab_core::insights::InsightCategory;
use lookslab_core::types::DbId;
use lookslab_db::models::insight::{CreateInsight, Insight, UpdateInsight};
use lookslab_db::repositories::InsightRepo;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InsightList {
    pub insights: Vec<Insight>,
    pub total: usize,
    pub unread_count: usize,
}

/// POST /api/v1/insights
pub async fn create_insight(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInsight>,
) -> AppResult<(StatusCode, Json<DataResponse<Insight>>)> {
    InsightCategory::from_str_db(&input.category)?;

    let insight = InsightRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(
        user_id = auth.user_id,
        insight_id = insight.id,
        category = %insight.category,
        "Created insight",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: insight })))
}

/// GET /api/v1/insights/me
pub async fn list_my_insights(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<InsightList>>> {
    let insights = InsightRepo::list_for_user(&state.pool, auth.user_id).await?;
    let unread_count = insights.iter().filter(|i| !i.is_read).count();
    Ok(Json(DataResponse {
        data: InsightList {
            total: insights.len(),
            unread_count,
            insights,
        },
    }))
}

/// GET /api/v1/insights/{id}
pub async fn get_insight(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Insight>>> {
    let insight = find_owned(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: insight }))
}

/// PATCH /api/v1/insights/{id}
pub async fn update_insight(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInsight>,
) -> AppResult<Json<DataResponse<Insight>>> {
    if let Some(category) = input.category.as_deref() {
        InsightCategory::from_str_db(category)?;
    }
    find_owned(&state.pool, id, auth.user_id).await?;

    let insight = InsightRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(insight_not_found)?;
    Ok(Json(DataResponse { data: insight }))
}

/// DELETE /api/v1/insights/{id}
pub async fn delete_insight(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned(&state.pool, id, auth.user_id).await?;
    InsightRepo::delete(&state.pool, id).await?;
    tracing::info!(user_id = auth.user_id, insight_id = id, "Deleted insight");
    Ok(StatusCode::NO_CONTENT)
}

fn insight_not_found() -> AppError {
    AppError::Core(CoreError::NotFoundMessage("Insight not found".into()))
}

async fn find_owned(pool: &PgPool, id: DbId, user_id: DbId) -> AppResult<Insight> {
    let insight = InsightRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(insight_not_found)?;
    if insight.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not authorized to access this insight".into(),
        )));
    }
    Ok(insight)
}
