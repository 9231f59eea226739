//! Handlers for in-app purchase receipts and store notifications.
//!
//! Responses here keep the flat shapes the mobile clients and the stores
//! expect rather than the `{ "data": ... }` envelope.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use base64::Engine;
use chrono::Utc;
use lookslab_core::iap::{iap_products, plan_from_product_id, IapProduct, IapProvider};
use lookslab_core::subscription::{is_upgrade, PlanType, SubscriptionStatus};
use lookslab_core::types::Timestamp;
use lookslab_db::models::subscription::CreateSubscription;
use lookslab_db::repositories::SubscriptionRepo;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReceiptRequest {
    pub provider: IapProvider,
    pub product_id: String,
    pub receipt_data: String,
    pub purchase_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub success: bool,
    pub subscription_active: bool,
    pub plan: Option<PlanType>,
    pub expires_at: Option<Timestamp>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub success: bool,
    pub purchases: Vec<ReceiptResponse>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<IapProduct>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/iap/validate-receipt
///
/// Verify a store receipt and mirror it onto the user's subscription.
pub async fn validate_receipt(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ReceiptRequest>,
) -> AppResult<Json<ReceiptResponse>> {
    tracing::info!(
        user_id = auth.user_id,
        provider = input.provider.as_str(),
        product_id = %input.product_id,
        "Receipt validation requested",
    );

    let verdict = match input.provider {
        IapProvider::Apple => state.iap.verify_apple(&input.receipt_data).await,
        IapProvider::Google => {
            if input.purchase_token.is_none() {
                tracing::warn!(user_id = auth.user_id, "Google receipt without purchase token");
            }
            Ok(state.iap.accept_google(Utc::now()))
        }
    }
    .map_err(|e| {
        tracing::warn!(user_id = auth.user_id, error = %e, "Receipt validation failed");
        AppError::BadRequest(e.to_string())
    })?;

    let plan = plan_from_product_id(&input.product_id);
    let status = if verdict.active {
        SubscriptionStatus::Active
    } else {
        SubscriptionStatus::Expired
    };

    let previous = SubscriptionRepo::find_by_user(&state.pool, auth.user_id).await?;
    if let Some(current) = previous.as_ref().and_then(|s| PlanType::from_str_db(&s.plan).ok()) {
        if is_upgrade(current, plan) {
            tracing::info!(
                user_id = auth.user_id,
                from = current.as_str(),
                to = plan.as_str(),
                "Subscription upgraded",
            );
        }
    }

    SubscriptionRepo::upsert_for_user(
        &state.pool,
        &CreateSubscription {
            user_id: auth.user_id,
            plan: plan.as_str().to_string(),
            status: status.as_str().to_string(),
            payment_id: Some(input.product_id.clone()),
            start_date: Some(Utc::now()),
            end_date: Some(verdict.expires_at),
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        plan = plan.as_str(),
        active = verdict.active,
        "Receipt validated",
    );

    Ok(Json(ReceiptResponse {
        success: true,
        subscription_active: verdict.active,
        plan: Some(plan),
        expires_at: Some(verdict.expires_at),
        message: Some("Receipt validated successfully".into()),
    }))
}

/// POST /api/v1/iap/restore-purchases
pub async fn restore_purchases(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<RestoreResponse>> {
    let subscription = SubscriptionRepo::find_by_user(&state.pool, auth.user_id).await?;

    let purchases: Vec<ReceiptResponse> = subscription
        .filter(|s| s.status == SubscriptionStatus::Active.as_str())
        .map(|s| ReceiptResponse {
            success: true,
            subscription_active: true,
            plan: PlanType::from_str_db(&s.plan).ok(),
            expires_at: s.end_date,
            message: Some("Active subscription found".into()),
        })
        .into_iter()
        .collect();

    tracing::info!(user_id = auth.user_id, found = purchases.len(), "Restored purchases");
    Ok(Json(RestoreResponse {
        success: true,
        message: format!("Found {} active subscription(s)", purchases.len()),
        purchases,
    }))
}

/// POST /api/v1/iap/webhooks/apple
///
/// App Store server notifications are acknowledged and logged.
pub async fn apple_webhook(body: Bytes) -> Json<Value> {
    match serde_json::from_slice::<Value>(&body) {
        Ok(data) => {
            tracing::info!(
                notification_type = ?data.get("notification_type").and_then(serde_json::Value::as_str),
                "Apple webhook received",
            );
            Json(json!({ "status": "success" }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Malformed Apple webhook");
            Json(json!({ "status": "error", "message": e.to_string() }))
        }
    }
}

/// POST /api/v1/iap/webhooks/google
///
/// Play real-time developer notifications carry a base64 JSON payload in
/// `message.data`.
pub async fn google_webhook(body: Bytes) -> Json<Value> {
    match decode_google_notification(&body) {
        Ok(Some(notification)) => {
            tracing::info!(
                notification_type = ?google_notification_type(&notification),
                "Google webhook received",
            );
            Json(json!({ "status": "success" }))
        }
        Ok(None) => Json(json!({ "status": "success" })),
        Err(message) => {
            tracing::error!(error = %message, "Malformed Google webhook");
            Json(json!({ "status": "error", "message": message }))
        }
    }
}

/// GET /api/v1/iap/products
pub async fn list_products() -> Json<ProductList> {
    Json(ProductList {
        products: iap_products(),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decode the notification inside a Pub/Sub push body. `Ok(None)` when the
/// push carries no `message.data`.
fn decode_google_notification(body: &[u8]) -> Result<Option<Value>, String> {
    let envelope: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    let Some(data) = envelope.pointer("/message/data").and_then(Value::as_str) else {
        return Ok(None);
    };
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| e.to_string())?;
    serde_json::from_slice(&decoded)
        .map(Some)
        .map_err(|e| e.to_string())
}

/// `notificationType`, at the top level or under `subscriptionNotification`.
fn google_notification_type(notification: &Value) -> Option<i64> {
    notification
        .get("notificationType")
        .or_else(|| notification.pointer("/subscriptionNotification/notificationType"))
        .and_then(Value::as_i64)
}
