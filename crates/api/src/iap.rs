//! Store receipt verification.
//!
//! Apple receipts are checked against `verifyReceipt`, falling back to the
//! sandbox endpoint when production answers status 21007. Google receipts are
//! accepted without a Play Developer API call and granted one month.

use std::time::Duration;

use chrono::{Months, TimeZone, Utc};
use lookslab_core::iap::{APPLE_STATUS_OK, APPLE_STATUS_SANDBOX_RECEIPT};
use lookslab_core::types::Timestamp;
use serde::{Deserialize, Serialize};

const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum IapError {
    #[error("Apple validation failed: {0}")]
    AppleStatus(i64),

    #[error("Apple validation failed: {0}")]
    Transport(String),

    #[error("No receipt info found")]
    NoReceiptInfo,

    #[error("No expiration date found")]
    NoExpiration,
}

#[derive(Debug, Serialize)]
struct VerifyReceiptRequest<'a> {
    #[serde(rename = "receipt-data")]
    receipt_data: &'a str,
    password: &'a str,
    #[serde(rename = "exclude-old-transactions")]
    exclude_old_transactions: bool,
}

#[derive(Debug, Deserialize)]
struct VerifyReceiptResponse {
    status: i64,
    #[serde(default)]
    latest_receipt_info: Vec<LatestReceiptInfo>,
}

#[derive(Debug, Deserialize)]
struct LatestReceiptInfo {
    expires_date_ms: Option<String>,
}

/// Result of checking a store receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptVerdict {
    pub expires_at: Timestamp,
    pub active: bool,
}

pub struct IapClient {
    http: reqwest::Client,
    apple_verify_url: String,
    apple_sandbox_verify_url: String,
    apple_shared_secret: Option<String>,
}

impl IapClient {
    pub fn new(
        apple_verify_url: impl Into<String>,
        apple_sandbox_verify_url: impl Into<String>,
        apple_shared_secret: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            apple_verify_url: apple_verify_url.into(),
            apple_sandbox_verify_url: apple_sandbox_verify_url.into(),
            apple_shared_secret,
        }
    }

    async fn call_apple(&self, url: &str, receipt_data: &str) -> Result<VerifyReceiptResponse, IapError> {
        let body = VerifyReceiptRequest {
            receipt_data,
            password: self.apple_shared_secret.as_deref().unwrap_or_default(),
            exclude_old_transactions: true,
        };
        self.http
            .post(url)
            .timeout(VERIFY_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| IapError::Transport(e.to_string()))?
            .json::<VerifyReceiptResponse>()
            .await
            .map_err(|e| IapError::Transport(e.to_string()))
    }

    /// Verify an Apple receipt and read the latest transaction's expiry.
    pub async fn verify_apple(&self, receipt_data: &str) -> Result<ReceiptVerdict, IapError> {
        let mut response = self.call_apple(&self.apple_verify_url, receipt_data).await?;
        if response.status == APPLE_STATUS_SANDBOX_RECEIPT {
            tracing::info!("Sandbox receipt, retrying against Apple sandbox");
            response = self
                .call_apple(&self.apple_sandbox_verify_url, receipt_data)
                .await?;
        }
        if response.status != APPLE_STATUS_OK {
            return Err(IapError::AppleStatus(response.status));
        }

        let latest = response
            .latest_receipt_info
            .first()
            .ok_or(IapError::NoReceiptInfo)?;
        let expires_ms: i64 = latest
            .expires_date_ms
            .as_deref()
            .and_then(|ms| ms.parse().ok())
            .ok_or(IapError::NoExpiration)?;
        let expires_at = Utc
            .timestamp_millis_opt(expires_ms)
            .single()
            .ok_or(IapError::NoExpiration)?;

        Ok(ReceiptVerdict {
            expires_at,
            active: expires_at > Utc::now(),
        })
    }

    /// Google receipts are not verified with Play; they get a one-month grant.
    pub fn accept_google(&self, now: Timestamp) -> ReceiptVerdict {
        tracing::warn!("Google Play receipt accepted without store verification");
        ReceiptVerdict {
            expires_at: now
                .checked_add_months(Months::new(1))
                .unwrap_or(now + chrono::Duration::days(30)),
            active: true,
        }
    }
}
