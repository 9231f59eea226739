use std::sync::Arc;

use crate::ai::LlmClient;
use crate::auth::identity::IdentityVerifier;
use crate::config::ServerConfig;
use crate::iap::IapClient;
use crate::middleware::rate_limit::RateLimiters;
use crate::storage::StorageBackend;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lookslab_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Image storage (local disk or S3).
    pub storage: Arc<dyn StorageBackend>,
    /// Google/Apple identity token verification.
    pub identity: Arc<dyn IdentityVerifier>,
    /// Model client. `None` when `GEMINI_API_KEY` is unset.
    pub llm: Option<Arc<dyn LlmClient>>,
    /// App Store receipt verification.
    pub iap: Arc<IapClient>,
    /// Per-IP request limiters.
    pub rate_limiters: Arc<RateLimiters>,
}
