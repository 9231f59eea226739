use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lookslab_api::ai::gemini::GeminiClient;
use lookslab_api::ai::LlmClient;
use lookslab_api::auth::identity::JwksVerifier;
use lookslab_api::config::ServerConfig;
use lookslab_api::iap::IapClient;
use lookslab_api::middleware::rate_limit::RateLimiters;
use lookslab_api::router::build_app_router;
use lookslab_api::state::AppState;
use lookslab_api::storage::local::LocalStorage;
use lookslab_api::storage::s3::S3Storage;
use lookslab_api::storage::StorageBackend;

/// How often idle rate limiter entries are evicted.
const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lookslab_api=debug,lookslab_db=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        environment = %config.environment,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = lookslab_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    lookslab_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    lookslab_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // --- App state ---
    let state = build_state(pool, &config)
        .await
        .expect("Failed to initialise application state");

    // --- Rate limiter housekeeping ---
    let limiters = Arc::clone(&state.rate_limiters);
    let sweep_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            limiters.retain_recent();
        }
    });

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    sweep_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

/// Assemble the shared state: storage backend, identity verifier, model
/// client, receipt verifier, and rate limiters.
async fn build_state(pool: lookslab_db::DbPool, config: &ServerConfig) -> anyhow::Result<AppState> {
    let storage: Arc<dyn StorageBackend> = match &config.storage.s3 {
        Some(s3) => {
            tracing::info!(bucket = %s3.bucket, region = %s3.region, "Using S3 storage");
            Arc::new(S3Storage::new(s3).await)
        }
        None => {
            tokio::fs::create_dir_all(&config.storage.local_path)
                .await
                .with_context(|| {
                    format!("Failed to create storage directory '{}'", config.storage.local_path)
                })?;
            tracing::info!(path = %config.storage.local_path, "Using local storage");
            Arc::new(LocalStorage::new(&config.storage.local_path, &config.app_url))
        }
    };

    let llm = GeminiClient::from_config(&config.gemini)
        .context("Failed to build Gemini client")?
        .map(|client| Arc::new(client) as Arc<dyn LlmClient>);
    if llm.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, AI analysis and plan generation are disabled");
    }

    let identity = Arc::new(JwksVerifier::from_client_ids(
        config.oauth.google_client_id.clone(),
        config.oauth.apple_client_id.clone(),
    ));

    let iap = Arc::new(IapClient::new(
        config.oauth.apple_verify_url.clone(),
        config.oauth.apple_sandbox_verify_url.clone(),
        config.oauth.apple_shared_secret.clone(),
    ));

    Ok(AppState {
        pool,
        config: Arc::new(config.clone()),
        storage,
        identity,
        llm,
        iap,
        rate_limiters: Arc::new(RateLimiters::new(config.rate_limit_per_minute)),
    })
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
