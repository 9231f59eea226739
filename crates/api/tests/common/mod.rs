#![allow(dead_code)]

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use lookslab_api::ai::{AiError, LlmClient};
use lookslab_api::auth::identity::{IdentityClaims, IdentityVerifier, OAuthProvider};
use lookslab_api::auth::jwt::{generate_access_token, JwtConfig};
use lookslab_api::config::{GeminiConfig, OAuthConfig, ServerConfig, StorageConfig};
use lookslab_api::error::AppError;
use lookslab_api::iap::IapClient;
use lookslab_api::middleware::rate_limit::RateLimiters;
use lookslab_api::router::build_app_router;
use lookslab_api::state::AppState;
use lookslab_api::storage::local::LocalStorage;
use lookslab_core::error::CoreError;
use lookslab_db::models::user::{OAuthProfile, User};
use lookslab_db::repositories::UserRepo;

/// Upload directory shared by every test in a binary. Keys are unique per
/// upload so tests never collide.
static MEDIA_DIR: LazyLock<TempDir> =
    LazyLock::new(|| tempfile::tempdir().expect("temp media dir should be creatable"));

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        app_url: "http://localhost:8000".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 30,
        },
        storage: StorageConfig {
            local_path: MEDIA_DIR.path().to_string_lossy().into_owned(),
            max_file_size_mb: 1,
            s3: None,
        },
        gemini: GeminiConfig {
            api_key: None,
            model: "gemini-test".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        },
        oauth: OAuthConfig {
            google_client_id: Some("google-client".to_string()),
            apple_client_id: Some("apple-client".to_string()),
            apple_shared_secret: None,
            apple_verify_url: "http://127.0.0.1:9/verifyReceipt".to_string(),
            apple_sandbox_verify_url: "http://127.0.0.1:9/sandbox/verifyReceipt".to_string(),
        },
        rate_limit_per_minute: 1000,
        enable_security_headers: true,
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Accepts tokens of the form `valid:<subject>:<email>`; rejects anything else.
pub struct FakeIdentity;

#[async_trait]
impl IdentityVerifier for FakeIdentity {
    async fn verify(
        &self,
        _provider: OAuthProvider,
        id_token: &str,
    ) -> Result<IdentityClaims, AppError> {
        let mut parts = id_token.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("valid"), Some(sub), email) => Ok(IdentityClaims {
                sub: sub.to_string(),
                email: email.filter(|e| !e.is_empty()).map(str::to_string),
                name: Some("Test User".to_string()),
                picture: None,
            }),
            _ => Err(AppError::Core(CoreError::Unauthorized(
                "Invalid identity token".into(),
            ))),
        }
    }
}

/// Returns the same JSON object for every prompt.
pub struct FakeLlm(pub Value);

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate_json(&self, _prompt: &str, _domain: &str) -> Result<Value, AiError> {
        Ok(self.0.clone())
    }
}

/// Fails every call.
pub struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn generate_json(&self, _prompt: &str, _domain: &str) -> Result<Value, AiError> {
        Err(AiError::Api("model unavailable".into()))
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the application state around fakes for identity and the model.
pub fn test_state(pool: PgPool, llm: Option<Arc<dyn LlmClient>>) -> AppState {
    let config = test_config();
    AppState {
        pool,
        storage: Arc::new(LocalStorage::new(
            &config.storage.local_path,
            &config.app_url,
        )),
        identity: Arc::new(FakeIdentity),
        llm,
        iap: Arc::new(IapClient::new(
            config.oauth.apple_verify_url.clone(),
            config.oauth.apple_sandbox_verify_url.clone(),
            None,
        )),
        rate_limiters: Arc::new(RateLimiters::new(config.rate_limit_per_minute)),
        config: Arc::new(config),
    }
}

/// Build the full application router with no model client configured.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_llm(pool, None)
}

/// Build the full application router, through the same builder `main.rs`
/// uses, with the given model client.
pub fn build_test_app_with_llm(pool: PgPool, llm: Option<Arc<dyn LlmClient>>) -> Router {
    let state = test_state(pool, llm);
    let config = Arc::clone(&state.config);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a Google-registered user directly.
pub async fn create_user(pool: &PgPool, email: &str) -> User {
    UserRepo::create_from_oauth(
        pool,
        &OAuthProfile {
            email: email.to_string(),
            name: Some("Fixture User".to_string()),
            provider: "google".to_string(),
            subject: format!("sub-{email}"),
            picture: None,
            id_token: "fixture-token".to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// A signed access token for `user`.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.email, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn patch(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, None, None).await
}

pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), None).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Send a multipart body with a single `file` part.
pub async fn upload_auth(
    app: Router,
    uri: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
    token: &str,
) -> Response<Body> {
    const BOUNDARY: &str = "lookslab-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}
