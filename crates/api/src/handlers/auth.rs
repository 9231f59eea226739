//! Handlers for the `/auth` resource (OAuth sign-in, refresh, sign-out).

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use lookslab_core::error::CoreError;
use lookslab_core::types::Timestamp;
use lookslab_db::models::user::{OAuthProfile, User};
use lookslab_db::repositories::{RefreshTokenRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::identity::OAuthProvider;
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit::{AuthClass, RateLimit};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/google` and `POST /auth/apple`.
///
/// `email`, `name`, and `picture` are fallbacks for providers that omit
/// them from the identity token (Apple only sends the name once).
#[derive(Debug, Deserialize)]
pub struct OAuthLoginRequest {
    pub id_token: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Request body for `POST /auth/refresh` and `POST /auth/sign-out`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by sign-in and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/google
pub async fn google_sign_in(
    _limit: RateLimit<AuthClass>,
    State(state): State<AppState>,
    Json(input): Json<OAuthLoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    sign_in(&state, OAuthProvider::Google, input).await.map(Json)
}

/// POST /api/v1/auth/apple
pub async fn apple_sign_in(
    _limit: RateLimit<AuthClass>,
    State(state): State<AppState>,
    Json(input): Json<OAuthLoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    sign_in(&state, OAuthProvider::Apple, input).await.map(Json)
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The
/// presented token is replaced, so it cannot be used twice.
pub async fn refresh(
    _limit: RateLimit<AuthClass>,
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let token = RefreshTokenRepo::find_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| unauthorized("Invalid refresh token"))?;

    if token.is_revoked {
        tracing::warn!(user_id = token.user_id, "Revoked refresh token presented");
        return Err(unauthorized("Refresh token has been revoked"));
    }
    if token.expires_at < Utc::now() {
        tracing::warn!(user_id = token.user_id, "Expired refresh token presented");
        return Err(unauthorized("Refresh token expired"));
    }

    let user = UserRepo::find_by_id(&state.pool, token.user_id)
        .await?
        .ok_or_else(|| unauthorized("User no longer exists"))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    RefreshTokenRepo::rotate(&state.pool, &token_hash, &refresh_hash, refresh_expiry(&state))
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = user.id, "Refresh token rotated concurrently");
            unauthorized("Invalid refresh token")
        })?;

    token_response(&state, user, refresh_plaintext).map(Json)
}

/// POST /api/v1/auth/sign-out
///
/// Revoke the presented refresh token.
pub async fn sign_out(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<Value>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let token = RefreshTokenRepo::find_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundMessage("Refresh token not found".into()))
        })?;

    RefreshTokenRepo::revoke(&state.pool, token.id).await?;
    tracing::info!(user_id = token.user_id, "User signed out");

    Ok(Json(json!({ "detail": "Successfully signed out" })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

/// Verify the identity token, find or create the account, and issue tokens.
async fn sign_in(
    state: &AppState,
    provider: OAuthProvider,
    input: OAuthLoginRequest,
) -> AppResult<TokenResponse> {
    let claims = state.identity.verify(provider, &input.id_token).await?;

    let email = claims
        .email
        .or(input.email)
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest(format!("Email not provided by {}", provider.display_name()))
        })?;

    let profile = OAuthProfile {
        email,
        name: claims.name.or(input.name),
        provider: provider.as_str().to_string(),
        subject: claims.sub,
        picture: claims.picture.or(input.picture),
        id_token: input.id_token,
    };

    let user = get_or_create_user(state, &profile).await?;
    issue_tokens(state, user).await
}

/// Find the account for `profile.email`, creating it on first sign-in.
///
/// An account registered through a different provider is rejected.
async fn get_or_create_user(state: &AppState, profile: &OAuthProfile) -> AppResult<User> {
    let Some(existing) = UserRepo::find_by_email(&state.pool, &profile.email).await? else {
        let user = UserRepo::create_from_oauth(&state.pool, profile).await?;
        tracing::info!(user_id = user.id, provider = %profile.provider, "Created user");
        return Ok(user);
    };

    if let Some(registered) = existing
        .provider
        .as_deref()
        .filter(|p| *p != profile.provider)
    {
        tracing::warn!(
            user_id = existing.id,
            registered,
            attempted = %profile.provider,
            "Sign-in with mismatched provider",
        );
        return Err(AppError::BadRequest(format!(
            "This email is registered with {registered}. Please use {registered} to sign in."
        )));
    }

    let user = UserRepo::apply_oauth_login(&state.pool, existing.id, profile)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: existing.id,
        }))?;
    tracing::info!(user_id = user.id, provider = %profile.provider, "User signed in");
    Ok(user)
}

/// Generate access + refresh tokens, persist the refresh token, and build the response.
async fn issue_tokens(state: &AppState, user: User) -> AppResult<TokenResponse> {
    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    RefreshTokenRepo::upsert_for_user(
        &state.pool,
        user.id,
        &refresh_hash,
        refresh_expiry(state),
        None,
    )
    .await?;

    token_response(state, user, refresh_plaintext)
}

fn refresh_expiry(state: &AppState) -> Timestamp {
    Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days)
}

fn token_response(state: &AppState, user: User, refresh_token: String) -> AppResult<TokenResponse> {
    let access_token = generate_access_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(TokenResponse {
        user,
        access_token,
        refresh_token,
        token_type: "bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
    })
}
