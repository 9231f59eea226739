//! Per-client request limits backed by `governor` keyed limiters.
//!
//! Clients are keyed by IP: the first `X-Forwarded-For` hop, then the peer
//! address, then `"unknown"`. The default limit is applied to every request
//! by [`enforce_default`]; stricter classes are opted into per handler with
//! the [`RateLimit`] extractor.

use std::marker::PhantomData;
use std::net::SocketAddr;
use std::num::NonZeroU32;

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::error::AppError;
use crate::state::AppState;

pub const AUTH_PER_MINUTE: u32 = 10;
pub const AI_PER_MINUTE: u32 = 10;
pub const UPLOAD_PER_MINUTE: u32 = 20;

const FORWARDED_FOR: &str = "x-forwarded-for";

// ---------------------------------------------------------------------------
// Limiters
// ---------------------------------------------------------------------------

/// A named per-key limiter allowing `n` requests per minute.
pub struct KeyedLimiter {
    name: &'static str,
    inner: DefaultKeyedRateLimiter<String>,
}

impl KeyedLimiter {
    pub fn per_minute(name: &'static str, n: u32) -> Self {
        let n = NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN);
        Self {
            name,
            inner: RateLimiter::keyed(Quota::per_minute(n)),
        }
    }

    /// Consume one request for `key`, or report how long to wait.
    pub fn check(&self, key: &str) -> Result<(), AppError> {
        self.inner.check_key(&key.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            tracing::warn!(limiter = self.name, client = key, "Rate limit exceeded");
            AppError::RateLimited {
                retry_after_secs: wait.as_secs().max(1),
            }
        })
    }
}

/// The limiter set shared through [`AppState`].
pub struct RateLimiters {
    pub default: KeyedLimiter,
    pub auth: KeyedLimiter,
    pub ai: KeyedLimiter,
    pub upload: KeyedLimiter,
}

impl RateLimiters {
    pub fn new(default_per_minute: u32) -> Self {
        Self {
            default: KeyedLimiter::per_minute("default", default_per_minute),
            auth: KeyedLimiter::per_minute("auth", AUTH_PER_MINUTE),
            ai: KeyedLimiter::per_minute("ai", AI_PER_MINUTE),
            upload: KeyedLimiter::per_minute("upload", UPLOAD_PER_MINUTE),
        }
    }

    /// Drop state for clients whose quota has fully replenished.
    pub fn retain_recent(&self) {
        for limiter in [&self.default, &self.auth, &self.ai, &self.upload] {
            limiter.inner.retain_recent();
        }
    }
}

// ---------------------------------------------------------------------------
// Client identification
// ---------------------------------------------------------------------------

/// Resolve the client key for a request.
pub fn client_ip(parts: &Parts) -> String {
    let forwarded = parts
        .headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// ---------------------------------------------------------------------------
// Default limit layer
// ---------------------------------------------------------------------------

/// Apply the default per-minute limit to every request.
pub async fn enforce_default(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let key = client_ip(&parts);
    if let Err(e) = state.rate_limiters.default.check(&key) {
        return e.into_response();
    }
    next.run(Request::from_parts(parts, body)).await
}

// ---------------------------------------------------------------------------
// Per-route classes
// ---------------------------------------------------------------------------

/// A route class with its own limiter.
pub trait LimitClass {
    fn limiter(limiters: &RateLimiters) -> &KeyedLimiter;
}

pub struct AuthClass;
pub struct AiClass;
pub struct UploadClass;

impl LimitClass for AuthClass {
    fn limiter(limiters: &RateLimiters) -> &KeyedLimiter {
        &limiters.auth
    }
}

impl LimitClass for AiClass {
    fn limiter(limiters: &RateLimiters) -> &KeyedLimiter {
        &limiters.ai
    }
}

impl LimitClass for UploadClass {
    fn limiter(limiters: &RateLimiters) -> &KeyedLimiter {
        &limiters.upload
    }
}

/// Extractor that consumes one request from the class `C` limiter.
///
/// ```ignore
/// async fn sign_in(_limit: RateLimit<AuthClass>, ...) -> AppResult<...>
/// ```
pub struct RateLimit<C>(PhantomData<C>);

impl<C: LimitClass + Send + Sync> FromRequestParts<AppState> for RateLimit<C> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = client_ip(parts);
        C::limiter(&state.rate_limiters).check(&key)?;
        Ok(RateLimit(PhantomData))
    }
}
