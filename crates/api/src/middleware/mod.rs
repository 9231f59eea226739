//! Request extractors and layers.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rate_limit::RateLimit`] -- Per-IP request limits, one limiter per route class.
//! - [`security_headers::security_headers`] -- Hardening headers on every response.

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
