//! Google and Apple identity-token verification.
//!
//! Both providers sign RS256 JWTs whose public keys are published as a JWKS
//! document. Keys are fetched lazily and cached for [`JWKS_CACHE_TTL`]; a
//! token whose `kid` is not in the cached set forces one refresh so key
//! rotation is picked up without waiting for the TTL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use lookslab_core::error::CoreError;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::AppError;

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUERS: &[&str] = &["accounts.google.com", "https://accounts.google.com"];
pub const APPLE_JWKS_URL: &str = "https://appleid.apple.com/auth/keys";
pub const APPLE_ISSUER: &str = "https://appleid.apple.com";

pub const JWKS_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Apple,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Apple => "apple",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Apple => "Apple",
        }
    }

    /// Parse a stored provider column value.
    pub fn from_str_db(s: &str) -> Option<Self> {
        match s {
            "google" => Some(Self::Google),
            "apple" => Some(Self::Apple),
            _ => None,
        }
    }
}

/// Claims extracted from a verified identity token.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Verifies provider identity tokens. Implemented by [`JwksVerifier`] in
/// production and by fakes in tests.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, provider: OAuthProvider, id_token: &str)
        -> Result<IdentityClaims, AppError>;
}

// ---------------------------------------------------------------------------
// JWKS verifier
// ---------------------------------------------------------------------------

/// Keys, issuers, and audience for one provider.
pub struct ProviderKeys {
    jwks_url: String,
    issuers: Vec<String>,
    audience: Option<String>,
    cache: RwLock<Option<(Instant, JwkSet)>>,
}

impl ProviderKeys {
    pub fn new(jwks_url: impl Into<String>, issuers: &[&str], audience: Option<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            issuers: issuers.iter().map(|s| s.to_string()).collect(),
            audience,
            cache: RwLock::new(None),
        }
    }
}

pub struct JwksVerifier {
    http: reqwest::Client,
    google: ProviderKeys,
    apple: ProviderKeys,
}

impl JwksVerifier {
    pub fn new(google: ProviderKeys, apple: ProviderKeys) -> Self {
        Self {
            http: reqwest::Client::new(),
            google,
            apple,
        }
    }

    /// Verifier against the live Google and Apple key endpoints.
    pub fn from_client_ids(
        google_client_id: Option<String>,
        apple_client_id: Option<String>,
    ) -> Self {
        Self::new(
            ProviderKeys::new(GOOGLE_JWKS_URL, GOOGLE_ISSUERS, google_client_id),
            ProviderKeys::new(APPLE_JWKS_URL, &[APPLE_ISSUER], apple_client_id),
        )
    }

    fn keys_for(&self, provider: OAuthProvider) -> &ProviderKeys {
        match provider {
            OAuthProvider::Google => &self.google,
            OAuthProvider::Apple => &self.apple,
        }
    }

    /// Return the cached key set, fetching it when absent, stale, or `force`d.
    async fn key_set(
        &self,
        provider: OAuthProvider,
        keys: &ProviderKeys,
        force: bool,
    ) -> Result<JwkSet, AppError> {
        if !force {
            let cached = keys.cache.read().await;
            if let Some((fetched_at, set)) = cached.as_ref() {
                if fetched_at.elapsed() < JWKS_CACHE_TTL {
                    return Ok(set.clone());
                }
            }
        }

        let set = self
            .http
            .get(&keys.jwks_url)
            .timeout(JWKS_FETCH_TIMEOUT)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::error!(provider = provider.as_str(), error = %e, "Failed to fetch JWKS");
                unavailable(provider)
            })?
            .json::<JwkSet>()
            .await
            .map_err(|e| {
                tracing::error!(provider = provider.as_str(), error = %e, "Malformed JWKS response");
                unavailable(provider)
            })?;

        tracing::info!(provider = provider.as_str(), keys = set.keys.len(), "Refreshed JWKS");
        *keys.cache.write().await = Some((Instant::now(), set.clone()));
        Ok(set)
    }
}

#[async_trait]
impl IdentityVerifier for JwksVerifier {
    async fn verify(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<IdentityClaims, AppError> {
        let keys = self.keys_for(provider);
        let Some(audience) = keys.audience.as_deref() else {
            return Err(AppError::ServiceUnavailable(format!(
                "{} sign-in is not configured",
                provider.display_name()
            )));
        };

        let header = decode_header(id_token).map_err(|_| invalid_token(provider))?;
        let kid = header.kid.ok_or_else(|| invalid_token(provider))?;

        let mut set = self.key_set(provider, keys, false).await?;
        if set.find(&kid).is_none() {
            set = self.key_set(provider, keys, true).await?;
        }
        let jwk = set.find(&kid).ok_or_else(|| invalid_token(provider))?;
        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|_| invalid_token(provider))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&keys.issuers);
        validation.set_audience(&[audience]);

        let data = decode::<IdentityClaims>(id_token, &decoding_key, &validation).map_err(|e| {
            tracing::warn!(provider = provider.as_str(), error = %e, "Identity token rejected");
            invalid_token(provider)
        })?;

        tracing::info!(provider = provider.as_str(), sub = %data.claims.sub, "Identity token verified");
        Ok(data.claims)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_token(provider: OAuthProvider) -> AppError {
    AppError::Core(CoreError::Unauthorized(format!(
        "Invalid {} identity token",
        provider.display_name()
    )))
}

fn unavailable(provider: OAuthProvider) -> AppError {
    AppError::ServiceUnavailable(format!(
        "Unable to fetch {} public keys",
        provider.display_name()
    ))
}
