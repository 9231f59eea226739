//! LLM access for domain analysis and plan generation.
//!
//! - [`gemini::GeminiClient`] -- the `generateContent` REST client.
//! - [`analyzer`] -- per-domain prompts, context building, and output shaping.
//! - [`plans`] -- workout and meal plan prompts.

pub mod analyzer;
pub mod gemini;
pub mod plans;

use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI request timed out")]
    Timeout,

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// The model answered but the payload was not a usable JSON object.
    #[error("Invalid AI response: {0}")]
    Validation(String),

    #[error("AI processing failed: {0}")]
    Api(String),
}

impl AiError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Api(_))
    }
}

/// A model that answers prompts with a JSON object.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run `prompt` and parse the reply as a JSON object. `domain` is used
    /// for logging and for the expected-fields check.
    async fn generate_json(&self, prompt: &str, domain: &str) -> Result<Value, AiError>;
}

/// Like [`LlmClient::generate_json`] but never fails: errors are logged and
/// `fallback` is returned instead.
pub async fn generate_json_or(
    client: &dyn LlmClient,
    prompt: &str,
    domain: &str,
    fallback: Value,
) -> Value {
    match client.generate_json(prompt, domain).await {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(domain, error = %e, "AI call failed, using fallback");
            fallback
        }
    }
}

/// Strip markdown fences and keep the span from the first `{` to the last `}`.
pub fn clean_json_response(text: &str) -> &str {
    let mut text = text.trim();
    if text.is_empty() {
        return "{}";
    }

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    let text = text.trim();

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}
