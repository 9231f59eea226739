use std::time::Duration;

use async_trait::async_trait;
use lookslab_core::domains::missing_ai_fields;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{clean_json_response, AiError, LlmClient};
use crate::config::GeminiConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 2;
const TEMPERATURE: f64 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_retries: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AiError::Api(e.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: MAX_RETRIES,
        })
    }

    /// Build a client from config. `None` when no API key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Option<Self>, AiError> {
        match &config.api_key {
            Some(key) => Self::new(key.clone(), config.model.clone(), config.base_url.clone()).map(Some),
            None => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// One HTTP round trip, returning the first candidate's text.
    async fn call_once(&self, prompt: &str) -> Result<String, AiError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
                "responseMimeType": "application/json",
            },
        });

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let lower = text.to_lowercase();
            if status == StatusCode::TOO_MANY_REQUESTS
                || lower.contains("rate limit")
                || lower.contains("quota")
            {
                return Err(AiError::RateLimit(format!("Gemini returned {status}")));
            }
            return Err(AiError::Api(format!("Gemini returned {status}: {text}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::Api(format!("Malformed Gemini response: {e}")))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AiError::Api("Empty response from Gemini API".into()))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate_json(&self, prompt: &str, domain: &str) -> Result<Value, AiError> {
        let mut attempt = 0;
        loop {
            tracing::info!(domain, attempt = attempt + 1, "Calling Gemini API");

            let text = match self.call_once(prompt).await {
                Ok(text) => text,
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    tracing::warn!(domain, attempt = attempt + 1, error = %e, "Gemini call failed, retrying");
                    attempt += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!(domain, attempts = attempt + 1, error = %e, "Gemini call failed");
                    return Err(e);
                }
            };

            let cleaned = clean_json_response(&text);
            let value: Value = serde_json::from_str(cleaned).map_err(|e| {
                tracing::error!(domain, error = %e, "Gemini returned invalid JSON");
                AiError::Validation(format!("Invalid JSON in response: {e}"))
            })?;

            match value.as_object() {
                Some(obj) if obj.is_empty() => {
                    return Err(AiError::Validation("Empty response from AI".into()))
                }
                Some(_) => {}
                None => return Err(AiError::Validation("Expected a JSON object".into())),
            }

            let missing = missing_ai_fields(domain, &value);
            if !missing.is_empty() {
                tracing::warn!(domain, ?missing, "AI response is missing expected fields");
            }

            tracing::info!(domain, "Parsed Gemini response");
            return Ok(value);
        }
    }
}
