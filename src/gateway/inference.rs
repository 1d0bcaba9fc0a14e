//! Core `InferenceGateway` trait and `GeminiClient` implementation.
//!
//! `GeminiClient` calls the Gemini `generateContent` REST endpoint. All
//! connection details come from [`InferenceConfig`]; nothing is hardcoded
//! beyond the wire format itself. Construction is gated on a credential —
//! without one the client cannot exist, which is how the engine knows to
//! surface a needs-configuration signal instead of starting a capture cycle.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::InferenceConfig;

// ---------------------------------------------------------------------------
// InferenceError
// ---------------------------------------------------------------------------

/// Errors that can occur while generating text.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// No credential is configured, so no gateway is available.
    #[error("inference gateway is not configured")]
    Unavailable,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("inference request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse inference response: {0}")]
    Parse(String),

    /// The model returned a response with no usable text content.
    #[error("inference returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout
        } else {
            InferenceError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// InferenceGateway trait
// ---------------------------------------------------------------------------

/// Async trait for text generation backends.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn InferenceGateway>`).
///
/// # Arguments
/// * `prompt`        – The user utterance (or an internally built request).
/// * `system_prompt` – Optional persona instruction resolved from the
///                     current mode; `None` sends the prompt bare.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, InferenceError>;
}

// Compile-time assertion: Box<dyn InferenceGateway> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn InferenceGateway>) {}
};

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls the Gemini `generateContent` endpoint.
///
/// The system prompt is folded into the request text as
/// `"{system}\n\nUser: {prompt}"` — the wire format the assistant was built
/// against sends a single flattened prompt rather than separate roles.
pub struct GeminiClient {
    client: reqwest::Client,
    config: InferenceConfig,
}

impl GeminiClient {
    /// Build a `GeminiClient` from application config.
    ///
    /// Returns `None` when no (non-empty) API key is configured — the caller
    /// holds an `Option<Arc<dyn InferenceGateway>>` and treats `None` as the
    /// needs-configuration state.
    pub fn from_config(config: &InferenceConfig) -> Option<Self> {
        config.credential()?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Some(Self {
            client,
            config: config.clone(),
        })
    }

    /// Endpoint URL for a `generateContent` call, without the key query.
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Flatten the optional system prompt and the user prompt into the
    /// single request text.
    fn full_prompt(prompt: &str, system_prompt: Option<&str>) -> String {
        match system_prompt {
            Some(system) => format!("{system}\n\nUser: {prompt}"),
            None => prompt.to_string(),
        }
    }

    /// Extract the generated text from a `generateContent` response body.
    fn parse_reply(json: &serde_json::Value) -> Result<String, InferenceError> {
        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(InferenceError::EmptyResponse)?
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(InferenceError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl InferenceGateway for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, InferenceError> {
        let body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": Self::full_prompt(prompt, system_prompt) } ] }
            ]
        });

        // The key is passed as a query parameter, per the Gemini REST API.
        let key = self.config.credential().ok_or(InferenceError::Unavailable)?;

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;

        Self::parse_reply(&json)
    }
}

// ---------------------------------------------------------------------------
// MockInference  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response and records every
/// `(prompt, system_prompt)` pair it receives.
#[cfg(test)]
pub struct MockInference {
    reply: Result<String, ()>,
    calls: std::sync::Mutex<Vec<(String, Option<String>)>>,
}

#[cfg(test)]
impl MockInference {
    /// Always generates `Ok(reply)`.
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Always fails with [`InferenceError::Request`].
    pub fn failing() -> Self {
        Self {
            reply: Err(()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl InferenceGateway for MockInference {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, InferenceError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), system_prompt.map(str::to_string)));
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(()) => Err(InferenceError::Request("mock transport failure".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> InferenceConfig {
        InferenceConfig {
            api_key: api_key.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    // ---- construction gating ---

    #[test]
    fn from_config_without_key_returns_none() {
        assert!(GeminiClient::from_config(&config(None)).is_none());
    }

    #[test]
    fn from_config_with_empty_key_returns_none() {
        assert!(GeminiClient::from_config(&config(Some(""))).is_none());
    }

    #[test]
    fn from_config_with_key_builds() {
        assert!(GeminiClient::from_config(&config(Some("AIza-test"))).is_some());
    }

    // ---- endpoint / prompt shaping ---

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let client = GeminiClient::from_config(&config(Some("k"))).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let mut cfg = config(Some("k"));
        cfg.base_url = "http://localhost:8080/".into();
        cfg.model = "test-model".into();
        let client = GeminiClient::from_config(&cfg).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/test-model:generateContent"
        );
    }

    #[test]
    fn full_prompt_prepends_system_prompt() {
        let full = GeminiClient::full_prompt("hello", Some("Be terse."));
        assert_eq!(full, "Be terse.\n\nUser: hello");
    }

    #[test]
    fn full_prompt_without_system_is_bare() {
        assert_eq!(GeminiClient::full_prompt("hello", None), "hello");
    }

    // ---- reply parsing ---

    #[test]
    fn parse_reply_extracts_candidate_text() {
        let json = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "  hi there \n" } ] } }
            ]
        });
        assert_eq!(GeminiClient::parse_reply(&json).unwrap(), "hi there");
    }

    #[test]
    fn parse_reply_missing_candidates_is_empty_response() {
        let json = serde_json::json!({ "error": { "message": "quota" } });
        assert!(matches!(
            GeminiClient::parse_reply(&json),
            Err(InferenceError::EmptyResponse)
        ));
    }

    #[test]
    fn parse_reply_blank_text_is_empty_response() {
        let json = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "   " } ] } }
            ]
        });
        assert!(matches!(
            GeminiClient::parse_reply(&json),
            Err(InferenceError::EmptyResponse)
        ));
    }

    /// Verify that `GeminiClient` is object-safe (usable as `dyn InferenceGateway`).
    #[test]
    fn gateway_is_object_safe() {
        let client = GeminiClient::from_config(&config(Some("k"))).unwrap();
        let gateway: Box<dyn InferenceGateway> = Box::new(client);
        drop(gateway);
    }
}
