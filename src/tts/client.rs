//! Shared REST plumbing for the rewrite and synthesis collaborators.
//!
//! Both collaborators speak the Gemini `generateContent` wire format; all
//! connection details (base URL, models, key, timeout) come from
//! [`ApiConfig`] — nothing is hardcoded.

use thiserror::Error;

use crate::config::ApiConfig;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// Errors from the rewrite/synthesis API layer.
#[derive(Debug, Error)]
pub enum TtsError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("API request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// The API rejected the request (non-2xx status).
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsError::Timeout
        } else {
            TtsError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Thin `generateContent` client shared by [`GeminiRewriter`] and
/// [`GeminiSynthesizer`].
///
/// [`GeminiRewriter`]: super::GeminiRewriter
/// [`GeminiSynthesizer`]: super::GeminiSynthesizer
pub struct GeminiClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl GeminiClient {
    /// Build a client from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is the last-resort fallback
    /// if the builder fails.
    pub fn from_config(config: &ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// POST `body` to `{base_url}/v1beta/models/{model}:generateContent` and
    /// return the parsed JSON response.
    pub async fn generate_content(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TtsError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        );

        let mut req = self.client.post(&url).json(body);
        if let Some(key) = self.config.resolved_key() {
            req = req.header("x-goog-api-key", key);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TtsError::Parse(e.to_string()))
    }
}

/// Extract the first candidate part from a `generateContent` response.
///
/// Both collaborators read `candidates[0].content.parts[0]`; the rewriter
/// wants its `text`, the synthesizer its `inlineData.data`.
pub fn first_part(response: &serde_json::Value) -> &serde_json::Value {
    &response["candidates"][0]["content"]["parts"][0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
