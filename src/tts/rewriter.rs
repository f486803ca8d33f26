//! Style rewrite collaborator — turns raw user text into an announcer script.

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::text::sanitize;

use super::client::{first_part, GeminiClient, TtsError};
use super::prompt::system_instruction;
use super::voice::AnnouncerStyle;

// ---------------------------------------------------------------------------
// Rewriter trait
// ---------------------------------------------------------------------------

/// Async trait for the text-rewrite step.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Rewriter>`.
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Rewrite `text` in the given announcer style.
    ///
    /// [`AnnouncerStyle::Real`] bypasses the external call and returns the
    /// sanitized input unchanged.
    async fn rewrite(&self, text: &str, style: AnnouncerStyle) -> Result<String, TtsError>;
}

// ---------------------------------------------------------------------------
// GeminiRewriter
// ---------------------------------------------------------------------------

/// Production [`Rewriter`] backed by the Gemini `generateContent` endpoint.
pub struct GeminiRewriter {
    client: GeminiClient,
    model: String,
}

impl GeminiRewriter {
    /// Build a rewriter from application config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            client: GeminiClient::from_config(config),
            model: config.rewrite_model.clone(),
        }
    }
}

#[async_trait]
impl Rewriter for GeminiRewriter {
    async fn rewrite(&self, text: &str, style: AnnouncerStyle) -> Result<String, TtsError> {
        let clean = sanitize(text);

        // Real mode: announce the input verbatim, no API round trip.
        let Some(instruction) = system_instruction(style) else {
            return Ok(clean);
        };

        let body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": clean } ] }
            ],
            "systemInstruction": {
                "parts": [ { "text": instruction } ]
            }
        });

        let response = self.client.generate_content(&self.model, &body).await?;

        let rewritten = first_part(&response)["text"]
            .as_str()
            .map(str::trim)
            .unwrap_or("");

        // An empty model response falls back to the sanitized input rather
        // than failing the segment.
        if rewritten.is_empty() {
            log::warn!("rewrite: empty response for style {style}, keeping input text");
            Ok(clean)
        } else {
            Ok(rewritten.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
