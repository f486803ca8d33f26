//! Speech synthesis collaborator — announcer script to base64 PCM16LE audio.

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::text::sanitize;

use super::client::{first_part, GeminiClient, TtsError};
use super::voice::{voice_for, AnnouncerGender, AnnouncerStyle};

// ---------------------------------------------------------------------------
// Synthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for the text-to-speech step.
///
/// Returns base64-encoded PCM16LE mono audio at 24 kHz, or `Ok(None)` when
/// the API produced no audio for this text — a soft failure that drops this
/// segment only. Transport and protocol errors are `Err` and abort the
/// whole request.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        style: AnnouncerStyle,
        gender: AnnouncerGender,
    ) -> Result<Option<String>, TtsError>;
}

// ---------------------------------------------------------------------------
// GeminiSynthesizer
// ---------------------------------------------------------------------------

/// Production [`Synthesizer`] backed by the Gemini TTS model.
pub struct GeminiSynthesizer {
    client: GeminiClient,
    model: String,
}

impl GeminiSynthesizer {
    /// Build a synthesizer from application config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            client: GeminiClient::from_config(config),
            model: config.tts_model.clone(),
        }
    }
}

#[async_trait]
impl Synthesizer for GeminiSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        style: AnnouncerStyle,
        gender: AnnouncerGender,
    ) -> Result<Option<String>, TtsError> {
        // The script went through sanitation before the rewrite, but it has
        // been through a model since — sanitize again before speaking it.
        let clean = sanitize(text);
        let voice = voice_for(style, gender);

        let body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": clean } ] }
            ],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": voice }
                    }
                }
            }
        });

        let response = self.client.generate_content(&self.model, &body).await?;

        let audio = first_part(&response)["inlineData"]["data"]
            .as_str()
            .filter(|data| !data.is_empty())
            .map(str::to_string);

        if audio.is_none() {
            log::warn!("synthesize: no audio returned (voice {voice})");
        }
        Ok(audio)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
