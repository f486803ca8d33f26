//! Rewrite and synthesis collaborators for the announcer pipeline.
//!
//! This module provides:
//! * [`Rewriter`] / [`GeminiRewriter`] — style rewrite of user text.
//! * [`Synthesizer`] / [`GeminiSynthesizer`] — script to base64 PCM audio.
//! * [`AnnouncerStyle`] / [`AnnouncerGender`] / [`voice_for`] — voice model.
//! * [`GeminiClient`] — shared `generateContent` REST plumbing.
//! * [`TtsError`] — error variants for both collaborators.

pub mod client;
pub mod prompt;
pub mod rewriter;
pub mod synthesizer;
pub mod voice;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{GeminiClient, TtsError};
pub use prompt::system_instruction;
pub use rewriter::{GeminiRewriter, Rewriter};
pub use synthesizer::{GeminiSynthesizer, Synthesizer};
pub use voice::{voice_for, AnnouncerGender, AnnouncerStyle};
