//! Voz Gala — announcer-style speech generation.
//!
//! Turns short user text into played-back and exportable announcer audio:
//!
//! 1. [`text`] — sanitize, validate, and segment the input.
//! 2. [`tts`] — rewrite each segment in the chosen style, then synthesize
//!    speech for it (Gemini `generateContent`).
//! 3. [`audio`] — decode the PCM payloads, concatenate them into a master
//!    buffer, play it ([`rodio`]) or export it as WAV ([`hound`]).
//! 4. [`pipeline`] — the state machine and orchestrator driving 1-3.
//! 5. [`history`] / [`config`] — persistence of past generations and settings.

pub mod audio;
pub mod config;
pub mod history;
pub mod pipeline;
pub mod text;
pub mod tts;
