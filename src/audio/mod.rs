//! Audio pipeline — PCM decoding → master buffer assembly → playback / WAV export.
//!
//! # Pipeline
//!
//! ```text
//! base64 PCM16LE per segment → decode_pcm16_base64 → SampleBuffer
//!        → concatenate → master SampleBuffer → AudioOutput / encode_wav
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voz_gala::audio::{concatenate, decode_pcm16_base64, encode_wav};
//!
//! let a = decode_pcm16_base64("AAAAAA==", 24_000, 1).unwrap();
//! let b = decode_pcm16_base64("AAD/fw==", 24_000, 1).unwrap();
//! let master = concatenate(&[a, b]).unwrap();
//! let wav_bytes = encode_wav(&master).unwrap();
//! assert_eq!(&wav_bytes[0..4], b"RIFF");
//! ```

pub mod assemble;
pub mod codec;
pub mod playback;
pub mod wav;

pub use assemble::{concatenate, FormatMismatchError};
pub use codec::{
    decode_pcm16, decode_pcm16_base64, DecodeError, SampleBuffer, DEFAULT_CHANNEL_COUNT,
    DEFAULT_SAMPLE_RATE,
};
pub use playback::{
    clamp_rate, clamp_volume, AudioOutput, CompletionCallback, NullOutput, PlaybackError,
    RodioOutput,
};
pub use wav::{encode_wav, export_path, quantize_sample, write_wav_file, WavError};
