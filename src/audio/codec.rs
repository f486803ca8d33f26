//! PCM16 decoding into normalized floating-point sample buffers.
//!
//! The synthesis API returns base64-encoded raw PCM: 16-bit little-endian
//! signed samples, mono, 24 kHz. [`decode_pcm16_base64`] is the front door
//! used by the pipeline; [`decode_pcm16`] handles already-decoded bytes.
//!
//! Samples are normalized to `[-1.0, 1.0]` by dividing by 32768 and
//! de-interleaved into per-channel arrays.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

/// Sample rate the synthesis API delivers PCM at.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// The synthesis API only produces mono audio.
pub const DEFAULT_CHANNEL_COUNT: u16 = 1;

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// A malformed PCM payload.
///
/// At the pipeline level a decode failure drops that segment's audio only;
/// it is fatal only when every segment fails.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The payload was not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(String),

    /// The byte length is not a multiple of `2 × channel_count`.
    #[error("PCM byte length {len} is not a multiple of {frame_bytes} (16-bit × {channels} channel(s))")]
    Alignment {
        len: usize,
        frame_bytes: usize,
        channels: u16,
    },

    /// Zero channels requested.
    #[error("channel count must be positive")]
    NoChannels,
}

// ---------------------------------------------------------------------------
// SampleBuffer
// ---------------------------------------------------------------------------

/// A fixed-length buffer of normalized samples, one array per channel.
///
/// Invariants: `channel_count ≥ 1`, all channel arrays have equal length,
/// samples lie in the closed interval `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channel_count: u16,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Build a buffer from per-channel sample arrays.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is empty or the channel arrays differ in length.
    /// These are programmer errors, not runtime conditions.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        assert!(!channels.is_empty(), "SampleBuffer needs at least one channel");
        let frames = channels[0].len();
        assert!(
            channels.iter().all(|c| c.len() == frames),
            "all channels must have equal length"
        );
        Self {
            sample_rate,
            channel_count: channels.len() as u16,
            channels,
        }
    }

    /// Convenience constructor for mono audio.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self::new(sample_rate, vec![samples])
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics when `index ≥ channel_count`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels, outermost index is the channel.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Playback duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Interleave channels frame-by-frame (the layout WAV data and rodio
    /// sources expect).
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channel_count as usize);
        for frame in 0..frames {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

/// Decode a base64 PCM16LE payload into a [`SampleBuffer`].
pub fn decode_pcm16_base64(
    payload: &str,
    sample_rate: u32,
    channel_count: u16,
) -> Result<SampleBuffer, DecodeError> {
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    decode_pcm16(&bytes, sample_rate, channel_count)
}

/// Decode raw PCM16LE bytes into a [`SampleBuffer`].
///
/// Every consecutive byte pair is a little-endian signed 16-bit sample;
/// samples are normalized by `/ 32768.0` and de-interleaved into
/// `byte_len / 2 / channel_count` frames per channel.
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channel_count: u16,
) -> Result<SampleBuffer, DecodeError> {
    if channel_count == 0 {
        return Err(DecodeError::NoChannels);
    }

    let frame_bytes = 2 * channel_count as usize;
    if bytes.len() % frame_bytes != 0 {
        return Err(DecodeError::Alignment {
            len: bytes.len(),
            frame_bytes,
            channels: channel_count,
        });
    }

    let frames = bytes.len() / frame_bytes;
    let mut channels = vec![Vec::with_capacity(frames); channel_count as usize];

    for frame in bytes.chunks_exact(frame_bytes) {
        for (ch, sample_bytes) in frame.chunks_exact(2).enumerate() {
            let value = i16::from_le_bytes([sample_bytes[0], sample_bytes[1]]);
            channels[ch].push(value as f32 / 32_768.0);
        }
    }

    Ok(SampleBuffer::new(sample_rate, channels))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
