//! WAV export — canonical 44-byte PCM16 header plus interleaved samples.
//!
//! Encoding goes through `hound`, which emits the standard RIFF/WAVE layout
//! (`fmt ` chunk of 16 bytes, format tag 1, then a single `data` chunk).
//! Quantization is done here, not by hound: each float sample is clamped to
//! `[-1.0, 1.0]` and scaled asymmetrically — negative samples by 32768,
//! non-negative by 32767 — truncating toward zero, so the full signed 16-bit
//! range is used exactly.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use super::codec::SampleBuffer;

// ---------------------------------------------------------------------------
// WavError
// ---------------------------------------------------------------------------

/// WAV encoding or file I/O failure.
#[derive(Debug, Error)]
pub enum WavError {
    #[error("WAV encoding failed: {0}")]
    Encode(#[from] hound::Error),

    #[error("WAV file write failed: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Quantization
// ---------------------------------------------------------------------------

/// Quantize one normalized sample to signed 16-bit PCM.
///
/// Clamps to `[-1.0, 1.0]` first; `-1.0` maps to `-32768` and `1.0` to
/// `32767`, with truncation toward zero in between.
pub fn quantize_sample(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    let scaled = if clamped < 0.0 {
        clamped * 32_768.0
    } else {
        clamped * 32_767.0
    };
    scaled as i16
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn wav_spec(buffer: &SampleBuffer) -> hound::WavSpec {
    hound::WavSpec {
        channels: buffer.channel_count(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode `buffer` as a complete in-memory WAV byte stream.
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>, WavError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, wav_spec(buffer))?;
        for sample in buffer.interleaved() {
            writer.write_sample(quantize_sample(sample))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Write `buffer` as a WAV file at `path`, creating parent directories.
pub fn write_wav_file(buffer: &SampleBuffer, path: &Path) -> Result<(), WavError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = encode_wav(buffer)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Export filename convention: `<prefix>_<epoch-millis>.wav`.
pub fn export_path(dir: &Path, prefix: &str) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    dir.join(format!("{prefix}_{millis}.wav"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
