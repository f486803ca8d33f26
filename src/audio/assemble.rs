//! Master buffer assembly — ordered concatenation of segment buffers.
//!
//! Every per-segment buffer must agree on sample rate and channel count;
//! a mismatch means the synthesis stage produced inconsistent audio and the
//! whole request is aborted, never partially assembled.

use thiserror::Error;

use super::codec::SampleBuffer;

// ---------------------------------------------------------------------------
// FormatMismatchError
// ---------------------------------------------------------------------------

/// Inconsistent audio format across the buffers of one generation.
///
/// Fatal: this indicates an upstream synthesis inconsistency, not user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatMismatchError {
    #[error("no buffers to concatenate")]
    Empty,

    #[error("sample rate mismatch: buffer {index} is {found} Hz, expected {expected} Hz")]
    SampleRate {
        index: usize,
        expected: u32,
        found: u32,
    },

    #[error("channel count mismatch: buffer {index} has {found} channel(s), expected {expected}")]
    ChannelCount {
        index: usize,
        expected: u16,
        found: u16,
    },
}

// ---------------------------------------------------------------------------
// concatenate
// ---------------------------------------------------------------------------

/// Concatenate `buffers` in order into one continuous buffer.
///
/// Degenerates to a clone for a single-element slice. The output takes the
/// first buffer's sample rate and channel count; segment N's samples precede
/// segment N+1's in every channel, so exported audio replays the segments in
/// script order.
pub fn concatenate(buffers: &[SampleBuffer]) -> Result<SampleBuffer, FormatMismatchError> {
    let first = buffers.first().ok_or(FormatMismatchError::Empty)?;

    let sample_rate = first.sample_rate();
    let channel_count = first.channel_count();

    for (index, buf) in buffers.iter().enumerate().skip(1) {
        if buf.sample_rate() != sample_rate {
            return Err(FormatMismatchError::SampleRate {
                index,
                expected: sample_rate,
                found: buf.sample_rate(),
            });
        }
        if buf.channel_count() != channel_count {
            return Err(FormatMismatchError::ChannelCount {
                index,
                expected: channel_count,
                found: buf.channel_count(),
            });
        }
    }

    if buffers.len() == 1 {
        return Ok(first.clone());
    }

    let total_frames: usize = buffers.iter().map(SampleBuffer::frames).sum();
    let mut channels = vec![Vec::with_capacity(total_frames); channel_count as usize];

    for buf in buffers {
        for (ch, out) in channels.iter_mut().enumerate() {
            out.extend_from_slice(buf.channel(ch));
        }
    }

    Ok(SampleBuffer::new(sample_rate, channels))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(rate: u32, len: usize, value: f32) -> SampleBuffer {
        SampleBuffer::mono(rate, vec![value; len])
    }

    #[test]
    fn two_buffers_concatenate_in_order() {
        let a = mono(24_000, 100, 0.25);
        let b = mono(24_000, 50, -0.75);

        let out = concatenate(&[a, b]).unwrap();
        assert_eq!(out.frames(), 150);
        assert_eq!(out.sample_rate(), 24_000);
        assert_eq!(out.channel_count(), 1);

        assert!(out.channel(0)[..100].iter().all(|&s| s == 0.25));
        assert!(out.channel(0)[100..].iter().all(|&s| s == -0.75));
    }

    #[test]
    fn single_buffer_is_identity() {
        let a = SampleBuffer::mono(24_000, vec![0.1, -0.2, 0.3]);
        let out = concatenate(std::slice::from_ref(&a)).unwrap();
        assert_eq!(out, a);
    }

    #[test]
    fn empty_slice_is_rejected() {
        assert_eq!(concatenate(&[]), Err(FormatMismatchError::Empty));
    }

    #[test]
    fn sample_rate_mismatch_is_fatal() {
        let a = mono(24_000, 10, 0.0);
        let b = mono(48_000, 10, 0.0);

        let err = concatenate(&[a, b]).unwrap_err();
        assert_eq!(
            err,
            FormatMismatchError::SampleRate {
                index: 1,
                expected: 24_000,
                found: 48_000,
            }
        );
    }

    #[test]
    fn channel_count_mismatch_is_fatal() {
        let a = mono(24_000, 10, 0.0);
        let b = SampleBuffer::new(24_000, vec![vec![0.0; 10], vec![0.0; 10]]);

        let err = concatenate(&[a, b]).unwrap_err();
        assert_eq!(
            err,
            FormatMismatchError::ChannelCount {
                index: 1,
                expected: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn mismatch_anywhere_in_the_sequence_is_caught() {
        let buffers = vec![
            mono(24_000, 5, 0.0),
            mono(24_000, 5, 0.0),
            mono(22_050, 5, 0.0),
        ];
        let err = concatenate(&buffers).unwrap_err();
        assert!(matches!(err, FormatMismatchError::SampleRate { index: 2, .. }));
    }

    #[test]
    fn stereo_channels_keep_their_identity() {
        let a = SampleBuffer::new(24_000, vec![vec![1.0, 1.0], vec![-1.0, -1.0]]);
        let b = SampleBuffer::new(24_000, vec![vec![0.5], vec![-0.5]]);

        let out = concatenate(&[a, b]).unwrap();
        assert_eq!(out.channel(0), &[1.0, 1.0, 0.5]);
        assert_eq!(out.channel(1), &[-1.0, -1.0, -0.5]);
    }
}
