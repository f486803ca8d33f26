//! Audio playback through a dedicated rodio output thread.
//!
//! [`AudioOutput`] is the seam the orchestrator talks to; [`RodioOutput`] is
//! the production implementation. Because the underlying OS audio stream is
//! not `Send`, it lives on its own `audio-playback` thread that receives
//! commands over a channel — the handle itself is freely shareable.
//!
//! Only one buffer renders at a time: starting a new playback stops the
//! previous one first, and a stale completion callback never fires.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rodio::buffer::SamplesBuffer;
use rodio::Sink;
use thiserror::Error;
use tokio::sync::mpsc;

use super::codec::SampleBuffer;

/// Linear gain range accepted by [`AudioOutput::play`].
pub const VOLUME_RANGE: (f32, f32) = (0.0, 2.0);

/// Playback-rate range accepted by [`AudioOutput::play`]. Pitch shifts with
/// rate; no time-stretching is applied.
pub const RATE_RANGE: (f32, f32) = (0.5, 2.0);

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Audio output failures.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No usable output device.
    #[error("audio output unavailable: {0}")]
    Device(String),

    /// The playback thread is gone.
    #[error("playback thread terminated")]
    ThreadGone,
}

/// Invoked exactly once when playback finishes naturally. Not invoked when
/// playback is stopped or superseded.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

// ---------------------------------------------------------------------------
// AudioOutput trait
// ---------------------------------------------------------------------------

/// Object-safe playback seam held by the orchestrator as `Arc<dyn AudioOutput>`.
pub trait AudioOutput: Send + Sync {
    /// Begin rendering `buffer` with linear gain `volume` and playback-rate
    /// `rate`. Values outside [`VOLUME_RANGE`] / [`RATE_RANGE`] are clamped.
    /// Any active playback is stopped before the new one starts.
    fn play(
        &self,
        buffer: &SampleBuffer,
        volume: f32,
        rate: f32,
        on_complete: CompletionCallback,
    ) -> Result<(), PlaybackError>;

    /// Halt any current playback immediately. Idempotent.
    fn stop(&self);
}

/// Clamp a requested volume into [`VOLUME_RANGE`].
pub fn clamp_volume(volume: f32) -> f32 {
    volume.clamp(VOLUME_RANGE.0, VOLUME_RANGE.1)
}

/// Clamp a requested playback rate into [`RATE_RANGE`].
pub fn clamp_rate(rate: f32) -> f32 {
    rate.clamp(RATE_RANGE.0, RATE_RANGE.1)
}

// ---------------------------------------------------------------------------
// RodioOutput
// ---------------------------------------------------------------------------

enum PlaybackCommand {
    Play {
        channels: u16,
        sample_rate: u32,
        samples: Vec<f32>,
        volume: f32,
        rate: f32,
        on_complete: CompletionCallback,
        generation: u64,
    },
    Stop,
}

/// Production [`AudioOutput`] backed by a rodio sink on a dedicated thread.
pub struct RodioOutput {
    tx: mpsc::UnboundedSender<PlaybackCommand>,
    /// Bumped on every `play`/`stop`; a watcher only fires its completion
    /// callback when its generation is still current.
    generation: Arc<AtomicU64>,
}

impl RodioOutput {
    /// Open the default output device and spawn the playback thread.
    pub fn new() -> Result<Self, PlaybackError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (init_tx, init_rx) = std::sync::mpsc::sync_channel::<Result<(), String>>(1);
        let generation = Arc::new(AtomicU64::new(0));
        let thread_generation = Arc::clone(&generation);

        std::thread::Builder::new()
            .name("audio-playback".into())
            .spawn(move || playback_thread(rx, init_tx, thread_generation))
            .map_err(|e| PlaybackError::Device(e.to_string()))?;

        match init_rx.recv() {
            Ok(Ok(())) => Ok(Self { tx, generation }),
            Ok(Err(msg)) => Err(PlaybackError::Device(msg)),
            Err(_) => Err(PlaybackError::ThreadGone),
        }
    }
}

impl AudioOutput for RodioOutput {
    fn play(
        &self,
        buffer: &SampleBuffer,
        volume: f32,
        rate: f32,
        on_complete: CompletionCallback,
    ) -> Result<(), PlaybackError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx
            .send(PlaybackCommand::Play {
                channels: buffer.channel_count(),
                sample_rate: buffer.sample_rate(),
                samples: buffer.interleaved(),
                volume: clamp_volume(volume),
                rate: clamp_rate(rate),
                on_complete,
                generation,
            })
            .map_err(|_| PlaybackError::ThreadGone)
    }

    fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        // A dead playback thread means nothing is playing — stop is a no-op.
        let _ = self.tx.send(PlaybackCommand::Stop);
    }
}

fn playback_thread(
    mut rx: mpsc::UnboundedReceiver<PlaybackCommand>,
    init_tx: std::sync::mpsc::SyncSender<Result<(), String>>,
    generation: Arc<AtomicU64>,
) {
    let stream = match rodio::OutputStreamBuilder::open_default_stream() {
        Ok(stream) => {
            let _ = init_tx.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = init_tx.send(Err(e.to_string()));
            return;
        }
    };

    let mut current: Option<Arc<Sink>> = None;

    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            PlaybackCommand::Play {
                channels,
                sample_rate,
                samples,
                volume,
                rate,
                on_complete,
                generation: my_generation,
            } => {
                // Previous playback must end before the new one starts.
                if let Some(old) = current.take() {
                    old.stop();
                }

                let sink = Arc::new(Sink::connect_new(stream.mixer()));
                sink.set_volume(volume);
                sink.set_speed(rate);
                sink.append(SamplesBuffer::new(channels, sample_rate, samples));

                let watcher_sink = Arc::clone(&sink);
                let watcher_generation = Arc::clone(&generation);
                let watcher = std::thread::Builder::new()
                    .name("playback-watcher".into())
                    .spawn(move || {
                        watcher_sink.sleep_until_end();
                        if watcher_generation.load(Ordering::SeqCst) == my_generation {
                            on_complete();
                        }
                    });
                if let Err(e) = watcher {
                    log::warn!("playback: failed to spawn completion watcher: {e}");
                }

                current = Some(sink);
            }
            PlaybackCommand::Stop => {
                if let Some(sink) = current.take() {
                    sink.stop();
                }
            }
        }
    }

    log::debug!("playback: command channel closed, thread exiting");
}

// ---------------------------------------------------------------------------
// NullOutput
// ---------------------------------------------------------------------------

/// No-op output for headless environments (no audio device) and tests.
///
/// Completes immediately: `on_complete` fires synchronously from `play`.
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn play(
        &self,
        buffer: &SampleBuffer,
        _volume: f32,
        _rate: f32,
        on_complete: CompletionCallback,
    ) -> Result<(), PlaybackError> {
        log::debug!(
            "playback (null): {} frames @ {} Hz discarded",
            buffer.frames(),
            buffer.sample_rate()
        );
        on_complete();
        Ok(())
    }

    fn stop(&self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
