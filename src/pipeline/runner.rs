//! Generation orchestrator — drives the full text → rewrite → synthesis →
//! mastering → playback cycle.
//!
//! # Pipeline flow
//!
//! ```text
//! generate(request)
//!   ├─ sanitize + validate, rate-limit gate, credential check   [never
//!   │  enters the state machine on failure]
//!   ├─ Analyzing     UX delay only
//!   ├─ Rewriting     split → sequential rewrite per segment → script
//!   ├─ Synthesizing  sequential synthesis + PCM decode per segment
//!   │                (a segment with no audio is skipped, not fatal)
//!   ├─ Mastering     concatenate segment buffers → master buffer
//!   └─ Ready         publish, write history, auto-play, start cooldown
//! any failure ──▶ Idle, partial script/buffers discarded, one error event
//! ```
//!
//! External calls run strictly sequentially — never concurrently — so
//! script text and audio keep segment order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::audio::{
    clamp_rate, clamp_volume, concatenate, decode_pcm16_base64, wav, AudioOutput,
    FormatMismatchError, SampleBuffer,
};
use crate::config::AppConfig;
use crate::history::HistoryStore;
use crate::text::{sanitize, split, validate, ValidationError};
use crate::tts::{AnnouncerGender, AnnouncerStyle, Rewriter, Synthesizer, TtsError};

use super::ratelimit::RateLimiter;
use super::state::PipelineState;

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// Transient parameters of one pipeline run. Created when the user triggers
/// generation, consumed synchronously, discarded when the run terminates.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Raw input text.
    pub text: String,
    /// Delivery style.
    pub style: AnnouncerStyle,
    /// Announcer voice gender.
    pub gender: AnnouncerGender,
    /// Requester display name, recorded in history.
    pub author: String,
}

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Everything that can abort one generation.
///
/// Each variant carries a single user-facing message; transient per-segment
/// failures (decode errors, null synthesis) are swallowed at the segment
/// level and never surface here unless they eliminate all output.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Empty or over-length input — the pipeline never starts.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Cooldown not yet elapsed — the pipeline never starts.
    #[error("Por seguridad, espera unos segundos antes de generar otro audio.")]
    RateLimit { remaining: Duration },

    /// No API credential configured — the pipeline never starts.
    #[error("Error de configuración: API Key faltante.")]
    MissingCredentials,

    /// The rewrite collaborator failed.
    #[error("La reescritura del texto falló: {0}")]
    Rewrite(#[source] TtsError),

    /// The synthesis collaborator failed (transport/protocol, not null audio).
    #[error("Fallo en la síntesis de audio: {0}")]
    Synthesis(#[source] TtsError),

    /// Every segment failed to produce audio.
    #[error("Fallo en la síntesis de audio.")]
    SynthesisExhausted,

    /// Inconsistent audio format across segment buffers.
    #[error("Error en el procesamiento de audio: {0}")]
    FormatMismatch(#[from] FormatMismatchError),
}

// ---------------------------------------------------------------------------
// PipelineEvent
// ---------------------------------------------------------------------------

/// Progress events emitted over the orchestrator's event channel.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// The state machine advanced.
    StateChanged(PipelineState),
    /// The full rewritten script is assembled (before synthesis starts).
    ScriptReady { script: String },
    /// The master buffer is published.
    Ready { frames: usize, duration_secs: f32 },
    /// Playback of the master buffer finished naturally.
    PlaybackFinished,
    /// One second of cooldown elapsed; `seconds_remaining` counts down to 0.
    CooldownTick { seconds_remaining: u64 },
    /// A generation failed; `message` is the single user-facing error.
    Error { message: String },
}

// ---------------------------------------------------------------------------
// GenerationOrchestrator
// ---------------------------------------------------------------------------

/// Owns the pipeline state, the master buffer, and all collaborator handles
/// for one generation flow. The master buffer and state are mutated by this
/// orchestrator only.
pub struct GenerationOrchestrator {
    config: AppConfig,
    rewriter: Arc<dyn Rewriter>,
    synthesizer: Arc<dyn Synthesizer>,
    output: Arc<dyn AudioOutput>,
    history: HistoryStore,
    limiter: RateLimiter,
    state: PipelineState,
    script: Option<String>,
    master: Option<SampleBuffer>,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl GenerationOrchestrator {
    /// Create an orchestrator.
    ///
    /// # Arguments
    ///
    /// * `config`      — application configuration snapshot.
    /// * `rewriter`    — style rewrite collaborator.
    /// * `synthesizer` — speech synthesis collaborator.
    /// * `output`      — audio output (e.g. `RodioOutput` or `NullOutput`).
    /// * `history`     — store that records each successful generation.
    pub fn new(
        config: AppConfig,
        rewriter: Arc<dyn Rewriter>,
        synthesizer: Arc<dyn Synthesizer>,
        output: Arc<dyn AudioOutput>,
        history: HistoryStore,
    ) -> Self {
        let limiter = RateLimiter::new(Duration::from_millis(config.limits.cooldown_ms));
        Self {
            config,
            rewriter,
            synthesizer,
            output,
            history,
            limiter,
            state: PipelineState::Idle,
            script: None,
            master: None,
            event_tx: None,
        }
    }

    /// Attach an event channel for progress reporting.
    pub fn with_events(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current pipeline state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The most recent successfully generated script.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// The most recent master buffer.
    pub fn master_buffer(&self) -> Option<&SampleBuffer> {
        self.master.as_ref()
    }

    /// The generation history (read access).
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Run one generation cycle to completion or failure.
    ///
    /// Boundary failures (validation, rate limit, credentials) are reported
    /// without entering the state machine and leave the previous script and
    /// master buffer untouched. Once the machine starts, any failure discards
    /// partial state and returns to `Idle` — no partial audio or script is
    /// ever exposed.
    pub async fn generate(&mut self, request: GenerationRequest) -> Result<(), GenerationError> {
        let clean = sanitize(&request.text);

        if let Err(e) = validate(&clean, self.config.limits.max_chars) {
            return self.reject(e.into()).await;
        }
        if let Err(remaining) = self.limiter.try_acquire() {
            return self.reject(GenerationError::RateLimit { remaining }).await;
        }
        if !self.config.api.has_credentials() {
            return self.reject(GenerationError::MissingCredentials).await;
        }

        log::info!(
            "generation started: style={} gender={} len={}",
            request.style,
            request.gender,
            clean.chars().count()
        );

        match self.run_pipeline(&request, &clean).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // Discard all partial state; the machine returns to idle.
                self.script = None;
                self.master = None;
                self.set_state(PipelineState::Idle).await;
                self.fail(e).await
            }
        }
    }

    async fn run_pipeline(
        &mut self,
        request: &GenerationRequest,
        clean: &str,
    ) -> Result<(), GenerationError> {
        // A new run supersedes the previous script and buffer immediately.
        self.script = None;
        self.master = None;

        // ── 1. Analyzing — UX-facing delay, no computation ───────────────
        self.set_state(PipelineState::Analyzing).await;
        let delay = self.config.limits.analysis_delay_ms;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        // ── 2. Rewriting — sequential per segment, order preserved ────────
        self.set_state(PipelineState::Rewriting).await;
        let segments = split(clean, self.config.limits.max_segment_chars);

        let mut rewritten = Vec::with_capacity(segments.len());
        for segment in &segments {
            let out = self
                .rewriter
                .rewrite(segment.as_str(), request.style)
                .await
                .map_err(GenerationError::Rewrite)?;
            rewritten.push(out);
        }
        let script = rewritten.join(" ");
        log::debug!("rewrite complete: {} segment(s)", rewritten.len());
        self.emit(PipelineEvent::ScriptReady {
            script: script.clone(),
        })
        .await;

        // ── 3. Synthesizing — sequential; null audio drops the segment ────
        self.set_state(PipelineState::Synthesizing).await;
        let sample_rate = self.config.audio.sample_rate;
        let channel_count = self.config.audio.channel_count;

        let mut buffers: Vec<SampleBuffer> = Vec::with_capacity(rewritten.len());
        for (index, text) in rewritten.iter().enumerate() {
            let payload = self
                .synthesizer
                .synthesize(text, request.style, request.gender)
                .await
                .map_err(GenerationError::Synthesis)?;

            let Some(payload) = payload else {
                log::warn!("segment {index}: no audio returned, skipping");
                continue;
            };

            match decode_pcm16_base64(&payload, sample_rate, channel_count) {
                Ok(buffer) => buffers.push(buffer),
                Err(e) => {
                    log::warn!("segment {index}: dropping undecodable audio: {e}");
                }
            }
        }

        if buffers.is_empty() {
            return Err(GenerationError::SynthesisExhausted);
        }

        // ── 4. Mastering — ordered concatenation ─────────────────────────
        self.set_state(PipelineState::Mastering).await;
        let master = concatenate(&buffers)?;
        log::debug!(
            "mastered {} segment buffer(s): {} frames, {:.2}s",
            buffers.len(),
            master.frames(),
            master.duration_secs()
        );

        // ── 5. Ready — publish, record, auto-play, cooldown ──────────────
        let frames = master.frames();
        let duration_secs = master.duration_secs();
        self.script = Some(script.clone());
        self.master = Some(master);
        self.set_state(PipelineState::Ready).await;
        self.emit(PipelineEvent::Ready {
            frames,
            duration_secs,
        })
        .await;

        // History write failures are logged, not fatal — the audio exists.
        if let Err(e) = self.history.append(
            clean,
            &script,
            request.style,
            request.gender,
            &request.author,
        ) {
            log::warn!("history write failed: {e}");
        }

        self.play(
            self.config.audio.default_volume,
            self.config.audio.default_rate,
        );
        self.spawn_cooldown_ticks();

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Playback and export
    // -----------------------------------------------------------------------

    /// Play the current master buffer, stopping any active playback first.
    /// No-op when nothing has been generated yet.
    pub fn play(&self, volume: f32, rate: f32) {
        let Some(master) = &self.master else {
            log::debug!("play requested with no master buffer");
            return;
        };

        let tx = self.event_tx.clone();
        let on_complete = Box::new(move || {
            if let Some(tx) = tx {
                let _ = tx.try_send(PipelineEvent::PlaybackFinished);
            }
        });

        if let Err(e) = self
            .output
            .play(master, clamp_volume(volume), clamp_rate(rate), on_complete)
        {
            log::warn!("playback failed: {e}");
        }
    }

    /// Stop playback. Safe to call when nothing is playing.
    pub fn stop(&self) {
        self.output.stop();
    }

    /// Export the current master buffer as `<prefix>_<epoch-millis>.wav`
    /// under `dir` and return the written path.
    pub fn export_wav(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let master = self
            .master
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no audio has been generated yet"))?;

        let path = wav::export_path(dir, &self.config.export.filename_prefix);
        wav::write_wav_file(master, &path)?;
        log::info!("exported {}", path.display());
        Ok(path)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn set_state(&mut self, state: PipelineState) {
        log::debug!("pipeline: {} → {}", self.state.label(), state.label());
        self.state = state;
        self.emit(PipelineEvent::StateChanged(state)).await;
    }

    async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Report a boundary rejection: state machine untouched, one error event.
    async fn reject(&self, error: GenerationError) -> Result<(), GenerationError> {
        self.fail(error).await
    }

    async fn fail(&self, error: GenerationError) -> Result<(), GenerationError> {
        log::error!("generation failed: {error}");
        self.emit(PipelineEvent::Error {
            message: error.to_string(),
        })
        .await;
        Err(error)
    }

    /// Emit one `CooldownTick` per second until the window elapses.
    fn spawn_cooldown_ticks(&self) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let total_secs = self.config.limits.cooldown_ms.div_ceil(1_000);

        tokio::spawn(async move {
            for elapsed in 1..=total_secs {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let tick = PipelineEvent::CooldownTick {
                    seconds_remaining: total_secs - elapsed,
                };
                if tx.send(tick).await.is_err() {
                    break;
                }
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{CompletionCallback, PlaybackError};
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Rewriter that uppercases each segment, recording what it saw.
    struct UppercaseRewriter {
        calls: Mutex<Vec<String>>,
    }

    impl UppercaseRewriter {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Rewriter for UppercaseRewriter {
        async fn rewrite(&self, text: &str, _style: AnnouncerStyle) -> Result<String, TtsError> {
            self.calls.lock().unwrap().push(text.to_string());
            Ok(text.to_uppercase())
        }
    }

    /// Rewriter that always fails with a transport error.
    struct FailingRewriter;

    #[async_trait]
    impl Rewriter for FailingRewriter {
        async fn rewrite(&self, _text: &str, _style: AnnouncerStyle) -> Result<String, TtsError> {
            Err(TtsError::Timeout)
        }
    }

    /// Synthesizer that yields a scripted sequence of responses, one per call.
    struct ScriptedSynthesizer {
        responses: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedSynthesizer {
        fn new(responses: Vec<Option<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }

        /// Always returns `frames` frames of silence, for any number of calls.
        fn silence(frames: usize) -> Self {
            Self::new(vec![Some(silence_payload(frames)); 64])
        }
    }

    #[async_trait]
    impl Synthesizer for ScriptedSynthesizer {
        async fn synthesize(
            &self,
            _text: &str,
            _style: AnnouncerStyle,
            _gender: AnnouncerGender,
        ) -> Result<Option<String>, TtsError> {
            let mut responses = self.responses.lock().unwrap();
            assert!(!responses.is_empty(), "synthesizer called more times than scripted");
            Ok(responses.remove(0))
        }
    }

    /// Output that records play invocations and completes immediately.
    struct RecordingOutput {
        plays: Mutex<Vec<(usize, f32, f32)>>,
    }

    impl RecordingOutput {
        fn new() -> Self {
            Self {
                plays: Mutex::new(Vec::new()),
            }
        }
    }

    impl AudioOutput for RecordingOutput {
        fn play(
            &self,
            buffer: &SampleBuffer,
            volume: f32,
            rate: f32,
            on_complete: CompletionCallback,
        ) -> Result<(), PlaybackError> {
            self.plays.lock().unwrap().push((buffer.frames(), volume, rate));
            on_complete();
            Ok(())
        }

        fn stop(&self) {}
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Base64 PCM16LE payload of `frames` frames of silence (mono).
    fn silence_payload(frames: usize) -> String {
        BASE64.encode(vec![0u8; frames * 2])
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.api.api_key = Some("test-key".into());
        config.limits.analysis_delay_ms = 0;
        config
    }

    fn request(text: &str) -> GenerationRequest {
        GenerationRequest {
            text: text.into(),
            style: AnnouncerStyle::Epic,
            gender: AnnouncerGender::Male,
            author: "Ana G.".into(),
        }
    }

    struct Fixture {
        orchestrator: GenerationOrchestrator,
        output: Arc<RecordingOutput>,
        _dir: tempfile::TempDir,
    }

    fn fixture(rewriter: Arc<dyn Rewriter>, synthesizer: Arc<dyn Synthesizer>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config();
        let history = HistoryStore::load_from(&dir.path().join("history.json"), 50);
        let output = Arc::new(RecordingOutput::new());

        let orchestrator = GenerationOrchestrator::new(
            config,
            rewriter,
            synthesizer,
            Arc::clone(&output) as Arc<dyn AudioOutput>,
            history,
        );

        Fixture {
            orchestrator,
            output,
            _dir: dir,
        }
    }

    // -----------------------------------------------------------------------
    // Success path
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn successful_generation_reaches_ready() {
        let mut f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(240)),
        );

        f.orchestrator.generate(request("Hola a todos.")).await.unwrap();

        assert_eq!(f.orchestrator.state(), PipelineState::Ready);
        assert_eq!(f.orchestrator.script(), Some("HOLA A TODOS."));
        let master = f.orchestrator.master_buffer().unwrap();
        assert_eq!(master.frames(), 240);
        assert_eq!(master.sample_rate(), 24_000);
    }

    #[tokio::test]
    async fn success_writes_history_and_autoplays() {
        let mut f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(100)),
        );

        f.orchestrator.generate(request("Bienvenidos.")).await.unwrap();

        let records = f.orchestrator.history().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original_text, "Bienvenidos.");
        assert_eq!(records[0].script, "BIENVENIDOS.");
        assert_eq!(records[0].author, "Ana G.");

        // Auto-play at default volume/rate.
        let plays = f.output.plays.lock().unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0], (100, 1.0, 1.0));
    }

    #[tokio::test]
    async fn segments_are_rewritten_sequentially_in_order() {
        let rewriter = Arc::new(UppercaseRewriter::new());
        let mut f = fixture(
            Arc::clone(&rewriter) as Arc<dyn Rewriter>,
            Arc::new(ScriptedSynthesizer::silence(10)),
        );

        // max_segment_chars small enough to force two segments.
        f.orchestrator.config.limits.max_segment_chars = 15;
        f.orchestrator
            .generate(request("Hello there. How are you?"))
            .await
            .unwrap();

        let calls = rewriter.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["Hello there.", "How are you?"]);
        assert_eq!(f.orchestrator.script(), Some("HELLO THERE. HOW ARE YOU?"));
    }

    #[tokio::test]
    async fn master_buffer_concatenates_segments_in_order() {
        // Two segments with distinguishable payloads.
        let first: Vec<u8> = 1000i16.to_le_bytes().repeat(3);
        let second: Vec<u8> = (-2000i16).to_le_bytes().repeat(2);
        let synth = ScriptedSynthesizer::new(vec![
            Some(BASE64.encode(&first)),
            Some(BASE64.encode(&second)),
        ]);

        let mut f = fixture(Arc::new(UppercaseRewriter::new()), Arc::new(synth));
        f.orchestrator.config.limits.max_segment_chars = 8;

        f.orchestrator.generate(request("Uno. Dos.")).await.unwrap();

        let master = f.orchestrator.master_buffer().unwrap();
        assert_eq!(master.frames(), 5);
        let ch = master.channel(0);
        assert!(ch[..3].iter().all(|&s| s == 1000.0 / 32_768.0));
        assert!(ch[3..].iter().all(|&s| s == -2000.0 / 32_768.0));
    }

    // -----------------------------------------------------------------------
    // Boundary gating
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn empty_input_is_rejected_before_the_machine_starts() {
        let mut f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(10)),
        );

        let err = f.orchestrator.generate(request("   ")).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Validation(ValidationError::Empty)
        ));
        assert_eq!(f.orchestrator.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn over_length_input_is_rejected() {
        let mut f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(10)),
        );

        let long = "a".repeat(401);
        let err = f.orchestrator.generate(request(&long)).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Validation(ValidationError::TooLong { max: 400 })
        ));
    }

    #[tokio::test]
    async fn second_request_within_cooldown_is_rate_limited() {
        let mut f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(10)),
        );

        f.orchestrator.generate(request("Primero.")).await.unwrap();
        let script_before = f.orchestrator.script().map(str::to_string);
        let state_before = f.orchestrator.state();

        let err = f.orchestrator.generate(request("Segundo.")).await.unwrap_err();
        assert!(matches!(err, GenerationError::RateLimit { .. }));

        // The rejected request leaves everything untouched.
        assert_eq!(f.orchestrator.state(), state_before);
        assert_eq!(f.orchestrator.script(), script_before.as_deref());
        assert_eq!(f.orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn missing_credentials_is_a_configuration_error() {
        let mut f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(10)),
        );
        f.orchestrator.config.api.api_key = None;
        // Shield the test from an ambient key.
        std::env::remove_var("GEMINI_API_KEY");

        let err = f.orchestrator.generate(request("Hola.")).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingCredentials));
        assert_eq!(f.orchestrator.state(), PipelineState::Idle);
    }

    // -----------------------------------------------------------------------
    // Partial failure policy
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn null_synthesis_drops_segment_audio_but_keeps_script() {
        // 3 segments; only the middle one produces audio.
        let synth = ScriptedSynthesizer::new(vec![
            None,
            Some(silence_payload(50)),
            None,
        ]);
        let mut f = fixture(Arc::new(UppercaseRewriter::new()), Arc::new(synth));
        f.orchestrator.config.limits.max_segment_chars = 6;

        f.orchestrator.generate(request("Uno. Dos. Tres.")).await.unwrap();

        // Audio built from the surviving segment only.
        assert_eq!(f.orchestrator.master_buffer().unwrap().frames(), 50);
        // Script still contains all three rewritten segments.
        assert_eq!(f.orchestrator.script(), Some("UNO. DOS. TRES."));
        assert_eq!(f.orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_segment_is_dropped_not_fatal() {
        let synth = ScriptedSynthesizer::new(vec![
            Some(BASE64.encode([1u8, 2, 3])), // 3 bytes: misaligned PCM
            Some(silence_payload(20)),
        ]);
        let mut f = fixture(Arc::new(UppercaseRewriter::new()), Arc::new(synth));
        f.orchestrator.config.limits.max_segment_chars = 6;

        f.orchestrator.generate(request("Uno. Dos.")).await.unwrap();
        assert_eq!(f.orchestrator.master_buffer().unwrap().frames(), 20);
    }

    #[tokio::test]
    async fn all_segments_failing_exhausts_synthesis() {
        let synth = ScriptedSynthesizer::new(vec![None, None, None]);
        let mut f = fixture(Arc::new(UppercaseRewriter::new()), Arc::new(synth));
        f.orchestrator.config.limits.max_segment_chars = 6;

        let err = f
            .orchestrator
            .generate(request("Uno. Dos. Tres."))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::SynthesisExhausted));
        assert_eq!(f.orchestrator.state(), PipelineState::Idle);
        assert!(f.orchestrator.master_buffer().is_none());
        assert!(f.orchestrator.script().is_none());
        // No history record on failure.
        assert!(f.orchestrator.history().is_empty());
    }

    #[tokio::test]
    async fn rewrite_failure_aborts_and_returns_to_idle() {
        let mut f = fixture(
            Arc::new(FailingRewriter),
            Arc::new(ScriptedSynthesizer::silence(10)),
        );

        let err = f.orchestrator.generate(request("Hola.")).await.unwrap_err();
        assert!(matches!(err, GenerationError::Rewrite(TtsError::Timeout)));
        assert_eq!(f.orchestrator.state(), PipelineState::Idle);
        assert!(f.orchestrator.script().is_none());
        assert!(f.output.plays.lock().unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn events_trace_the_state_machine_in_order() {
        let (tx, mut rx) = mpsc::channel(64);
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryStore::load_from(&dir.path().join("history.json"), 50);

        // Zero cooldown keeps the tick task from holding the sender open.
        let mut config = test_config();
        config.limits.cooldown_ms = 0;

        let mut orchestrator = GenerationOrchestrator::new(
            config,
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(100)),
            Arc::new(RecordingOutput::new()),
            history,
        )
        .with_events(tx);

        orchestrator.generate(request("Hola.")).await.unwrap();
        drop(orchestrator);

        let mut states = Vec::new();
        let mut saw_script = false;
        let mut saw_ready = false;
        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::StateChanged(s) => states.push(s),
                PipelineEvent::ScriptReady { script } => {
                    assert_eq!(script, "HOLA.");
                    saw_script = true;
                }
                PipelineEvent::Ready { frames, .. } => {
                    assert_eq!(frames, 100);
                    saw_ready = true;
                }
                _ => {}
            }
        }

        assert_eq!(
            states,
            vec![
                PipelineState::Analyzing,
                PipelineState::Rewriting,
                PipelineState::Synthesizing,
                PipelineState::Mastering,
                PipelineState::Ready,
            ]
        );
        assert!(saw_script);
        assert!(saw_ready);
    }

    #[tokio::test]
    async fn failure_emits_a_single_error_event() {
        let (tx, mut rx) = mpsc::channel(64);
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryStore::load_from(&dir.path().join("history.json"), 50);

        let mut orchestrator = GenerationOrchestrator::new(
            test_config(),
            Arc::new(FailingRewriter),
            Arc::new(ScriptedSynthesizer::silence(10)),
            Arc::new(RecordingOutput::new()),
            history,
        )
        .with_events(tx);

        let _ = orchestrator.generate(request("Hola.")).await;
        drop(orchestrator);

        let mut errors = 0;
        while let Some(event) = rx.recv().await {
            if let PipelineEvent::Error { .. } = event {
                errors += 1;
            }
        }
        assert_eq!(errors, 1);
    }

    // -----------------------------------------------------------------------
    // Playback and export
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn replay_clamps_volume_and_rate() {
        let mut f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(30)),
        );
        f.orchestrator.generate(request("Hola.")).await.unwrap();

        f.orchestrator.play(9.0, 0.01);

        let plays = f.output.plays.lock().unwrap();
        // Auto-play plus the explicit replay.
        assert_eq!(plays.len(), 2);
        assert_eq!(plays[1], (30, 2.0, 0.5));
    }

    #[tokio::test]
    async fn export_before_any_generation_fails() {
        let f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(10)),
        );
        let dir = tempfile::tempdir().unwrap();
        assert!(f.orchestrator.export_wav(dir.path()).is_err());
    }

    #[tokio::test]
    async fn export_writes_a_readable_wav() {
        let mut f = fixture(
            Arc::new(UppercaseRewriter::new()),
            Arc::new(ScriptedSynthesizer::silence(120)),
        );
        f.orchestrator.generate(request("Hola.")).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = f.orchestrator.export_wav(dir.path()).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("voz_gala_") && name.ends_with(".wav"));

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 120);
    }
}
