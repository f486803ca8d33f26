//! Generation pipeline state machine.
//!
//! [`PipelineState`] tracks where one in-flight request is. Transitions are
//! strictly linear with no backward edges:
//!
//! ```text
//! Idle ──▶ Analyzing ──▶ Rewriting ──▶ Synthesizing ──▶ Mastering ──▶ Ready
//! any state ──failure──▶ Idle
//! ```
//!
//! A new request while non-idle is gated by the cooldown, never by
//! interrupting an in-flight generation.

/// States of one generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No request in flight; the previous master buffer (if any) stays
    /// available for playback and export.
    Idle,

    /// Request accepted; UX-facing delay state, no computation.
    Analyzing,

    /// Segments are being rewritten sequentially by the rewrite collaborator.
    Rewriting,

    /// Rewritten segments are being synthesized and decoded, one at a time.
    Synthesizing,

    /// Per-segment buffers are being concatenated into the master buffer.
    Mastering,

    /// Master buffer published; playback started and cooldown running.
    Ready,
}

impl PipelineState {
    /// Returns `true` while a request is actively being processed.
    ///
    /// ```
    /// use voz_gala::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Analyzing.is_busy());
    /// assert!(PipelineState::Rewriting.is_busy());
    /// assert!(PipelineState::Synthesizing.is_busy());
    /// assert!(PipelineState::Mastering.is_busy());
    /// assert!(!PipelineState::Ready.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Analyzing
                | PipelineState::Rewriting
                | PipelineState::Synthesizing
                | PipelineState::Mastering
        )
    }

    /// A short human-readable label suitable for progress display.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Analyzing => "Analyzing",
            PipelineState::Rewriting => "Rewriting",
            PipelineState::Synthesizing => "Synthesizing",
            PipelineState::Mastering => "Mastering",
            PipelineState::Ready => "Ready",
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        PipelineState::Idle
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
