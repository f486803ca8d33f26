//! Generation pipeline — state machine, rate limiting, and the orchestrator
//! that ties text preparation, rewrite, synthesis, and mastering together.

pub mod ratelimit;
pub mod runner;
pub mod state;

pub use ratelimit::{RateLimiter, DEFAULT_COOLDOWN};
pub use runner::{GenerationError, GenerationOrchestrator, GenerationRequest, PipelineEvent};
pub use state::PipelineState;
