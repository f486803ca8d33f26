//! Request rate limiting — a minimum interval between generation starts.
//!
//! The limiter holds one monotonic last-request timestamp. A request is
//! accepted only when `now - last_request ≥ cooldown`, and the timestamp
//! updates at acceptance time (not at completion), so a slow generation does
//! not extend the window. The limiter is owned and injected explicitly, not
//! module-global state.

use std::time::{Duration, Instant};

/// Default minimum interval between requests.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(5_000);

// ---------------------------------------------------------------------------
// RateLimiter
// ---------------------------------------------------------------------------

/// Gate on the *start* of generation requests.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cooldown: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// A limiter with the given cooldown window that accepts the first
    /// request immediately.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_request: None,
        }
    }

    /// The configured cooldown window.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Try to accept a request now.
    ///
    /// On acceptance the internal timestamp advances immediately. On
    /// rejection returns the time remaining until the next request would be
    /// accepted.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        self.try_acquire_at(Instant::now())
    }

    /// [`try_acquire`](Self::try_acquire) with an explicit clock reading,
    /// for deterministic testing of the cooldown boundary.
    pub fn try_acquire_at(&mut self, now: Instant) -> Result<(), Duration> {
        if let Some(last) = self.last_request {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
        }
        self.last_request = Some(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
