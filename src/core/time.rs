//! Monotonic time source for phase timing
//!
//! Backed by `Instant`, so wall-clock adjustments never move it backwards.

use std::time::Instant;

/// Monotonic clock returning seconds since its own origin
#[derive(Debug, Clone, Copy)]
pub struct TimeSource {
    origin: Instant,
}

impl Default for TimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds elapsed since the origin. Non-decreasing across calls.
    #[inline(always)]
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}
