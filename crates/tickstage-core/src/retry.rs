//! Fixed-delay retry policy for the conversion precondition.

use std::time::Duration;

/// Bounded fixed-delay retry policy.
///
/// `max_attempts` counts attempts, not retries; waits happen between
/// attempts only, so a run that fails every attempt waits
/// `max_attempts - 1` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Whether a 1-based attempt number is the last one allowed.
    pub fn is_final(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts.max(1)
    }
}
