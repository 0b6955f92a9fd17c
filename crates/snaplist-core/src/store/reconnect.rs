//! Reconnect backoff for network-backed stores

use std::time::Duration;

/// Bounded, increasing delay between reconnect attempts
///
/// The delay doubles after each failed attempt, starting at `initial_delay`
/// and never exceeding `max_delay`. After `max_attempts` failed attempts the
/// operation gives up and the error reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Ceiling for the delay
    pub max_delay: Duration,
    /// Attempts before giving up (at least one is always made)
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Policy that tries exactly once (for tests and one-shot tools)
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempts` failures
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts.max(1)
    }
}
