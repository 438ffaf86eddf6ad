//! Reconnect scheduling policy.

use std::time::{Duration, Instant};

/// Fixed-delay reconnect policy.
///
/// A close schedules one reconnect attempt after the configured delay.
/// Retries continue forever; there is no backoff growth and no attempt
/// ceiling, which is acceptable for a console watching a handful of
/// devices. The policy only computes instants, so reconnect behavior can
/// be driven in tests with synthetic times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
}

impl ReconnectPolicy {
    /// Reconnect after a fixed delay.
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    /// The configured delay between a close and the next attempt.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// When the next attempt is due, given the close was observed at `now`.
    pub fn next_attempt(&self, now: Instant) -> Instant {
        now + self.delay
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_millis(800))
    }
}
