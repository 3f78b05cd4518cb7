//! Retry policy for etablissement detail lookups.

use std::time::Duration;

/// Bounded-attempt policy with a fixed inter-attempt delay and a
/// per-attempt deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never zero.
    pub max_attempts: u32,
    /// Fixed delay between failed attempts; not applied after the final one.
    pub retry_delay: Duration,
    /// Deadline for a single attempt. An elapsed deadline cancels the
    /// in-flight request and counts as a failed attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(3_000),
            attempt_timeout: Duration::from_millis(4_000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, retry_delay: Duration, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
            attempt_timeout,
        }
    }

    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn attempt_timeout_ms(&self) -> u64 {
        self.attempt_timeout.as_millis() as u64
    }
}
