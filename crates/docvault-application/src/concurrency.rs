//! Optimistic concurrency retry policy

use rand::Rng;
use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base backoff delay
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(50);

/// Bounded exponential backoff for `run_atomic`
///
/// Attempt `n` (0-based) that fails with a precondition conflict waits
/// `base_delay × 2^n` before retrying; with `jitter` the wait is drawn
/// uniformly from `0..=` that value. After `max_retries` retries the
/// operation gives up with `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomicRetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff unit
    pub base_delay: Duration,
    /// Full jitter
    pub jitter: bool,
}

impl Default for AtomicRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            jitter: false,
        }
    }
}

impl AtomicRetryPolicy {
    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff unit
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Enable or disable full jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Upper bound of the wait after failed attempt `attempt` (0-based)
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// Wait after failed attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt);
        if !self.jitter || ceiling.is_zero() {
            return ceiling;
        }
        let nanos = u64::try_from(ceiling.as_nanos()).unwrap_or(u64::MAX);
        Duration::from_nanos(rand::rng().random_range(0..=nanos))
    }
}
