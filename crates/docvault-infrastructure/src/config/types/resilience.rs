//! Resilience configuration types

use crate::constants::{
    ATOMIC_RETRY_ATTEMPTS, ATOMIC_RETRY_BASE_DELAY_MS, CIRCUIT_BREAKER_FAILURE_THRESHOLD,
    CIRCUIT_BREAKER_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

/// Cache breakers and the `run_atomic` retry loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Cache failures in a row that open a breaker
    pub circuit_breaker_failure_threshold: u32,

    /// Seconds an open breaker waits before probing
    pub circuit_breaker_timeout_secs: u64,

    /// Retries of an atomic read-modify-write after the first attempt
    pub retry_attempts: u32,

    /// Base backoff delay in milliseconds, doubled per attempt
    pub retry_base_delay_ms: u64,

    /// Randomize each backoff delay below its ceiling
    pub retry_jitter: bool,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            circuit_breaker_failure_threshold: CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            circuit_breaker_timeout_secs: CIRCUIT_BREAKER_TIMEOUT_SECS,
            retry_attempts: ATOMIC_RETRY_ATTEMPTS,
            retry_base_delay_ms: ATOMIC_RETRY_BASE_DELAY_MS,
            retry_jitter: false,
        }
    }
}
