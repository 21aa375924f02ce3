//! Circuit breakers guarding best-effort dependencies
//!
//! A [`BreakerRegistry`] is owned by `RepositoryServices` and shared by every
//! repository built from them, so all repositories see the same breaker
//! state for a given operation name (e.g. `cache.get`).

use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Consecutive failures that open a breaker
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Time an open breaker waits before letting a trial call through
pub const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Externally visible breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    Closed,
    /// Calls are skipped until the recovery timeout passes
    Open,
    /// A single trial call decides between closing and reopening
    HalfOpen,
}

impl fmt::Display for CircuitBreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        })
    }
}

/// Thresholds shared by every breaker of a registry
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            recovery_timeout: DEFAULT_RECOVERY_TIMEOUT,
        }
    }
}

impl CircuitBreakerConfig {
    /// Failures in a row that open the breaker, at least one
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }
}

/// State machine behind the lock
#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: u32 },
    Open { since: Instant },
    /// A trial call admitted at `since` is in flight
    HalfOpen { since: Instant },
}

impl Phase {
    fn state(self) -> CircuitBreakerState {
        match self {
            Self::Closed { .. } => CircuitBreakerState::Closed,
            Self::Open { .. } => CircuitBreakerState::Open,
            Self::HalfOpen { .. } => CircuitBreakerState::HalfOpen,
        }
    }
}

/// In-process circuit breaker for one named operation
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    phase: Mutex<Phase>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitBreakerState {
        self.lock().state()
    }

    /// Whether a call may proceed
    ///
    /// An open breaker past its recovery timeout moves to half-open and
    /// admits one trial call. A trial call that has not reported back within the
    /// recovery timeout (its caller was cancelled) is replaced by a new one.
    pub fn is_call_permitted(&self) -> bool {
        let mut phase = self.lock();
        let current = *phase;
        let timeout = self.config.recovery_timeout;
        match current {
            Phase::Closed { .. } => true,
            Phase::Open { since } if since.elapsed() >= timeout => {
                self.enter(&mut phase, Phase::HalfOpen { since: Instant::now() });
                true
            }
            Phase::HalfOpen { since } if since.elapsed() >= timeout => {
                tracing::debug!(circuit_breaker = %self.name, "Replacing unfinished trial call");
                *phase = Phase::HalfOpen { since: Instant::now() };
                true
            }
            Phase::Open { .. } | Phase::HalfOpen { .. } => false,
        }
    }

    pub fn record_success(&self) {
        let mut phase = self.lock();
        let current = *phase;
        match current {
            Phase::Closed { .. } => *phase = Phase::Closed { failures: 0 },
            Phase::HalfOpen { .. } => self.enter(&mut phase, Phase::Closed { failures: 0 }),
            Phase::Open { .. } => {}
        }
    }

    pub fn record_failure(&self) {
        let mut phase = self.lock();
        let current = *phase;
        match current {
            Phase::Closed { failures } if failures + 1 >= self.config.failure_threshold => {
                self.enter(&mut phase, Phase::Open { since: Instant::now() });
            }
            Phase::Closed { failures } => *phase = Phase::Closed { failures: failures + 1 },
            Phase::HalfOpen { .. } => self.enter(&mut phase, Phase::Open { since: Instant::now() }),
            Phase::Open { .. } => {}
        }
    }

    fn enter(&self, phase: &mut Phase, next: Phase) {
        tracing::info!(
            circuit_breaker = %self.name,
            from = %phase.state(),
            to = %next.state(),
            "Circuit breaker state transition"
        );
        *phase = next;
    }

    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("phase", &*self.lock())
            .finish()
    }
}

/// Named circuit breakers created on first use
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: DashMap::new(),
        }
    }

    /// Breaker for an operation, created closed on first request
    pub fn breaker(&self, name: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(name) {
            return Arc::clone(&existing);
        }
        Arc::clone(
            &self
                .breakers
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(CircuitBreaker::new(name, self.config))),
        )
    }

    /// State of every breaker created so far, sorted by name
    pub fn states(&self) -> Vec<(String, CircuitBreakerState)> {
        let mut states: Vec<_> = self
            .breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.state()))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }
}
