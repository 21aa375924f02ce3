//! Clock Implementations
//!
//! Both clocks hand out strictly increasing instants: when the underlying
//! time has not moved since the last call, the previous value plus one
//! microsecond is returned instead.

use chrono::{DateTime, Duration, DurationRound, Utc};
use docvault_domain::ports::infrastructure::Clock;
use std::sync::Mutex;

fn truncate(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(Duration::microseconds(1)).unwrap_or(ts)
}

fn advance(last: &Mutex<Option<DateTime<Utc>>>, candidate: DateTime<Utc>) -> DateTime<Utc> {
    let candidate = truncate(candidate);
    let Ok(mut last) = last.lock() else {
        return candidate;
    };
    let next = match *last {
        Some(previous) if candidate <= previous => previous + Duration::microseconds(1),
        _ => candidate,
    };
    *last = Some(next);
    next
}

/// Wall clock
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl SystemClock {
    /// Create a system clock
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        advance(&self.last, Utc::now())
    }
}

/// Manually driven clock for tests
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl ManualClock {
    /// Start the clock at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(truncate(start)),
            last: Mutex::new(None),
        }
    }

    /// Jump to an absolute time (later calls still never go backwards)
    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut current) = self.current.lock() {
            *current = truncate(to);
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.current.lock() {
            *current += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let current = self.current.lock().map_or_else(|_| Utc::now(), |c| *c);
        advance(&self.last, current)
    }
}
