//! Clock Port

use chrono::{DateTime, Utc};

/// Source of write timestamps
///
/// Implementations must return strictly increasing values within a process,
/// so `updatedAt` advances on every write even within the same microsecond.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}
