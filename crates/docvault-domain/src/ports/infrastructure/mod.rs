//! Infrastructure service ports

/// Timestamp source
pub mod clock;
/// Background task queue
pub mod tasks;

pub use clock::Clock;
pub use tasks::{BackgroundTask, TaskQueue};
