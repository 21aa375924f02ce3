//! Background Task Queue Implementations

pub mod tokio;

pub use self::tokio::TokioTaskQueue;
