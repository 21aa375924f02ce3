//! Background Task Queue Port
//!
//! Best-effort side effects (search sync, read-repair) are submitted here
//! instead of being awaited by the request. The queue owns the task, logs its
//! failure, and never reports back to the submitter.

use crate::error::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// A best-effort unit of background work
pub type BackgroundTask = BoxFuture<'static, Result<()>>;

/// Background task queue port
#[async_trait]
pub trait TaskQueue: Send + Sync + std::fmt::Debug {
    /// Submit a task; never blocks and never fails the caller
    ///
    /// `name` identifies the task in logs (e.g. `search.index`).
    fn submit(&self, name: &'static str, task: BackgroundTask);

    /// Wait until every task submitted before this call has finished
    async fn flush(&self) -> Result<()>;

    /// Stop accepting tasks and wait for queued ones to finish
    async fn shutdown(&self) -> Result<()>;
}
