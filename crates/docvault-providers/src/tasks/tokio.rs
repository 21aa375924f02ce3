//! Tokio Background Task Queue
//!
//! A single worker drains a bounded channel and runs submitted tasks one at
//! a time, each in its own spawned task so a panic is contained and logged.
//! Submission never waits: when the channel is full the task is dropped
//! with a warning.
//!
//! ## Example
//!
//! ```ignore
//! use docvault_providers::tasks::TokioTaskQueue;
//!
//! let queue = TokioTaskQueue::new(1024);
//! queue.submit("search.index", Box::pin(async { Ok(()) }));
//! queue.flush().await?;
//! ```

use crate::constants::TASK_QUEUE_DEFAULT_CAPACITY;
use async_trait::async_trait;
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::infrastructure::{BackgroundTask, TaskQueue};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

enum Job {
    Run {
        name: &'static str,
        task: BackgroundTask,
    },
    Barrier(oneshot::Sender<()>),
    Stop,
}

/// Bounded, sequential background task queue
///
/// Must be created inside a tokio runtime.
#[derive(Clone)]
pub struct TokioTaskQueue {
    sender: mpsc::Sender<Job>,
    closed: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
    capacity: usize,
}

impl TokioTaskQueue {
    /// Create a queue holding at most `capacity` pending tasks
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let worker = tokio::spawn(run_worker(receiver));
        Self {
            sender,
            closed: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicU64::new(0)),
            worker: Arc::new(Mutex::new(Some(worker))),
            capacity,
        }
    }

    /// Create as Arc for sharing
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks dropped because the queue was full or closed
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn drop_task(&self, name: &'static str, reason: &str) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        warn!(task = name, reason, "Background task dropped");
    }
}

impl Default for TokioTaskQueue {
    fn default() -> Self {
        Self::new(TASK_QUEUE_DEFAULT_CAPACITY)
    }
}

async fn run_worker(mut receiver: mpsc::Receiver<Job>) {
    while let Some(job) = receiver.recv().await {
        match job {
            Job::Run { name, task } => match tokio::spawn(task).await {
                Ok(Ok(())) => debug!(task = name, "Background task completed"),
                Ok(Err(e)) => warn!(task = name, error = %e, "Background task failed"),
                Err(e) => error!(task = name, error = %e, "Background task panicked"),
            },
            Job::Barrier(done) => {
                let _ = done.send(());
            }
            Job::Stop => break,
        }
    }
    debug!("Background task worker stopped");
}

#[async_trait]
impl TaskQueue for TokioTaskQueue {
    fn submit(&self, name: &'static str, task: BackgroundTask) {
        if self.closed.load(Ordering::SeqCst) {
            self.drop_task(name, "queue shut down");
            return;
        }
        match self.sender.try_send(Job::Run { name, task }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => self.drop_task(name, "queue full"),
            Err(mpsc::error::TrySendError::Closed(_)) => self.drop_task(name, "worker stopped"),
        }
    }

    async fn flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Job::Barrier(done)).await.is_err() {
            // Worker gone: nothing left to wait for.
            return Ok(());
        }
        wait.await
            .map_err(|_| Error::internal("Background task worker stopped during flush"))
    }

    async fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let _ = self.sender.send(Job::Stop).await;
        if let Some(worker) = self.worker.lock().await.take() {
            worker
                .await
                .map_err(|e| Error::internal(format!("Background task worker failed: {e}")))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokioTaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioTaskQueue")
            .field("capacity", &self.capacity)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .field("dropped", &self.dropped_count())
            .finish()
    }
}
