//! Tests for the tokio background task queue

use docvault_domain::Error;
use docvault_domain::ports::infrastructure::TaskQueue;
use docvault_providers::tasks::TokioTaskQueue;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

async fn explode() -> docvault_domain::Result<()> {
    panic!("boom")
}

#[tokio::test]
async fn test_flush_waits_for_submitted_tasks() {
    let queue = TokioTaskQueue::new(16);
    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        let counter = Arc::clone(&counter);
        queue.submit(
            "count",
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
    }
    queue.flush().await.expect("flush");
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_failing_and_panicking_tasks_do_not_stop_worker() {
    let queue = TokioTaskQueue::new(16);
    let counter = Arc::new(AtomicUsize::new(0));

    queue.submit("fails", Box::pin(async { Err(Error::internal("boom")) }));
    queue.submit("panics", Box::pin(explode()));
    let after = Arc::clone(&counter);
    queue.submit(
        "after",
        Box::pin(async move {
            after.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    queue.flush().await.expect("flush");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_full_queue_drops_tasks() {
    let queue = TokioTaskQueue::new(1);
    let (release, gate) = tokio::sync::oneshot::channel::<()>();
    queue.submit(
        "blocker",
        Box::pin(async move {
            let _ = gate.await;
            Ok(())
        }),
    );
    tokio::task::yield_now().await;
    for _ in 0..4 {
        queue.submit("extra", Box::pin(async { Ok(()) }));
    }
    assert!(queue.dropped_count() >= 2);

    let _ = release.send(());
    queue.flush().await.expect("flush");
}

#[tokio::test]
async fn test_shutdown_rejects_new_tasks() {
    let queue = TokioTaskQueue::new(4);
    queue.shutdown().await.expect("shutdown");
    queue.submit("late", Box::pin(async { Ok(()) }));
    assert_eq!(queue.dropped_count(), 1);
}
