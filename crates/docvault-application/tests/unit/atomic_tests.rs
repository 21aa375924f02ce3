//! run_atomic retries and the transactional outbox

use crate::support::{Task, harness, task};
use async_trait::async_trait;
use docvault_application::{AtomicRetryPolicy, Repository, RepositoryOptions, RepositoryServices};
use docvault_domain::error::{Error, ErrorKind, Result};
use docvault_domain::ports::providers::{DocumentStream, Transaction};
use docvault_domain::ports::DocumentStore;
use docvault_domain::value_objects::{
    AggregateResult, Aggregation, DocumentSnapshot, Query, WriteOp,
};
use docvault_providers::{InMemoryDocumentStore, ManualClock, TokioTaskQueue};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Store that rejects the next `conflicts` conditional updates
#[derive(Debug, Default)]
struct ContendedStore {
    inner: InMemoryDocumentStore,
    conflicts: AtomicU32,
}

#[async_trait]
impl DocumentStore for ContendedStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<DocumentSnapshot>> {
        self.inner.get(collection, id).await
    }

    async fn get_all(&self, collection: &str, ids: &[String]) -> Result<Vec<Option<DocumentSnapshot>>> {
        self.inner.get_all(collection, ids).await
    }

    async fn write(&self, op: WriteOp) -> Result<()> {
        if let WriteOp::Update { preconditions, .. } = &op
            && !preconditions.is_empty()
            && self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(Error::failed_precondition("simulated concurrent write"));
        }
        self.inner.write(op).await
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        self.inner.batch_write(ops).await
    }

    fn max_batch_size(&self) -> usize {
        self.inner.max_batch_size()
    }

    async fn query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>> {
        self.inner.query(query).await
    }

    async fn aggregate(&self, query: &Query, aggregations: &[Aggregation]) -> Result<AggregateResult> {
        self.inner.aggregate(query, aggregations).await
    }

    fn stream(&self, query: Query) -> DocumentStream {
        self.inner.stream(query)
    }

    async fn recursive_delete(&self, collection: &str, id: &str) -> Result<u64> {
        self.inner.recursive_delete(collection, id).await
    }

    async fn begin_transaction(&self) -> Result<Arc<dyn Transaction>> {
        self.inner.begin_transaction().await
    }

    fn provider_name(&self) -> &str {
        "contended"
    }
}

fn contended_repo(conflicts: u32) -> Repository<Task> {
    let store = Arc::new(ContendedStore {
        inner: InMemoryDocumentStore::new(),
        conflicts: AtomicU32::new(conflicts),
    });
    let services = RepositoryServices::new(
        store,
        TokioTaskQueue::new_shared(),
        Arc::new(ManualClock::new(crate::support::epoch())),
    );
    Repository::new(
        services,
        RepositoryOptions::default()
            .with_retry_policy(AtomicRetryPolicy::default().with_base_delay(Duration::ZERO)),
    )
    .unwrap()
}

fn bump(record: &docvault_domain::Record<Task>) -> Result<serde_json::Value> {
    Ok(json!({"priority": record.data.priority + 1}))
}

#[tokio::test]
async fn test_run_atomic_applies_mutation() {
    let repo = contended_repo(0);
    repo.create(Some("t1"), &task("counter")).await.unwrap();
    let updated = repo.run_atomic("t1", bump, None).await.unwrap();
    assert_eq!(updated.data.priority, 1);
}

#[tokio::test]
async fn test_run_atomic_retries_conflicts() {
    let repo = contended_repo(2);
    repo.create(Some("t1"), &task("counter")).await.unwrap();
    let updated = repo.run_atomic("t1", bump, None).await.unwrap();
    assert_eq!(updated.data.priority, 1);
}

#[tokio::test]
async fn test_run_atomic_gives_up_with_aborted() {
    let repo = contended_repo(10);
    repo.create(Some("t1"), &task("counter")).await.unwrap();
    let err = repo.run_atomic("t1", bump, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);

    let err = repo
        .run_atomic("t1", bump, Some(AtomicRetryPolicy::no_retry()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);
}

#[tokio::test]
async fn test_run_atomic_propagates_mutation_errors() {
    let repo = contended_repo(0);
    repo.create(Some("t1"), &task("counter")).await.unwrap();
    let err = repo
        .run_atomic("t1", |_| Err(Error::invalid_argument("nope")), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_outbox_commits_with_transaction() {
    let h = harness();
    let repo: Repository<Task> = Repository::new(h.services.clone(), RepositoryOptions::default()).unwrap();
    let tx = repo.begin_transaction().await.unwrap();
    let bound = repo.for_tenant("acme").with_transaction(tx.clone());

    bound.create(Some("t1"), &task("with event")).await.unwrap();
    let event_id = bound
        .queue_event("task.created", json!({"id": "t1"}))
        .await
        .unwrap();
    assert_eq!(h.store.document_count("_outbox").await, 0);

    tx.commit().await.unwrap();
    assert!(h.store.raw("tasks", "t1").await.is_some());
    let event = h.store.raw("_outbox", &event_id).await.unwrap();
    assert_eq!(event["status"], json!("PENDING"));
    assert_eq!(event["tenantId"], json!("acme"));
}

#[tokio::test]
async fn test_outbox_rolls_back_with_transaction() {
    let h = harness();
    let repo: Repository<Task> = Repository::new(h.services.clone(), RepositoryOptions::default()).unwrap();
    let tx = repo.begin_transaction().await.unwrap();
    let bound = repo.with_transaction(tx.clone());

    bound.create(Some("t1"), &task("discarded")).await.unwrap();
    bound.queue_event("task.created", json!({})).await.unwrap();
    tx.rollback().await.unwrap();

    assert!(h.store.raw("tasks", "t1").await.is_none());
    assert_eq!(h.store.document_count("_outbox").await, 0);
}

#[tokio::test]
async fn test_transaction_guards() {
    let h = harness();
    let repo: Repository<Task> = Repository::new(h.services.clone(), RepositoryOptions::default()).unwrap();
    let err = repo.queue_event("x", json!({})).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);

    let bound = repo.with_transaction(repo.begin_transaction().await.unwrap());
    assert!(bound.in_transaction());
    assert!(!repo.in_transaction());
    let err = bound.run_atomic("t1", bump, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
}
