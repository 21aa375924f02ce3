//! Store round trips reported to the metrics sink

use crate::support::{Harness, RecordingMetrics, Task, harness, task};
use chrono::Duration;
use docvault_application::{GetOptions, ListOptions, Repository, RepositoryOptions, UpdateOptions};
use docvault_domain::value_objects::MetricOperation;
use serde_json::json;
use std::sync::Arc;

fn metered(h: &Harness) -> (Repository<Task>, Arc<RecordingMetrics>) {
    let metrics = Arc::new(RecordingMetrics::default());
    let services = h.services.clone().with_metrics(metrics.clone());
    let repo = Repository::new(services, RepositoryOptions::default()).unwrap();
    (repo.for_tenant("acme"), metrics)
}

fn has(calls: &[(MetricOperation, u64, Option<String>)], op: MetricOperation, count: u64) -> bool {
    calls.iter().any(|(o, c, _)| *o == op && *c == count)
}

#[tokio::test]
async fn test_reads_and_writes_are_metered_with_tenant() {
    let h = harness();
    let (repo, metrics) = metered(&h);

    repo.create(Some("a"), &task("first")).await.unwrap();
    repo.create(Some("b"), &task("second")).await.unwrap();
    let calls = metrics.take();
    assert!(calls.iter().any(|(op, _, _)| *op == MetricOperation::Write));

    repo.get("a", &GetOptions::default()).await.unwrap();
    assert_eq!(
        metrics.take(),
        vec![(MetricOperation::Read, 1, Some("acme".to_string()))]
    );

    repo.list(&ListOptions::default()).await.unwrap();
    assert!(has(&metrics.take(), MetricOperation::Read, 2));

    repo.update("a", json!({"priority": 4}), &UpdateOptions::default())
        .await
        .unwrap();
    let calls = metrics.take();
    assert!(calls.iter().any(|(op, _, _)| *op == MetricOperation::Write));
    assert!(calls.iter().all(|(_, _, tenant)| tenant.as_deref() == Some("acme")));
}

#[tokio::test]
async fn test_purge_meters_scan_and_deletes() {
    let h = harness();
    let (repo, metrics) = metered(&h);
    for id in ["old1", "old2", "alive"] {
        repo.create(Some(id), &task(id)).await.unwrap();
    }
    repo.soft_delete("old1").await.unwrap();
    repo.soft_delete("old2").await.unwrap();
    h.clock.advance(Duration::days(10));
    metrics.take();

    assert_eq!(repo.purge_deleted(7).await.unwrap(), 2);
    let calls = metrics.take();
    assert!(has(&calls, MetricOperation::Read, 2));
    assert!(has(&calls, MetricOperation::Delete, 2));
    assert!(calls.iter().all(|(_, _, tenant)| tenant.as_deref() == Some("acme")));

    assert_eq!(repo.purge_deleted(7).await.unwrap(), 0);
    assert_eq!(
        metrics.take(),
        vec![(MetricOperation::Read, 0, Some("acme".to_string()))]
    );
}
