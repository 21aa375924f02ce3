//! Deletes, restores and purges

use crate::support::{Comment, Harness, Task, harness, task};
use chrono::Duration;
use docvault_application::{Repository, RepositoryOptions, UpdateOptions};
use docvault_domain::error::ErrorKind;
use docvault_domain::value_objects::VersionMode;
use serde_json::json;

fn repo(h: &Harness, options: RepositoryOptions) -> Repository<Task> {
    Repository::new(h.services.clone(), options).unwrap()
}

#[tokio::test]
async fn test_soft_delete_disabled_degrades_to_force_delete() {
    let h = harness();
    let repo = repo(&h, RepositoryOptions::default().with_soft_delete(false));
    repo.create(Some("t1"), &task("gone")).await.unwrap();

    repo.soft_delete("t1").await.unwrap();
    assert!(h.store.raw("tasks", "t1").await.is_none());

    let err = repo.restore("t1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
}

#[tokio::test]
async fn test_force_delete_removes_document() {
    let h = harness();
    let repo = repo(&h, RepositoryOptions::default());
    repo.create(Some("t1"), &task("gone")).await.unwrap();
    repo.force_delete("t1").await.unwrap();
    assert!(h.store.raw("tasks", "t1").await.is_none());
    assert_eq!(repo.force_delete("t1").await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_force_delete_respects_tenancy() {
    let h = harness();
    let repo = repo(&h, RepositoryOptions::default());
    repo.for_tenant("acme").create(Some("t1"), &task("mine")).await.unwrap();
    let err = repo.for_tenant("globex").force_delete("t1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(h.store.raw("tasks", "t1").await.is_some());
}

#[tokio::test]
async fn test_recursive_delete_removes_nested_collections() {
    let h = harness();
    let repo = repo(&h, RepositoryOptions::default().with_versioning(VersionMode::Full));
    repo.create(Some("t1"), &task("parent")).await.unwrap();
    repo.update("t1", json!({"priority": 1}), &UpdateOptions::default())
        .await
        .unwrap();
    let comments = repo
        .sub_collection::<Comment>("t1", "comments", RepositoryOptions::default())
        .unwrap();
    for body in ["a", "b"] {
        comments.create(None, &Comment { body: body.into() }).await.unwrap();
    }

    let removed = repo.recursive_delete("t1").await.unwrap();
    assert_eq!(removed, 4);
    assert!(h.store.raw("tasks", "t1").await.is_none());
    assert_eq!(h.store.document_count("tasks/t1/comments").await, 0);
    assert_eq!(h.store.document_count("tasks/t1/_versions").await, 0);

    let err = repo.recursive_delete("t1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_purge_deleted_honors_cutoff_and_tenant() {
    let h = harness();
    let repo = repo(&h, RepositoryOptions::default());
    let acme = repo.for_tenant("acme");
    for id in ["old", "recent", "alive"] {
        acme.create(Some(id), &task(id)).await.unwrap();
    }
    repo.for_tenant("globex").create(Some("other"), &task("other")).await.unwrap();

    acme.soft_delete("old").await.unwrap();
    repo.for_tenant("globex").soft_delete("other").await.unwrap();
    h.clock.advance(Duration::days(10));
    acme.soft_delete("recent").await.unwrap();

    let purged = acme.purge_deleted(7).await.unwrap();
    assert_eq!(purged, 1);
    assert!(h.store.raw("tasks", "old").await.is_none());
    assert!(h.store.raw("tasks", "recent").await.is_some());
    assert!(h.store.raw("tasks", "alive").await.is_some());
    assert!(h.store.raw("tasks", "other").await.is_some());
}

#[tokio::test]
async fn test_purge_versions() {
    let h = harness();
    let repo = repo(&h, RepositoryOptions::default().with_versioning(VersionMode::Diff));
    repo.create(Some("t1"), &task("v")).await.unwrap();
    for priority in 1..=3 {
        repo.update("t1", json!({"priority": priority}), &UpdateOptions::default())
            .await
            .unwrap();
    }
    assert_eq!(repo.list_versions("t1").await.unwrap().len(), 3);
    assert_eq!(repo.purge_versions("t1").await.unwrap(), 3);
    assert!(repo.list_versions("t1").await.unwrap().is_empty());
    assert!(h.store.raw("tasks", "t1").await.is_some());
}
