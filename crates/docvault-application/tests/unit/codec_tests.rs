//! At-rest encoding and lazy migration

use crate::support::{Task, doc, harness, task};
use docvault_application::codec::COMPRESSED_PREFIX;
use docvault_application::{
    GetOptions, MigrationRegistry, Repository, RepositoryOptions, RepositoryServices,
    UpdateOptions,
};
use docvault_domain::error::Error;
use docvault_domain::ports::TaskQueue;
use docvault_domain::value_objects::FieldPath;
use docvault_providers::{InMemoryDocumentStore, ManualClock, TokioTaskQueue};
use serde_json::{Value, json};
use std::sync::Arc;

fn sensitive_options() -> RepositoryOptions {
    RepositoryOptions::default().encrypt_field(FieldPath::top_level("ssn"))
}

fn migrations() -> MigrationRegistry {
    MigrationRegistry::new()
        .register(1, |mut d| {
            if let Some(name) = d.remove("name") {
                d.insert("title".into(), name);
            }
            Ok(d)
        })
        .register(2, |mut d| {
            d.entry("priority").or_insert(json!(5));
            Ok(d)
        })
}

#[tokio::test]
async fn test_encrypted_field_round_trip() {
    let h = harness();
    let repo: Repository<Task> = Repository::new(h.services.clone(), sensitive_options()).unwrap();
    let mut secret = task("payroll");
    secret.ssn = Some("123-45-6789".into());

    let created = repo.create(Some("t1"), &secret).await.unwrap();
    assert_eq!(created.data.ssn.as_deref(), Some("123-45-6789"));

    let raw = h.store.raw("tasks", "t1").await.unwrap();
    let stored = raw["ssn"].as_str().unwrap();
    assert_ne!(stored, "123-45-6789");
    assert!(stored.contains(':'));
    assert_eq!(raw["title"], json!("payroll"));

    let fetched = repo.get("t1", &GetOptions::default()).await.unwrap();
    assert_eq!(fetched.data, secret);
}

#[tokio::test]
async fn test_update_reencrypts_changed_field() {
    let h = harness();
    let repo: Repository<Task> = Repository::new(h.services.clone(), sensitive_options()).unwrap();
    repo.create(Some("t1"), &task("payroll")).await.unwrap();

    let updated = repo
        .update("t1", json!({"ssn": "987-65-4321"}), &UpdateOptions::default())
        .await
        .unwrap();
    assert_eq!(updated.data.ssn.as_deref(), Some("987-65-4321"));

    let raw = h.store.raw("tasks", "t1").await.unwrap();
    assert_ne!(raw["ssn"], json!("987-65-4321"));
    let fetched = repo.get("t1", &GetOptions::default()).await.unwrap();
    assert_eq!(fetched.data.ssn.as_deref(), Some("987-65-4321"));
}

#[tokio::test]
async fn test_encryption_without_crypto_is_configuration_error() {
    let h = harness();
    let services = RepositoryServices::new(h.store.clone(), h.tasks.clone(), h.clock.clone());
    let err = Repository::<Task>::new(services, sensitive_options()).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_compression_threshold() {
    let h = harness();
    let options = RepositoryOptions::default()
        .compress_field(FieldPath::top_level("notes"))
        .with_compression_min_length(16);
    let repo: Repository<Task> = Repository::new(h.services.clone(), options).unwrap();

    let mut long = task("long");
    long.notes = Some("a".repeat(200));
    let mut short = task("short");
    short.notes = Some("brief".into());
    repo.create(Some("long"), &long).await.unwrap();
    repo.create(Some("short"), &short).await.unwrap();

    let raw_long = h.store.raw("tasks", "long").await.unwrap();
    assert!(raw_long["notes"].as_str().unwrap().starts_with(COMPRESSED_PREFIX));
    let raw_short = h.store.raw("tasks", "short").await.unwrap();
    assert_eq!(raw_short["notes"], json!("brief"));

    let fetched = repo.get("long", &GetOptions::default()).await.unwrap();
    assert_eq!(fetched.data.notes, long.notes);
}

#[tokio::test]
async fn test_legacy_document_is_migrated_and_repaired() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let tasks = TokioTaskQueue::new_shared();
    let clock = Arc::new(ManualClock::new(crate::support::epoch()));
    let services = RepositoryServices::new(store.clone(), tasks.clone(), clock);
    let repo: Repository<Task> =
        Repository::new(services, RepositoryOptions::default().with_migrations(3, migrations())).unwrap();

    store
        .put_raw(
            "tasks",
            "legacy",
            doc(json!({
                "name": "old shape",
                "createdAt": "2025-01-01T00:00:00.000000Z",
                "updatedAt": "2025-01-01T00:00:00.000000Z",
                "deletedAt": null
            })),
        )
        .await;

    let record = repo.get("legacy", &GetOptions::default()).await.unwrap();
    assert_eq!(record.data.title, "old shape");
    assert_eq!(record.data.priority, 5);
    assert_eq!(record.schema_version, 3);

    tasks.flush().await.unwrap();
    let raw = store.raw("tasks", "legacy").await.unwrap();
    assert_eq!(raw["_v"], json!(3));
    assert_eq!(raw["title"], json!("old shape"));
    assert!(raw.get("name").is_none());
    assert_eq!(raw["updatedAt"], json!("2025-01-01T00:00:00.000000Z"));

    let again = repo.get("legacy", &GetOptions::default()).await.unwrap();
    assert_eq!(again.data, record.data);
    tasks.flush().await.unwrap();
    assert_eq!(store.raw("tasks", "legacy").await.unwrap()["_v"], json!(3));
}

#[tokio::test]
async fn test_update_of_legacy_document_writes_current_shape() {
    let h = harness();
    let repo: Repository<Task> =
        Repository::new(h.services.clone(), RepositoryOptions::default().with_migrations(3, migrations()))
            .unwrap();
    h.store
        .put_raw(
            "tasks",
            "legacy",
            doc(json!({
                "name": "old shape",
                "createdAt": "2025-01-01T00:00:00.000000Z",
                "updatedAt": "2025-01-01T00:00:00.000000Z",
                "deletedAt": null
            })),
        )
        .await;

    repo.update("legacy", json!({"priority": 9}), &UpdateOptions::default())
        .await
        .unwrap();
    let raw = h.store.raw("tasks", "legacy").await.unwrap();
    assert_eq!(raw["_v"], json!(3));
    assert_eq!(raw["title"], json!("old shape"));
    assert_eq!(raw["priority"], json!(9));
    assert_ne!(raw["updatedAt"], Value::from("2025-01-01T00:00:00.000000Z"));
}
