//! Cache read-through, invalidation and fail-open behavior

use crate::support::{FailingCache, Harness, StalledCache, Task, harness, task};
use docvault_application::cache::BREAKER_CACHE_GET;
use docvault_application::{
    BreakerRegistry, CacheSettings, CircuitBreakerConfig, CircuitBreakerState, GetOptions,
    Repository, RepositoryOptions, UpdateOptions,
};
use docvault_domain::error::{Error, ErrorKind};
use docvault_domain::ports::providers::CacheProvider;
use docvault_domain::value_objects::FieldPath;
use docvault_providers::cache::MokaCacheProvider;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn cached_repo(h: &Harness, provider: Arc<dyn CacheProvider>, settings: CacheSettings) -> Repository<Task> {
    let services = h.services.clone().with_cache(provider, settings);
    Repository::new(services, RepositoryOptions::default()).unwrap()
}

#[tokio::test]
async fn test_reads_are_served_from_cache() {
    let h = harness();
    let repo = cached_repo(&h, Arc::new(MokaCacheProvider::new()), CacheSettings::default());
    repo.create(Some("t1"), &task("cached")).await.unwrap();
    repo.get("t1", &GetOptions::default()).await.unwrap();

    let mut raw = h.store.raw("tasks", "t1").await.unwrap();
    raw.insert("title".into(), json!("changed behind the cache"));
    h.store.put_raw("tasks", "t1", raw).await;

    let hit = repo.get("t1", &GetOptions::default()).await.unwrap();
    assert_eq!(hit.data.title, "cached");

    // options other than populate/mask still take the cached path
    let deleted_ok = repo
        .get("t1", &GetOptions::default().include_deleted())
        .await
        .unwrap();
    assert_eq!(deleted_ok.data.title, "cached");

    let masked = repo
        .get("t1", &GetOptions::default().mask(FieldPath::top_level("notes")))
        .await
        .unwrap();
    assert_eq!(masked.data.title, "changed behind the cache");

    let uncached: Repository<Task> = Repository::new(
        h.services.clone(),
        RepositoryOptions::default().with_cache(false),
    )
    .unwrap();
    let direct = uncached.get("t1", &GetOptions::default()).await.unwrap();
    assert_eq!(direct.data.title, "changed behind the cache");
}

#[tokio::test]
async fn test_update_invalidates_cache() {
    let h = harness();
    let repo = cached_repo(&h, Arc::new(MokaCacheProvider::new()), CacheSettings::default());
    repo.create(Some("t1"), &task("before")).await.unwrap();
    repo.get("t1", &GetOptions::default()).await.unwrap();

    repo.update("t1", json!({"title": "after"}), &UpdateOptions::default())
        .await
        .unwrap();
    let fetched = repo.get("t1", &GetOptions::default()).await.unwrap();
    assert_eq!(fetched.data.title, "after");

    repo.soft_delete("t1").await.unwrap();
    let err = repo.get("t1", &GetOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_failing_cache_fails_open() {
    let h = harness();
    let cache = Arc::new(FailingCache::default());
    let repo = cached_repo(&h, cache.clone(), CacheSettings::default());

    repo.create(Some("t1"), &task("resilient")).await.unwrap();
    let fetched = repo.get("t1", &GetOptions::default()).await.unwrap();
    assert_eq!(fetched.data.title, "resilient");
    repo.update("t1", json!({"priority": 2}), &UpdateOptions::default())
        .await
        .unwrap();
    assert_eq!(cache.get_calls(), 1);
}

#[tokio::test]
async fn test_non_resilient_cache_propagates_errors() {
    let h = harness();
    let settings = CacheSettings {
        resilient: false,
        ..CacheSettings::default()
    };
    let repo = cached_repo(&h, Arc::new(FailingCache::default()), settings);
    h.store
        .put_raw(
            "tasks",
            "t1",
            crate::support::doc(json!({
                "title": "stored",
                "createdAt": "2026-01-01T00:00:00.000000Z",
                "updatedAt": "2026-01-01T00:00:00.000000Z",
                "deletedAt": null
            })),
        )
        .await;

    let err = repo.get("t1", &GetOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::Cache { .. }));
}

#[tokio::test]
async fn test_breaker_stops_calling_failing_cache() {
    let h = harness();
    let cache = Arc::new(FailingCache::default());
    let repo = cached_repo(&h, cache.clone(), CacheSettings::default());
    repo.create(Some("t1"), &task("guarded")).await.unwrap();

    for _ in 0..8 {
        repo.get("t1", &GetOptions::default()).await.unwrap();
    }
    assert_eq!(cache.get_calls(), 5);
    assert_eq!(
        h.services.breakers.breaker(BREAKER_CACHE_GET).state(),
        CircuitBreakerState::Open
    );
}

#[tokio::test]
async fn test_cache_disabled_per_repository() {
    let h = harness();
    let cache = Arc::new(FailingCache::default());
    let services = h.services.clone().with_cache(cache.clone(), CacheSettings::default());
    let repo: Repository<Task> =
        Repository::new(services, RepositoryOptions::default().with_cache(false)).unwrap();
    repo.create(Some("t1"), &task("uncached")).await.unwrap();
    repo.get("t1", &GetOptions::default()).await.unwrap();
    assert_eq!(cache.get_calls(), 0);
}

#[tokio::test]
async fn test_cancelled_trial_does_not_jam_breaker() {
    let h = harness();
    let breakers = Arc::new(BreakerRegistry::new(
        CircuitBreakerConfig::default()
            .with_failure_threshold(1)
            .with_recovery_timeout(Duration::from_millis(20)),
    ));
    let services = h
        .services
        .clone()
        .with_breakers(breakers.clone())
        .with_cache(Arc::new(StalledCache), CacheSettings::default());
    let repo: Repository<Task> = Repository::new(services, RepositoryOptions::default()).unwrap();
    repo.create(Some("t1"), &task("slow cache")).await.unwrap();

    let breaker = breakers.breaker(BREAKER_CACHE_GET);
    breaker.record_failure();
    assert_eq!(breaker.state(), CircuitBreakerState::Open);
    tokio::time::sleep(Duration::from_millis(25)).await;

    // the trial lookup hangs and its caller gives up
    let cancelled =
        tokio::time::timeout(Duration::from_millis(30), repo.get("t1", &GetOptions::default())).await;
    assert!(cancelled.is_err());
    assert_eq!(breaker.state(), CircuitBreakerState::HalfOpen);

    // an abandoned trial call is replaced once the recovery timeout has passed
    assert!(breaker.is_call_permitted());
    breaker.record_success();
    assert_eq!(breaker.state(), CircuitBreakerState::Closed);
}
