//! Tests for cache providers

use docvault_domain::ports::providers::{CacheEntryConfig, CacheProvider};
use docvault_providers::cache::{MokaCacheProvider, NullCacheProvider};
use std::time::Duration;

#[tokio::test]
async fn test_moka_round_trip_and_delete() {
    let cache = MokaCacheProvider::new();
    cache
        .set_json("tasks:1", r#"{"id":"1"}"#, CacheEntryConfig::default())
        .await
        .expect("set");

    assert_eq!(
        cache.get_json("tasks:1").await.expect("get").as_deref(),
        Some(r#"{"id":"1"}"#)
    );
    assert!(cache.delete("tasks:1").await.expect("delete"));
    assert!(cache.get_json("tasks:1").await.expect("get").is_none());
    assert!(!cache.delete("tasks:1").await.expect("second delete"));
}

#[tokio::test]
async fn test_moka_tracks_hits_and_misses() {
    let cache = MokaCacheProvider::new();
    cache
        .set_json("k", "1", CacheEntryConfig::default())
        .await
        .expect("set");
    let _ = cache.get_json("k").await;
    let _ = cache.get_json("missing").await;

    let stats = cache.stats().await.expect("stats");
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.lookups(), 2);
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_moka_entry_expires_after_ttl() {
    let cache = MokaCacheProvider::new();
    cache
        .set_json("short", "1", CacheEntryConfig::new().with_ttl(Duration::from_millis(50)))
        .await
        .expect("set");
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(cache.get_json("short").await.expect("get").is_none());
}

#[tokio::test]
async fn test_null_cache_never_stores() {
    let cache = NullCacheProvider::new();
    cache
        .set_json("k", "v", CacheEntryConfig::default())
        .await
        .expect("set");
    assert!(cache.get_json("k").await.expect("get").is_none());
    assert_eq!(cache.size().await.expect("size"), 0);
    let stats = cache.stats().await.expect("stats");
    assert_eq!((stats.hits, stats.misses), (0, 1));
    assert_eq!(cache.provider_name(), "null");
}
