//! Moka in-memory cache provider
//!
//! Concurrent in-memory cache for single-instance deployments.
//!
//! ## Example
//!
//! ```ignore
//! use docvault_providers::cache::MokaCacheProvider;
//! use std::time::Duration;
//!
//! let provider = MokaCacheProvider::with_config(10_000, Duration::from_secs(300));
//! ```

use crate::constants::{CACHE_DEFAULT_CAPACITY, CACHE_MAX_ENTRY_BYTES};
use async_trait::async_trait;
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use moka::Expiry;
use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry {
    json: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        (!value.ttl.is_zero()).then_some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        (!value.ttl.is_zero()).then_some(value.ttl)
    }
}

/// Moka-based in-memory cache provider
///
/// Entries expire after the TTL of the [`CacheEntryConfig`] they were
/// written with, capped by the provider-wide TTL when one is configured.
#[derive(Clone)]
pub struct MokaCacheProvider {
    cache: Cache<String, Entry>,
    capacity: u64,
    max_ttl: Option<Duration>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheProvider {
    /// Create a provider with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(CACHE_DEFAULT_CAPACITY)
    }

    /// Create a provider holding at most `capacity` entries
    pub fn with_capacity(capacity: u64) -> Self {
        Self::build(capacity, None)
    }

    /// Create a provider with a capacity and an upper bound on entry TTL
    pub fn with_config(capacity: u64, time_to_live: Duration) -> Self {
        Self::build(capacity, Some(time_to_live))
    }

    fn build(capacity: u64, max_ttl: Option<Duration>) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self {
            cache,
            capacity,
            max_ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        match self.cache.get(key).await {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.json.to_string()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        if value.len() > CACHE_MAX_ENTRY_BYTES {
            return Err(Error::cache(format!(
                "Cache value size {} exceeds maximum size {}",
                value.len(),
                CACHE_MAX_ENTRY_BYTES
            )));
        }

        let ttl = match self.max_ttl {
            Some(max_ttl) if config.ttl.is_zero() || config.ttl > max_ttl => max_ttl,
            _ => config.ttl,
        };
        let entry = Entry {
            json: Arc::from(value),
            ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        self.cache.run_pending_tasks().await;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        })
    }

    async fn size(&self) -> Result<usize> {
        self.cache.run_pending_tasks().await;
        Ok(usize::try_from(self.cache.entry_count()).unwrap_or(usize::MAX))
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("capacity", &self.capacity)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
