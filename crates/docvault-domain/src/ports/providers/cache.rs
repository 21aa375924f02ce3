//! Cache Provider Port
//!
//! String key/value backend for stored documents. Values are opaque JSON
//! text; the provider never inspects them. Key namespacing, breakers and
//! fail-open behavior live in the repository's cache wrapper, so providers
//! simply report their errors.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// TTL applied when a write does not choose one
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Write options of a single cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntryConfig {
    /// Lifetime of the entry; zero keeps it until evicted
    pub ttl: Duration,
}

impl CacheEntryConfig {
    /// Entry living for [`DEFAULT_CACHE_TTL`]
    pub fn new() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Set the entry lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for CacheEntryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Lookup counters of a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a value
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries currently held
    pub entries: u64,
}

impl CacheStats {
    /// Total lookups served
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of lookups that hit, `0.0` before the first lookup
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}

/// Cache backend port
///
/// No ordering or atomicity across keys is assumed.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    /// Value stored under `key`, `None` when absent or expired
    async fn get_json(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous entry
    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;

    /// Remove `key`
    ///
    /// # Returns
    /// Whether an entry was removed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Whether a live entry exists for `key`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Drop every entry this provider owns
    async fn clear(&self) -> Result<()>;

    /// Lookup counters and entry count
    async fn stats(&self) -> Result<CacheStats>;

    /// Number of entries held
    async fn size(&self) -> Result<usize>;

    /// Provider identifier used in logs (`moka`, `redis`, `null`)
    fn provider_name(&self) -> &str;
}
