//! Null cache provider
//!
//! Selecting `null` as the backend turns the document cache off without
//! touching repository options. Writes vanish; lookups are counted as
//! misses so cache stats still show the read traffic.

use async_trait::async_trait;
use docvault_domain::error::Result;
use docvault_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct NullCacheProvider {
    lookups: AtomicU64,
}

impl NullCacheProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            misses: self.lookups.load(Ordering::Relaxed),
            ..CacheStats::default()
        })
    }

    async fn size(&self) -> Result<usize> {
        Ok(0)
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
