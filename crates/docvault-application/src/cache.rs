//! Fail-open document cache
//!
//! Wraps a [`CacheProvider`] so that cache trouble never fails a repository
//! call. In resilient mode (the default) every provider error is logged at
//! `warn` and treated as a miss or a no-op; with resilient mode off errors
//! propagate. Each operation is guarded by the breaker named after it
//! (`cache.get`, `cache.set`, `cache.delete`); an open breaker
//! short-circuits to miss/no-op without touching the provider.
//!
//! Values are the stored (encrypted/compressed) form of a document, so
//! plaintext of sensitive fields never reaches the cache backend.

use crate::resilience::BreakerRegistry;
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::providers::{CacheEntryConfig, CacheProvider};
use docvault_domain::value_objects::Document;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Breaker guarding cache reads
pub const BREAKER_CACHE_GET: &str = "cache.get";
/// Breaker guarding cache writes
pub const BREAKER_CACHE_SET: &str = "cache.set";
/// Breaker guarding cache invalidations
pub const BREAKER_CACHE_DELETE: &str = "cache.delete";

/// Cache behavior settings
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Entry time to live
    pub ttl: Duration,
    /// Key prefix isolating this deployment's entries
    pub namespace: Option<String>,
    /// Swallow provider errors instead of propagating them
    pub resilient: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            namespace: None,
            resilient: true,
        }
    }
}

/// Cache key of a document: `{collection_path}:{id}`
pub fn cache_key(collection: &str, id: &str) -> String {
    format!("{collection}:{id}")
}

/// Fail-open wrapper over a cache provider
#[derive(Clone)]
pub struct ResilientCache {
    provider: Arc<dyn CacheProvider>,
    breakers: Arc<BreakerRegistry>,
    settings: CacheSettings,
}

impl ResilientCache {
    /// Wrap a provider
    pub fn new(
        provider: Arc<dyn CacheProvider>,
        breakers: Arc<BreakerRegistry>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            provider,
            breakers,
            settings,
        }
    }

    /// Underlying provider
    pub fn provider(&self) -> &Arc<dyn CacheProvider> {
        &self.provider
    }

    fn namespaced_key(&self, key: &str) -> String {
        match &self.settings.namespace {
            Some(ns) => format!("{ns}:{key}"),
            None => key.to_string(),
        }
    }

    /// Run a provider call behind the named breaker
    ///
    /// Returns `Ok(None)` when the call was short-circuited or its failure
    /// was swallowed.
    async fn guarded<T, F>(&self, operation: &'static str, key: &str, call: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<T>>,
    {
        let breaker = self.breakers.breaker(operation);
        if !breaker.is_call_permitted() {
            debug!(operation, key, "Cache breaker open, skipping call");
            return Ok(None);
        }
        match call.await {
            Ok(value) => {
                breaker.record_success();
                Ok(Some(value))
            }
            Err(e) => {
                breaker.record_failure();
                if self.settings.resilient {
                    warn!(operation, key, error = %e, "Cache operation failed, continuing without cache");
                    Ok(None)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Look up a stored document
    pub async fn get(&self, key: &str) -> Result<Option<Document>> {
        let full_key = self.namespaced_key(key);
        let cached = self
            .guarded(BREAKER_CACHE_GET, key, self.provider.get_json(&full_key))
            .await?
            .flatten();
        let Some(json) = cached else {
            return Ok(None);
        };
        match serde_json::from_str::<Document>(&json) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if self.settings.resilient => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                Ok(None)
            }
            Err(e) => Err(Error::cache(format!("Undecodable cache entry '{key}': {e}"))),
        }
    }

    /// Store a document
    pub async fn set(&self, key: &str, doc: &Document) -> Result<()> {
        let json = serde_json::to_string(doc)?;
        let full_key = self.namespaced_key(key);
        let config = CacheEntryConfig::new().with_ttl(self.settings.ttl);
        self.guarded(
            BREAKER_CACHE_SET,
            key,
            self.provider.set_json(&full_key, &json, config),
        )
        .await?;
        Ok(())
    }

    /// Invalidate a document
    pub async fn delete(&self, key: &str) -> Result<()> {
        let full_key = self.namespaced_key(key);
        self.guarded(BREAKER_CACHE_DELETE, key, self.provider.delete(&full_key))
            .await?;
        Ok(())
    }
}

impl fmt::Debug for ResilientCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientCache")
            .field("provider", &self.provider.provider_name())
            .field("settings", &self.settings)
            .finish()
    }
}
