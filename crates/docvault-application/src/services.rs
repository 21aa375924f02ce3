//! Shared collaborators of every repository

use crate::cache::{CacheSettings, ResilientCache};
use crate::resilience::BreakerRegistry;
use crate::search_sync::SearchSync;
use docvault_domain::ports::{
    CacheProvider, Clock, CryptoProvider, DocumentStore, MetricsSink, SearchProvider, TaskQueue,
};
use std::fmt;
use std::sync::Arc;

/// Services injected into repositories
///
/// Cheap to clone; sub-collection repositories inherit the same instance.
#[derive(Clone)]
pub struct RepositoryServices {
    /// Document database
    pub store: Arc<dyn DocumentStore>,
    /// Background work (search sync, read-repair)
    pub tasks: Arc<dyn TaskQueue>,
    /// Write timestamps
    pub clock: Arc<dyn Clock>,
    /// Read cache and its settings
    pub cache: Option<(Arc<dyn CacheProvider>, CacheSettings)>,
    /// Field encryption primitive
    pub crypto: Option<Arc<dyn CryptoProvider>>,
    /// Search index
    pub search: Option<Arc<dyn SearchProvider>>,
    /// Store round-trip metrics
    pub metrics: Option<Arc<dyn MetricsSink>>,
    /// Circuit breakers shared by every repository
    pub breakers: Arc<BreakerRegistry>,
}

impl RepositoryServices {
    /// Services with only the mandatory collaborators
    pub fn new(
        store: Arc<dyn DocumentStore>,
        tasks: Arc<dyn TaskQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tasks,
            clock,
            cache: None,
            crypto: None,
            search: None,
            metrics: None,
            breakers: Arc::new(BreakerRegistry::default()),
        }
    }

    /// Add a read cache
    pub fn with_cache(mut self, provider: Arc<dyn CacheProvider>, settings: CacheSettings) -> Self {
        self.cache = Some((provider, settings));
        self
    }

    /// Add field encryption
    pub fn with_crypto(mut self, crypto: Arc<dyn CryptoProvider>) -> Self {
        self.crypto = Some(crypto);
        self
    }

    /// Add a search index
    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Add a metrics sink
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Use a specific breaker registry
    pub fn with_breakers(mut self, breakers: Arc<BreakerRegistry>) -> Self {
        self.breakers = breakers;
        self
    }

    pub(crate) fn resilient_cache(&self) -> Option<ResilientCache> {
        self.cache.as_ref().map(|(provider, settings)| {
            ResilientCache::new(
                Arc::clone(provider),
                Arc::clone(&self.breakers),
                settings.clone(),
            )
        })
    }

    pub(crate) fn search_sync(&self) -> Option<SearchSync> {
        self.search
            .as_ref()
            .map(|search| SearchSync::new(Arc::clone(search), Arc::clone(&self.tasks)))
    }
}

impl fmt::Debug for RepositoryServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryServices")
            .field("store", &self.store.provider_name())
            .field("cache", &self.cache.as_ref().map(|(p, _)| p.provider_name()))
            .field("crypto", &self.crypto.as_ref().map(|c| c.provider_name()))
            .field("search", &self.search.as_ref().map(|s| s.provider_name()))
            .field("breakers", &self.breakers.states())
            .finish()
    }
}
