//! Service bootstrap
//!
//! Turns an [`AppConfig`] into the [`RepositoryServices`] every repository
//! shares, plus the [`RepositoryOptions`] defaults each repository starts
//! from. The document store is supplied by the caller.

use crate::config::{AppConfig, CacheBackend, MetricsSinkKind, SearchBackend};
use crate::crypto::CryptoService;
use docvault_application::{
    AtomicRetryPolicy, BreakerRegistry, CacheSettings, CircuitBreakerConfig, RepositoryOptions,
    RepositoryServices,
};
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::{CacheProvider, DocumentStore, MetricsSink, SearchProvider};
use docvault_providers::cache::{MokaCacheProvider, NullCacheProvider};
use docvault_providers::metrics::{CounterMetricsSink, TracingMetricsSink};
use docvault_providers::search::{InMemorySearchProvider, NullSearchProvider};
use docvault_providers::{SystemClock, TokioTaskQueue};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the shared services described by `config`
///
/// Must be called inside a tokio runtime (the task queue spawns its worker).
///
/// # Errors
/// `Configuration` when the master key is malformed or the selected cache
/// backend is not available.
pub fn build_services(config: &AppConfig, store: Arc<dyn DocumentStore>) -> Result<RepositoryServices> {
    let tasks = Arc::new(TokioTaskQueue::new(config.tasks.queue_capacity));
    let breakers = BreakerRegistry::new(
        CircuitBreakerConfig::default()
            .with_failure_threshold(config.resilience.circuit_breaker_failure_threshold)
            .with_recovery_timeout(Duration::from_secs(
                config.resilience.circuit_breaker_timeout_secs,
            )),
    );

    let mut services = RepositoryServices::new(store, tasks, Arc::new(SystemClock::new()))
        .with_breakers(Arc::new(breakers));

    if let Some((provider, settings)) = cache_provider(config)? {
        services = services.with_cache(provider, settings);
    }
    if let Some(key) = &config.crypto.master_key {
        services = services.with_crypto(Arc::new(CryptoService::from_hex(key)?));
    }
    if config.search.enabled {
        let provider: Arc<dyn SearchProvider> = match config.search.provider {
            SearchBackend::InMemory => Arc::new(InMemorySearchProvider::new()),
            SearchBackend::Null => Arc::new(NullSearchProvider::new()),
        };
        services = services.with_search(provider);
    }
    let metrics: Option<Arc<dyn MetricsSink>> = match config.metrics.sink {
        MetricsSinkKind::Counter => Some(Arc::new(CounterMetricsSink::new())),
        MetricsSinkKind::Tracing => Some(Arc::new(TracingMetricsSink::new())),
        MetricsSinkKind::Null => None,
    };
    if let Some(metrics) = metrics {
        services = services.with_metrics(metrics);
    }

    info!(
        store = services.store.provider_name(),
        cache = config.cache.enabled,
        crypto = services.crypto.is_some(),
        search = config.search.enabled,
        "Repository services ready"
    );
    Ok(services)
}

/// Repository defaults described by `config`
pub fn repository_options(config: &AppConfig) -> RepositoryOptions {
    let resilience = &config.resilience;
    RepositoryOptions::default()
        .with_tenant_field(config.repository.tenant_field.clone())
        .with_soft_delete(config.repository.soft_delete)
        .with_batch_size(config.repository.batch_size)
        .with_outbox_collection(config.repository.outbox_collection.clone())
        .with_compression_min_length(config.compression.min_length)
        .with_cache(config.cache.enabled)
        .with_retry_policy(
            AtomicRetryPolicy::default()
                .with_max_retries(resilience.retry_attempts)
                .with_base_delay(Duration::from_millis(resilience.retry_base_delay_ms))
                .with_jitter(resilience.retry_jitter),
        )
}

type ConfiguredCache = Option<(Arc<dyn CacheProvider>, CacheSettings)>;

fn cache_provider(config: &AppConfig) -> Result<ConfiguredCache> {
    let cache = &config.cache;
    if !cache.enabled {
        return Ok(None);
    }
    let ttl = Duration::from_secs(cache.default_ttl_secs);
    let mut settings = CacheSettings {
        ttl,
        namespace: Some(cache.namespace.clone()),
        resilient: cache.resilient,
    };
    let provider: Arc<dyn CacheProvider> = match cache.provider {
        CacheBackend::Moka => Arc::new(MokaCacheProvider::with_config(cache.max_entries, ttl)),
        CacheBackend::Null => Arc::new(NullCacheProvider::new()),
        CacheBackend::Redis => {
            // The Redis provider applies the namespace as its own key prefix
            settings.namespace = None;
            redis_provider(cache.redis_url.as_deref(), &cache.namespace)?
        }
    };
    Ok(Some((provider, settings)))
}

#[cfg(feature = "cache-redis")]
fn redis_provider(url: Option<&str>, namespace: &str) -> Result<Arc<dyn CacheProvider>> {
    let url = url.ok_or_else(|| Error::configuration("Redis URL is not configured"))?;
    Ok(Arc::new(docvault_providers::cache::RedisCacheProvider::new(url, namespace)?))
}

#[cfg(not(feature = "cache-redis"))]
fn redis_provider(_url: Option<&str>, _namespace: &str) -> Result<Arc<dyn CacheProvider>> {
    Err(Error::configuration(
        "Redis cache backend requires the 'cache-redis' feature",
    ))
}
