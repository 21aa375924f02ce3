//! Cache configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Cache backends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process cache (Moka)
    Moka,
    /// Distributed cache (Redis)
    Redis,
    /// No-op cache
    Null,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache enabled
    pub enabled: bool,

    /// Cache backend
    pub provider: CacheBackend,

    /// Default TTL in seconds
    pub default_ttl_secs: u64,

    /// Maximum number of cached documents (Moka)
    pub max_entries: u64,

    /// Redis URL (for the Redis backend)
    pub redis_url: Option<String>,

    /// Namespace for cache keys
    pub namespace: String,

    /// Swallow cache errors instead of failing the call
    pub resilient: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: CacheBackend::Moka,
            default_ttl_secs: CACHE_DEFAULT_TTL_SECS,
            max_entries: CACHE_DEFAULT_MAX_ENTRIES,
            redis_url: None,
            namespace: CACHE_DEFAULT_NAMESPACE.to_string(),
            resilient: true,
        }
    }
}
