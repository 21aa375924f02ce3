//! Cache Provider Implementations
//!
//! Backends for the repository's read-through document cache. The
//! repository only ever reaches them through its fail-open wrapper.
//!
//! ## Available Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`NullCacheProvider`] | Testing | No-op stub, disables caching |
//! | [`MokaCacheProvider`] | Local | In-memory cache with TTL |
//! | [`RedisCacheProvider`] | Distributed | Redis-backed for multi-instance |
//!
//! ## Provider Selection Guide
//!
//! - **Development/Testing**: Use `NullCacheProvider` or `MokaCacheProvider`
//! - **Single Instance**: Use `MokaCacheProvider`
//! - **Multi Instance**: Use `RedisCacheProvider` so invalidations are shared

#[cfg(feature = "cache-moka")]
pub mod moka;
pub mod null;
#[cfg(feature = "cache-redis")]
pub mod redis;

#[cfg(feature = "cache-moka")]
pub use moka::MokaCacheProvider;
pub use null::NullCacheProvider;
#[cfg(feature = "cache-redis")]
pub use redis::RedisCacheProvider;

pub use docvault_domain::ports::providers::cache::{CacheEntryConfig, CacheStats};
