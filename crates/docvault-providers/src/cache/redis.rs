//! Redis distributed cache provider
//!
//! Shares cached documents (and their invalidations) between repository
//! instances. Keys are prefixed so several deployments can share one Redis
//! database; `clear` only removes keys under the prefix.
//!
//! ## Example
//!
//! ```ignore
//! use docvault_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::new("redis://localhost:6379", "docvault")?;
//! ```

use async_trait::async_trait;
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache provider over one Redis database
///
/// Hit and miss counters are local to this process; entry counts come from
/// the server.
#[derive(Clone)]
pub struct RedisCacheProvider {
    client: Client,
    prefix: String,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

fn redis_error(operation: &str, e: redis::RedisError) -> Error {
    Error::infrastructure_with_source(format!("Redis {operation} failed: {e}"), e)
}

impl RedisCacheProvider {
    /// Create a provider from a connection URL and a key prefix
    pub fn new(connection_string: &str, prefix: &str) -> Result<Self> {
        let client = Client::open(connection_string).map_err(|e| {
            Error::infrastructure_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
            hits: Arc::default(),
            misses: Arc::default(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| redis_error("connect", e))
    }

    fn key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.prefix)
        }
    }

    fn pattern(&self) -> String {
        if self.prefix.is_empty() {
            "*".to_string()
        } else {
            format!("{}:*", self.prefix)
        }
    }

    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    async fn prefixed_keys(&self, conn: &mut MultiplexedConnection) -> Result<Vec<String>> {
        let keys: Vec<String> = conn
            .keys(self.pattern())
            .await
            .map_err(|e| redis_error("KEYS", e))?;
        Ok(keys)
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(self.key(key))
            .await
            .map_err(|e| redis_error("GET", e))?;
        self.record(value.is_some());
        Ok(value)
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.connection().await?;
        let ttl_seconds = config.ttl.as_secs();

        let result: redis::RedisResult<()> = if ttl_seconds > 0 {
            conn.set_ex(self.key(key), value, ttl_seconds).await
        } else {
            conn.set(self.key(key), value).await
        };
        result.map_err(|e| redis_error("SET", e))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let count: i64 = conn
            .del(self.key(key))
            .await
            .map_err(|e| redis_error("DEL", e))?;
        Ok(count > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let count: i64 = conn
            .exists(self.key(key))
            .await
            .map_err(|e| redis_error("EXISTS", e))?;
        Ok(count > 0)
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let keys = self.prefixed_keys(&mut conn).await?;
        if keys.is_empty() {
            return Ok(());
        }
        let _: i64 = conn.del(keys).await.map_err(|e| redis_error("DEL", e))?;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let mut conn = self.connection().await?;
        let entries = self.prefixed_keys(&mut conn).await?.len() as u64;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        })
    }

    async fn size(&self) -> Result<usize> {
        let mut conn = self.connection().await?;
        Ok(self.prefixed_keys(&mut conn).await?.len())
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
