//! Main application configuration

use serde::{Deserialize, Serialize};

pub use super::cache::{CacheBackend, CacheConfig};
pub use super::compression::CompressionConfig;
pub use super::crypto::CryptoConfig;
pub use super::logging::LoggingConfig;
pub use super::metrics::{MetricsConfig, MetricsSinkKind};
pub use super::repository::RepositoryConfig;
pub use super::resilience::ResilienceConfig;
pub use super::search::{SearchBackend, SearchConfig};
pub use super::tasks::TasksConfig;

/// Root configuration, one field per TOML section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Repository defaults
    pub repository: RepositoryConfig,
    /// Read cache
    pub cache: CacheConfig,
    /// Field encryption
    pub crypto: CryptoConfig,
    /// Field compression
    pub compression: CompressionConfig,
    /// Search index
    pub search: SearchConfig,
    /// Background task queue
    pub tasks: TasksConfig,
    /// Circuit breakers and atomic retries
    pub resilience: ResilienceConfig,
    /// Store operation metrics
    pub metrics: MetricsConfig,
    /// Logging
    pub logging: LoggingConfig,
}
