//! Layered configuration
//!
//! Built-in defaults, then a single TOML file, then prefixed environment
//! variables with nested keys split on `__`
//! (`DOCVAULT_CACHE__DEFAULT_TTL_SECS=60`). The merged result is validated
//! before anything else sees it.

use crate::config::AppConfig;
use crate::config::types::CacheBackend;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::crypto::CryptoService;
use crate::error_ext::ErrorContext;
use crate::logging::parse_log_level;
use docvault_domain::constants::DEFAULT_MAX_BATCH_SIZE;
use docvault_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Explicit file; when unset the default locations are searched
    file: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    pub fn with_config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Prefix of the environment layer, without the trailing `_`
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Merge every layer and validate the result
    ///
    /// # Errors
    /// `Configuration` when a layer does not parse or a value is out of range.
    pub fn load(&self) -> Result<AppConfig> {
        let config: AppConfig = self
            .figment()
            .extract()
            .config_context("Failed to extract configuration")?;
        validate_app_config(&config)?;
        Ok(config)
    }

    /// Write `config` as TOML, readable back through [`ConfigLoader::load`]
    pub fn save_to_file(&self, config: &AppConfig, path: impl AsRef<Path>) -> Result<()> {
        let text = toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        std::fs::write(path.as_ref(), text).io_context("Failed to write config file")
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = self.config_file() {
            info!(path = %path.display(), "Loading configuration file");
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR))
    }

    fn config_file(&self) -> Option<PathBuf> {
        match &self.file {
            Some(path) if path.exists() => Some(path.clone()),
            Some(path) => {
                warn!(path = %path.display(), "Configuration file not found, using defaults");
                None
            }
            None => default_locations().into_iter().find(|path| path.exists()),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `./docvault.toml`, `./docvault/docvault.toml`, then the user config dir
fn default_locations() -> Vec<PathBuf> {
    let mut locations = Vec::with_capacity(3);
    if let Ok(cwd) = std::env::current_dir() {
        locations.push(cwd.join(DEFAULT_CONFIG_FILENAME));
        locations.push(cwd.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME));
    }
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME));
    }
    locations
}

fn ensure(holds: bool, message: impl FnOnce() -> String) -> Result<()> {
    if holds {
        Ok(())
    } else {
        Err(Error::configuration(message()))
    }
}

/// Reject values the repository or its providers cannot run with
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    let repository = &config.repository;
    ensure(!repository.tenant_field.trim().is_empty(), || {
        "repository.tenant_field cannot be empty".into()
    })?;
    ensure(
        (1..=DEFAULT_MAX_BATCH_SIZE).contains(&repository.batch_size),
        || {
            format!(
                "repository.batch_size must be between 1 and {DEFAULT_MAX_BATCH_SIZE}, got {}",
                repository.batch_size
            )
        },
    )?;
    ensure(!repository.outbox_collection.trim().is_empty(), || {
        "repository.outbox_collection cannot be empty".into()
    })?;

    let cache = &config.cache;
    if cache.enabled {
        ensure(cache.default_ttl_secs > 0, || {
            "cache.default_ttl_secs must be positive while the cache is enabled".into()
        })?;
        ensure(
            cache.provider != CacheBackend::Redis || cache.redis_url.is_some(),
            || "cache.redis_url is required by the redis backend".into(),
        )?;
    }

    if let Some(key) = &config.crypto.master_key {
        CryptoService::from_hex(key)?;
    }

    let resilience = &config.resilience;
    ensure(resilience.circuit_breaker_failure_threshold > 0, || {
        "resilience.circuit_breaker_failure_threshold must be positive".into()
    })?;
    ensure(
        !resilience.retry_jitter || resilience.retry_base_delay_ms > 0,
        || "resilience.retry_jitter needs a non-zero retry_base_delay_ms".into(),
    )?;

    ensure(config.tasks.queue_capacity > 0, || {
        "tasks.queue_capacity must be positive".into()
    })?;

    parse_log_level(&config.logging.level).map(|_| ())
}
