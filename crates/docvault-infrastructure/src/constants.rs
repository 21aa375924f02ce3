//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Repository-level constants are defined in `docvault_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "docvault.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "docvault";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "DOCVAULT";

/// Separator between nested keys in environment variable names
///
/// `DOCVAULT_CACHE__DEFAULT_TTL_SECS` sets `cache.default_ttl_secs`.
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// Default cache TTL in seconds (5 minutes)
pub const CACHE_DEFAULT_TTL_SECS: u64 = 300;

/// Default maximum number of cached documents
pub const CACHE_DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Default cache key namespace
pub const CACHE_DEFAULT_NAMESPACE: &str = "docvault";

// ============================================================================
// CRYPTO CONSTANTS
// ============================================================================

/// AES-GCM key size in bytes (256 bits)
pub const AES_GCM_KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes (96 bits)
pub const AES_GCM_NONCE_SIZE: usize = 12;

/// Crypto provider name reported for the AES-GCM service
pub const AES_GCM_PROVIDER_NAME: &str = "aes-256-gcm";

// ============================================================================
// RESILIENCE CONSTANTS
// ============================================================================

/// Consecutive failures before a circuit breaker opens
pub const CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 5;

/// Seconds an open circuit waits before probing again
pub const CIRCUIT_BREAKER_TIMEOUT_SECS: u64 = 30;

/// Default retry budget of atomic read-modify-write
pub const ATOMIC_RETRY_ATTEMPTS: u32 = 3;

/// Default base backoff delay of atomic read-modify-write, in milliseconds
pub const ATOMIC_RETRY_BASE_DELAY_MS: u64 = 50;

// ============================================================================
// TASK QUEUE CONSTANTS
// ============================================================================

/// Default capacity of the background task queue
pub const TASK_QUEUE_CAPACITY: usize = 1024;

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV_FILTER: &str = "DOCVAULT_LOG";

/// Default stem of rolling log files
pub const LOG_FILE_STEM: &str = "docvault";
