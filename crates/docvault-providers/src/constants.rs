//! Provider Constants
//!
//! Defaults specific to provider implementations. Repository-level
//! defaults live in `docvault_domain::constants`.

// ============================================================================
// CACHE PROVIDER CONSTANTS
// ============================================================================

/// Default number of entries held by the Moka cache
pub const CACHE_DEFAULT_CAPACITY: u64 = 10_000;

/// Largest serialized document the Moka cache accepts (1 MiB)
pub const CACHE_MAX_ENTRY_BYTES: usize = 1024 * 1024;

// ============================================================================
// TASK QUEUE CONSTANTS
// ============================================================================

/// Default number of pending background tasks
pub const TASK_QUEUE_DEFAULT_CAPACITY: usize = 1024;

// ============================================================================
// METRICS CONSTANTS
// ============================================================================

/// Counter of document store round trips
pub const METRIC_STORE_OPERATIONS: &str = "docvault_store_operations_total";

/// Counter of documents touched by store round trips
pub const METRIC_STORE_DOCUMENTS: &str = "docvault_store_documents_total";

/// Tenant label used when the repository is not tenant-scoped
pub const METRIC_TENANT_NONE: &str = "none";
