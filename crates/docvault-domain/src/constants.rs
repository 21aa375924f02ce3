//! Domain layer constants
//!
//! Field names and defaults shared by every layer. Infrastructure-specific
//! constants live in `docvault-infrastructure::constants`.

// ============================================================================
// SYSTEM FIELDS
// ============================================================================

/// Primary key field stored on every document
pub const FIELD_ID: &str = "id";

/// Creation timestamp field
pub const FIELD_CREATED_AT: &str = "createdAt";

/// Last write timestamp field (optimistic lock token)
pub const FIELD_UPDATED_AT: &str = "updatedAt";

/// Soft delete marker field
pub const FIELD_DELETED_AT: &str = "deletedAt";

/// Schema version stamp field
pub const FIELD_SCHEMA_VERSION: &str = "_v";

/// Fields owned by the repository and never part of entity data
pub const SYSTEM_FIELDS: [&str; 5] = [
    FIELD_ID,
    FIELD_CREATED_AT,
    FIELD_UPDATED_AT,
    FIELD_DELETED_AT,
    FIELD_SCHEMA_VERSION,
];

/// Default tenant field name
pub const DEFAULT_TENANT_FIELD: &str = "tenantId";

/// Schema version assumed for documents written without a stamp
pub const INITIAL_SCHEMA_VERSION: u32 = 1;

// ============================================================================
// COLLECTIONS
// ============================================================================

/// Child collection holding entity version snapshots
pub const VERSIONS_COLLECTION: &str = "_versions";

/// Default root collection for outbox events
pub const DEFAULT_OUTBOX_COLLECTION: &str = "_outbox";

// ============================================================================
// LIMITS
// ============================================================================

/// Default page size for list queries
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page a single list call may request
pub const MAX_PAGE_SIZE: usize = 500;

/// Per-batch write limit most document databases enforce
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;
