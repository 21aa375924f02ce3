//! Repository configuration types

use docvault_domain::constants::{DEFAULT_MAX_BATCH_SIZE, DEFAULT_OUTBOX_COLLECTION, DEFAULT_TENANT_FIELD};
use serde::{Deserialize, Serialize};

/// Defaults applied to every repository built from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Field holding the tenant id
    pub tenant_field: String,

    /// Mark records deleted instead of removing them
    pub soft_delete: bool,

    /// Preferred bulk write chunk size
    pub batch_size: usize,

    /// Collection receiving outbox events
    pub outbox_collection: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            tenant_field: DEFAULT_TENANT_FIELD.to_string(),
            soft_delete: true,
            batch_size: DEFAULT_MAX_BATCH_SIZE,
            outbox_collection: DEFAULT_OUTBOX_COLLECTION.to_string(),
        }
    }
}
