//! Repository configuration and per-call options

use crate::codec::DEFAULT_COMPRESSION_MIN_LENGTH;
use crate::concurrency::AtomicRetryPolicy;
use crate::migration::MigrationRegistry;
use chrono::{DateTime, Utc};
use docvault_domain::constants::{
    DEFAULT_MAX_BATCH_SIZE, DEFAULT_OUTBOX_COLLECTION, DEFAULT_TENANT_FIELD,
    INITIAL_SCHEMA_VERSION,
};
use docvault_domain::value_objects::{Direction, FieldPath, Filter, OrderBy, VersionMode};
use std::collections::BTreeMap;

/// Value written over masked string fields
pub const MASKED_VALUE: &str = "***";

/// Single-hop relation to documents of a collection
///
/// The field holds either one related id or an array of ids. Related
/// documents are decoded only when the relation points back at the
/// repository's own collection; documents of any other collection come back
/// as stored (encrypted fields sealed, compressed fields prefixed, no
/// migration applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Field holding the related id(s)
    pub field: FieldPath,
    /// Collection path of the related documents
    pub collection: String,
}

impl Relation {
    /// Create a relation
    pub fn new<S: Into<String>>(field: FieldPath, collection: S) -> Self {
        Self {
            field,
            collection: collection.into(),
        }
    }
}

/// Static configuration of a repository
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Field holding the tenant id
    pub tenant_field: String,
    /// Whether deletes are soft by default
    pub soft_delete: bool,
    /// Schema version every read is upgraded to
    pub target_version: u32,
    /// Single-step migrations
    pub migrations: MigrationRegistry,
    /// Paths encrypted at rest
    pub encrypted_fields: Vec<FieldPath>,
    /// String paths compressed at rest
    pub compressed_fields: Vec<FieldPath>,
    /// Minimum string length that triggers compression
    pub compression_min_length: usize,
    /// Version snapshots taken before each update
    pub versioning: Option<VersionMode>,
    /// Relations available to population, keyed by name
    pub relations: BTreeMap<String, Relation>,
    /// Preferred bulk chunk size (capped by the store limit)
    pub batch_size: usize,
    /// Root collection of outbox events
    pub outbox_collection: String,
    /// Retry policy of `run_atomic`
    pub retry_policy: AtomicRetryPolicy,
    /// Whether plain reads may use the cache
    pub cache_enabled: bool,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            tenant_field: DEFAULT_TENANT_FIELD.to_string(),
            soft_delete: true,
            target_version: INITIAL_SCHEMA_VERSION,
            migrations: MigrationRegistry::new(),
            encrypted_fields: Vec::new(),
            compressed_fields: Vec::new(),
            compression_min_length: DEFAULT_COMPRESSION_MIN_LENGTH,
            versioning: None,
            relations: BTreeMap::new(),
            batch_size: DEFAULT_MAX_BATCH_SIZE,
            outbox_collection: DEFAULT_OUTBOX_COLLECTION.to_string(),
            retry_policy: AtomicRetryPolicy::default(),
            cache_enabled: true,
        }
    }
}

impl RepositoryOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another tenant field
    pub fn with_tenant_field<S: Into<String>>(mut self, field: S) -> Self {
        self.tenant_field = field.into();
        self
    }

    /// Enable or disable soft deletes
    pub fn with_soft_delete(mut self, enabled: bool) -> Self {
        self.soft_delete = enabled;
        self
    }

    /// Target schema version and the migrations leading to it
    pub fn with_migrations(mut self, target_version: u32, migrations: MigrationRegistry) -> Self {
        self.target_version = target_version.max(INITIAL_SCHEMA_VERSION);
        self.migrations = migrations;
        self
    }

    /// Encrypt a path at rest
    pub fn encrypt_field(mut self, path: FieldPath) -> Self {
        self.encrypted_fields.push(path);
        self
    }

    /// Compress a string path at rest
    pub fn compress_field(mut self, path: FieldPath) -> Self {
        self.compressed_fields.push(path);
        self
    }

    /// Compression threshold
    pub fn with_compression_min_length(mut self, min_length: usize) -> Self {
        self.compression_min_length = min_length;
        self
    }

    /// Snapshot versions before each update
    pub fn with_versioning(mut self, mode: VersionMode) -> Self {
        self.versioning = Some(mode);
        self
    }

    /// Register a relation for population
    pub fn with_relation<S: Into<String>>(mut self, name: S, relation: Relation) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    /// Preferred bulk chunk size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Outbox collection
    pub fn with_outbox_collection<S: Into<String>>(mut self, collection: S) -> Self {
        self.outbox_collection = collection.into();
        self
    }

    /// Retry policy of `run_atomic`
    pub fn with_retry_policy(mut self, policy: AtomicRetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Enable or disable read caching
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }
}

/// Options of a single-entity read
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Return soft-deleted records too
    pub include_deleted: bool,
    /// Relations to populate, by name
    pub populate: Vec<String>,
    /// Paths to redact in the returned record
    pub mask: Vec<FieldPath>,
}

impl GetOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Include soft-deleted records
    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Populate a relation
    pub fn populate<S: Into<String>>(mut self, relation: S) -> Self {
        self.populate.push(relation.into());
        self
    }

    /// Redact a path
    pub fn mask(mut self, path: FieldPath) -> Self {
        self.mask.push(path);
        self
    }

    /// Whether the read takes the plain (cacheable) path
    pub fn is_plain(&self) -> bool {
        self.populate.is_empty() && self.mask.is_empty()
    }
}

/// Options of a list query
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Filters, all of which must match
    pub filters: Vec<Filter>,
    /// Sort order; defaults to `createdAt desc`
    pub order_by: Option<OrderBy>,
    /// Page size; defaults to 20, capped at 500
    pub limit: Option<usize>,
    /// Cursor returned by the previous page
    pub cursor: Option<String>,
    /// Return soft-deleted records too
    pub include_deleted: bool,
    /// Relations to populate, by name
    pub populate: Vec<String>,
    /// Paths to redact
    pub mask: Vec<FieldPath>,
}

impl ListOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sort by a field
    pub fn order_by(mut self, field: FieldPath, direction: Direction) -> Self {
        self.order_by = Some(OrderBy { field, direction });
        self
    }

    /// Page size
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume from a cursor
    pub fn cursor<S: Into<String>>(mut self, cursor: S) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Include soft-deleted records
    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Populate a relation
    pub fn populate<S: Into<String>>(mut self, relation: S) -> Self {
        self.populate.push(relation.into());
        self
    }

    /// Redact a path
    pub fn mask(mut self, path: FieldPath) -> Self {
        self.mask.push(path);
        self
    }
}

/// Options of a collection-group query
#[derive(Debug, Clone, Default)]
pub struct ListGroupOptions {
    /// Filters, order, paging
    pub list: ListOptions,
    /// Explicit partition filter used when no tenant is bound
    pub partition: Option<Filter>,
}

impl ListGroupOptions {
    /// Wrap list options
    pub fn new(list: ListOptions) -> Self {
        Self {
            list,
            partition: None,
        }
    }

    /// Restrict an unscoped group query to one partition
    pub fn partition(mut self, filter: Filter) -> Self {
        self.partition = Some(filter);
        self
    }
}

/// Options of an update
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// `updatedAt` the caller last read; mismatch fails the update
    pub expected_updated_at: Option<DateTime<Utc>>,
    /// Actor recorded on the version snapshot
    pub actor_id: Option<String>,
    /// Reason recorded on the version snapshot
    pub reason: Option<String>,
}

impl UpdateOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the stored `updatedAt` to equal `token`
    pub fn expect_updated_at(mut self, token: DateTime<Utc>) -> Self {
        self.expected_updated_at = Some(token);
        self
    }

    /// Record who made the change
    pub fn actor<S: Into<String>>(mut self, actor_id: S) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Record why the change was made
    pub fn reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Options of an aggregation
#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    /// Filters, all of which must match
    pub filters: Vec<Filter>,
    /// Count soft-deleted records too
    pub include_deleted: bool,
    /// Numeric fields to sum
    pub sum: Vec<FieldPath>,
    /// Numeric fields to average
    pub average: Vec<FieldPath>,
}

impl AggregateOptions {
    /// Count only
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sum a field
    pub fn sum(mut self, field: FieldPath) -> Self {
        self.sum.push(field);
        self
    }

    /// Average a field
    pub fn average(mut self, field: FieldPath) -> Self {
        self.average.push(field);
        self
    }
}
