//! Entity capability and the record envelope returned by repositories

use crate::ports::providers::validator::Validator;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A domain type that can be stored through a repository
///
/// Implementors describe only their domain fields; `id`, timestamps and the
/// schema version stamp are owned by the repository and surface on
/// [`Record`]. Unknown stored fields (such as the tenant field) are ignored
/// on deserialization unless the type declares them.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Task { title: String }
///
/// impl Entity for Task {
///     const COLLECTION: &'static str = "tasks";
///     fn validator() -> Arc<dyn Validator> { Arc::new(TaskSchema) }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Root collection name
    const COLLECTION: &'static str;

    /// Schema validator applied on every write
    fn validator() -> Arc<dyn Validator>;
}

/// A stored entity together with its repository-owned metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Record<E> {
    /// Stable primary key
    pub id: String,
    /// Full document path
    pub path: String,
    /// Creation time, never modified
    pub created_at: DateTime<Utc>,
    /// Last write time, the optimistic lock token
    pub updated_at: DateTime<Utc>,
    /// Soft delete marker
    pub deleted_at: Option<DateTime<Utc>>,
    /// Schema version of `data` (always the repository's target version)
    pub schema_version: u32,
    /// Domain fields
    pub data: E,
    /// Related documents loaded by relation population, keyed by field
    pub populated: BTreeMap<String, Value>,
}

impl<E> Record<E> {
    /// Whether the record is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// One page of a list query
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    /// Records in the requested order
    pub data: Vec<Record<E>>,
    /// Opaque cursor for the next page; present only when the page was full
    pub next_cursor: Option<String>,
}
