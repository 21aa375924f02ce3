//! Repository-level records: outbox events, entity versions, bulk results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Delivery status of an outbox event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxStatus {
    /// Waiting for the dispatcher
    Pending,
    /// Delivered downstream
    Delivered,
    /// Delivery gave up
    Failed,
}

/// Event appended to the transactional outbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEvent {
    /// Event id
    pub id: String,
    /// Routing topic
    pub topic: String,
    /// Event payload
    pub payload: Value,
    /// Delivery status
    pub status: OutboxStatus,
    /// Creation time (stored as a fixed-width timestamp string)
    #[serde(with = "super::serde_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Tenant of the producing repository, if scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// How version snapshots record the pre-update state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionMode {
    /// Store the complete previous document
    #[default]
    Full,
    /// Store only the previous values of the changed fields
    Diff,
}

/// Immutable audit snapshot of an entity before an update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityVersion {
    /// Snapshot id
    pub id: String,
    /// Id of the versioned entity
    pub entity_id: String,
    /// When the snapshotted state became current
    #[serde(with = "super::serde_timestamp")]
    pub valid_from: DateTime<Utc>,
    /// When the snapshotted state was replaced
    #[serde(with = "super::serde_timestamp")]
    pub valid_to: DateTime<Utc>,
    /// Who made the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Why the change was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Full previous state (`VersionMode::Full`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Previous values of changed fields (`VersionMode::Diff`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<Value>,
}

/// Failure of one item in a bulk write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
    /// Position of the item in the input
    pub index: usize,
    /// Stable error code
    pub code: String,
    /// Error message
    pub error: String,
}

/// Outcome of a bulk write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkWriteResult {
    /// Number of items written
    pub success_count: usize,
    /// Number of items rejected or lost with their chunk
    pub failure_count: usize,
    /// Per-item failures
    pub errors: Vec<BulkItemError>,
    /// Ids of the written items, in input order
    pub ids: Vec<String>,
}

/// Kind of physical store round trip reported to metrics sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricOperation {
    /// Document reads
    Read,
    /// Document writes
    Write,
    /// Document deletes
    Delete,
}

impl MetricOperation {
    /// Label value used by metrics backends
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Delete => "DELETE",
        }
    }
}
