//! Value objects
//!
//! Immutable data shapes shared between the repository and its ports.

/// Raw documents and write operations
pub mod document;
/// Dotted field paths
pub mod field_path;
/// Native store queries
pub mod query;
/// Outbox events, entity versions, bulk results
pub mod records;
/// Timestamp wire format
pub mod timestamp;

pub use document::{Document, DocumentSnapshot, Precondition, WriteOp, document_path};
pub use field_path::{FieldPath, flatten_update};
pub use query::{
    AggregateResult, Aggregation, CollectionSelector, Direction, Filter, FilterOp, OrderBy, Query,
};
pub use records::{
    BulkItemError, BulkWriteResult, EntityVersion, MetricOperation, OutboxEvent, OutboxStatus,
    VersionMode,
};

/// Serde adapter storing `DateTime<Utc>` in the fixed-width wire format
pub mod serde_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a timestamp
    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::timestamp::format(*ts))
    }

    /// Deserialize a timestamp
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}
