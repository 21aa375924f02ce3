//! Metrics Sink Port
//!
//! Called once per physical document store round trip.

use crate::value_objects::MetricOperation;

/// Metrics sink port
pub trait MetricsSink: Send + Sync + std::fmt::Debug {
    /// Record a store round trip touching `count` documents
    fn record(&self, operation: MetricOperation, count: u64, tenant_id: Option<&str>);
}
