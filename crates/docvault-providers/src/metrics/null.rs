//! Null metrics sink

use docvault_domain::ports::providers::MetricsSink;
use docvault_domain::value_objects::MetricOperation;

/// Discards every measurement
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetricsSink;

impl NullMetricsSink {
    /// Create a null sink
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for NullMetricsSink {
    fn record(&self, _operation: MetricOperation, _count: u64, _tenant_id: Option<&str>) {}
}
