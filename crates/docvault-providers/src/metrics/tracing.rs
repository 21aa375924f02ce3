//! Tracing metrics sink

use docvault_domain::ports::providers::MetricsSink;
use docvault_domain::value_objects::MetricOperation;

/// Logs every store round trip at `debug`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricsSink;

impl TracingMetricsSink {
    /// Create a tracing sink
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for TracingMetricsSink {
    fn record(&self, operation: MetricOperation, count: u64, tenant_id: Option<&str>) {
        tracing::debug!(
            target: "docvault::metrics",
            operation = operation.as_str(),
            count,
            tenant = tenant_id.unwrap_or("-"),
            "Store round trip"
        );
    }
}
