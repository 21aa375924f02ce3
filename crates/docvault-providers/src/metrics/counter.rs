//! `metrics` crate counter sink

use crate::constants::{METRIC_STORE_OPERATIONS, METRIC_STORE_DOCUMENTS, METRIC_TENANT_NONE};
use docvault_domain::ports::providers::MetricsSink;
use docvault_domain::value_objects::MetricOperation;

/// Records store round trips as `metrics` counters
///
/// Two counters are incremented per call, both labelled by `operation`
/// and `tenant`: one by 1 (round trips) and one by the document count.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterMetricsSink;

impl CounterMetricsSink {
    /// Create a counter sink
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for CounterMetricsSink {
    fn record(&self, operation: MetricOperation, count: u64, tenant_id: Option<&str>) {
        let tenant = tenant_id.unwrap_or(METRIC_TENANT_NONE).to_string();
        let op = operation.as_str();
        metrics::counter!(METRIC_STORE_OPERATIONS, "operation" => op, "tenant" => tenant.clone())
            .increment(1);
        metrics::counter!(METRIC_STORE_DOCUMENTS, "operation" => op, "tenant" => tenant)
            .increment(count);
    }
}
