//! Metrics configuration types

use serde::{Deserialize, Serialize};

/// Where store round-trip counts go
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsSinkKind {
    /// `metrics` crate counters
    Counter,
    /// `debug` tracing events
    Tracing,
    /// Discarded
    Null,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Metrics sink
    pub sink: MetricsSinkKind,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            sink: MetricsSinkKind::Counter,
        }
    }
}
