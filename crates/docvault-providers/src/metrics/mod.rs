//! Metrics Sink Implementations
//!
//! | Sink | Description |
//! |------|-------------|
//! | [`CounterMetricsSink`] | `metrics` facade counter, exported by whatever recorder is installed |
//! | [`TracingMetricsSink`] | Emits one `debug` event per store round trip |
//! | [`NullMetricsSink`] | Discards everything |

#[cfg(feature = "metrics-exporter")]
pub mod counter;
pub mod null;
pub mod tracing;

#[cfg(feature = "metrics-exporter")]
pub use counter::CounterMetricsSink;
pub use null::NullMetricsSink;
pub use self::tracing::TracingMetricsSink;
