//! Log event metrics
//!
//! Lock-free per-level counters fed by a logging hook and read by a
//! pull-based collector.

mod api;
mod collector;
mod counters;
mod exporter;
mod hook;

pub use api::{serve, start_api_server};
pub use collector::{
    Descriptor, MetricKind, MetricSample, MetricSink, MetricsCollector, RecorderSink, DESCRIPTOR,
};
pub use counters::{LevelCount, LevelCounterStore, LevelCounts};
pub use exporter::PrometheusEndpoint;
pub use hook::{install_panic_hook, EventHook};
