//! Prometheus metrics exporter
//!
//! Renders the collector's samples in the Prometheus text format.

use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};

use super::collector::{MetricsCollector, RecorderSink};

/// Scrape target backed by a private Prometheus recorder
///
/// The recorder belongs to the endpoint and is never installed globally.
pub struct PrometheusEndpoint {
    recorder: PrometheusRecorder,
    collector: MetricsCollector,
}

impl PrometheusEndpoint {
    pub fn new(collector: MetricsCollector) -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();

        let desc = collector.describe();
        metrics::with_local_recorder(&recorder, || {
            describe_counter!(desc.name, desc.help);
        });

        Self {
            recorder,
            collector,
        }
    }

    /// Run one collect pass and render the result
    pub fn render(&self) -> String {
        metrics::with_local_recorder(&self.recorder, || {
            self.collector.collect(&mut RecorderSink);
        });
        self.recorder.handle().render()
    }
}
