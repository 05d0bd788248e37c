//! Read path: turns the counter store into metric samples on demand

use std::sync::Arc;

use crossbeam::channel::Sender;
use metrics::counter;

use super::counters::LevelCounterStore;
use crate::level::SeverityLevel;

/// Static description of the exported metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub name: &'static str,
    pub help: &'static str,
    /// Name of the single label carrying the severity level
    pub label: &'static str,
}

pub static DESCRIPTOR: Descriptor = Descriptor {
    name: "log_events_total",
    help: "Number of log events emitted, by severity level.",
    label: "level",
};

/// Kind of metric a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonically increasing
    Counter,
}

/// One value produced by a collect pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSample {
    pub level: SeverityLevel,
    pub value: u64,
    pub kind: MetricKind,
}

/// Destination for samples produced by [`MetricsCollector::collect`]
pub trait MetricSink {
    fn accept(&mut self, sample: MetricSample);
}

impl MetricSink for Vec<MetricSample> {
    fn accept(&mut self, sample: MetricSample) {
        self.push(sample);
    }
}

/// Samples sent after the receiver is gone are discarded.
impl MetricSink for Sender<MetricSample> {
    fn accept(&mut self, sample: MetricSample) {
        let _ = self.send(sample);
    }
}

/// Forwards samples to whichever `metrics` recorder is active
#[derive(Debug, Default, Clone, Copy)]
pub struct RecorderSink;

impl MetricSink for RecorderSink {
    fn accept(&mut self, sample: MetricSample) {
        match sample.kind {
            MetricKind::Counter => {
                counter!(DESCRIPTOR.name, DESCRIPTOR.label => sample.level.as_str())
                    .absolute(sample.value);
            }
        }
    }
}

/// Pull-based collector over the shared counter store
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    store: Arc<LevelCounterStore>,
}

impl MetricsCollector {
    pub fn new(store: Arc<LevelCounterStore>) -> Self {
        Self { store }
    }

    /// Metadata for the exported metric; constant for the process lifetime
    pub fn describe(&self) -> &'static Descriptor {
        &DESCRIPTOR
    }

    /// Emit one counter sample per tracked level, zero counts included
    pub fn collect<K: MetricSink + ?Sized>(&self, sink: &mut K) {
        for level in self.store.tracked().iter() {
            if let Some(value) = self.store.snapshot(level) {
                sink.accept(MetricSample {
                    level,
                    value,
                    kind: MetricKind::Counter,
                });
            }
        }
    }
}
