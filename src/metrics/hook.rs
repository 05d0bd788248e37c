//! Write path: counts every emitted log event
//!
//! [`EventHook`] is registered with the logging framework as a
//! `tracing_subscriber` layer and with `std::panic` as a panic hook.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::counters::LevelCounterStore;
use crate::level::SeverityLevel;

/// Observer that increments the shared store once per log event
///
/// Never blocks, allocates or reports an error to the logging caller.
#[derive(Debug, Clone)]
pub struct EventHook {
    store: Arc<LevelCounterStore>,
}

impl EventHook {
    pub fn new(store: Arc<LevelCounterStore>) -> Self {
        Self { store }
    }

    /// Count one event at `level`
    #[inline]
    pub fn on_event(&self, level: SeverityLevel) {
        self.store.increment(level);
    }

    /// Count one event whose level is only known by name.
    /// Unrecognized names are dropped.
    pub fn on_raw_level(&self, name: &str) {
        if let Some(level) = SeverityLevel::from_name(name) {
            self.store.increment(level);
        }
    }
}

impl<S: Subscriber> Layer<S> for EventHook {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.store.increment(severity_of(event));
    }
}

/// Severity of a tracing event.
///
/// tracing has no levels above ERROR, so an ERROR event flagged with
/// `panic = true` or `fatal = true` is escalated.
fn severity_of(event: &Event<'_>) -> SeverityLevel {
    let level = SeverityLevel::from(*event.metadata().level());
    if level != SeverityLevel::Error {
        return level;
    }

    let mut visitor = EscalationVisitor::default();
    event.record(&mut visitor);
    visitor.escalated.unwrap_or(level)
}

#[derive(Default)]
struct EscalationVisitor {
    escalated: Option<SeverityLevel>,
}

impl Visit for EscalationVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if !value {
            return;
        }
        match field.name() {
            "panic" => self.escalated = Some(SeverityLevel::Panic),
            "fatal" if self.escalated.is_none() => self.escalated = Some(SeverityLevel::Fatal),
            _ => {}
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
}

/// Chain a panic hook that counts each panic at [`SeverityLevel::Panic`]
/// before handing over to the previously installed hook.
pub fn install_panic_hook(hook: EventHook) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        hook.on_event(SeverityLevel::Panic);
        previous(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelSet;
    use tracing_subscriber::prelude::*;

    fn hook_with(tracked: LevelSet) -> (EventHook, Arc<LevelCounterStore>) {
        let store = Arc::new(LevelCounterStore::new(tracked));
        (EventHook::new(store.clone()), store)
    }

    #[test]
    fn test_on_event_increments_store() {
        let (hook, store) = hook_with(LevelSet::default());

        hook.on_event(SeverityLevel::Error);
        hook.on_event(SeverityLevel::Error);
        hook.on_event(SeverityLevel::Fatal);

        assert_eq!(store.snapshot(SeverityLevel::Error), Some(2));
        assert_eq!(store.snapshot(SeverityLevel::Fatal), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Warning), Some(0));
    }

    #[test]
    fn test_raw_level_names() {
        let (hook, store) = hook_with(LevelSet::default());

        hook.on_raw_level("warn");
        hook.on_raw_level("WARNING");
        hook.on_raw_level("not-a-level");
        hook.on_raw_level("");

        assert_eq!(store.snapshot(SeverityLevel::Warning), Some(2));
        assert_eq!(store.counts().levels.iter().map(|c| c.count).sum::<u64>(), 2);
    }

    #[test]
    fn test_layer_counts_tracing_events() {
        let (hook, store) = hook_with(LevelSet::all());
        let subscriber = tracing_subscriber::registry().with(hook);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("first");
            tracing::error!(code = 7, "second");
            tracing::warn!("careful");
            tracing::info!(user = "alice", "hello");
            tracing::trace!("noise");
        });

        assert_eq!(store.snapshot(SeverityLevel::Error), Some(2));
        assert_eq!(store.snapshot(SeverityLevel::Warning), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Info), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Debug), Some(0));
        assert_eq!(store.snapshot(SeverityLevel::Trace), Some(1));
    }

    #[test]
    fn test_layer_escalates_flagged_errors() {
        let (hook, store) = hook_with(LevelSet::default());
        let subscriber = tracing_subscriber::registry().with(hook);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(fatal = true, "giving up");
            tracing::error!(panic = true, fatal = true, "unrecoverable");
            tracing::error!(fatal = false, "plain");
            tracing::warn!(fatal = true, "warnings are never escalated");
        });

        assert_eq!(store.snapshot(SeverityLevel::Fatal), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Panic), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Error), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Warning), Some(1));
    }

    #[test]
    fn test_layer_drops_untracked_levels() {
        let (hook, store) = hook_with(LevelSet::default());
        let subscriber = tracing_subscriber::registry().with(hook);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("not counted");
            tracing::debug!("not counted");
        });

        assert!(store.counts().levels.iter().all(|entry| entry.count == 0));
    }
}
