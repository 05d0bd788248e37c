//! Atomic per-level counters for the logging hot path
//!
//! Lock-free counters that can be safely updated from any thread.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::level::{LevelSet, SeverityLevel};

/// Bank of monotonic event counters, one slot per severity level
///
/// Only the levels in the tracked set are ever incremented or reported.
/// The table is fixed at construction, so the hot path never inserts.
/// One instance per process, shared through an `Arc`.
#[derive(Debug)]
pub struct LevelCounterStore {
    counters: [AtomicU64; SeverityLevel::COUNT],
    tracked: LevelSet,
}

impl LevelCounterStore {
    pub fn new(tracked: LevelSet) -> Self {
        Self {
            counters: std::array::from_fn(|_| AtomicU64::new(0)),
            tracked,
        }
    }

    /// Levels this store counts
    #[inline]
    pub fn tracked(&self) -> LevelSet {
        self.tracked
    }

    /// Count one event at `level`. Untracked levels are dropped.
    #[inline]
    pub fn increment(&self, level: SeverityLevel) {
        if self.tracked.contains(level) {
            self.counters[level.index()].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current count for `level`, or `None` if the level is not tracked
    #[inline]
    pub fn snapshot(&self, level: SeverityLevel) -> Option<u64> {
        self.tracked
            .contains(level)
            .then(|| self.counters[level.index()].load(Ordering::Relaxed))
    }

    /// Get counts of all tracked levels for reporting
    ///
    /// Each level is read independently; the list is not a consistent
    /// cut across levels while writers are active.
    pub fn counts(&self) -> LevelCounts {
        LevelCounts {
            levels: self
                .tracked
                .iter()
                .map(|level| LevelCount {
                    level,
                    count: self.counters[level.index()].load(Ordering::Relaxed),
                })
                .collect(),
        }
    }
}

impl Default for LevelCounterStore {
    fn default() -> Self {
        Self::new(LevelSet::default())
    }
}

/// Count of a single level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelCount {
    pub level: SeverityLevel,
    pub count: u64,
}

/// Per-level counts for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub levels: Vec<LevelCount>,
}

impl LevelCounts {
    /// Count for `level`, if it was reported
    pub fn get(&self, level: SeverityLevel) -> Option<u64> {
        self.levels
            .iter()
            .find(|entry| entry.level == level)
            .map(|entry| entry.count)
    }
}
