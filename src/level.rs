//! Severity levels
//!
//! The closed set of levels the counters are keyed by.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Debug,
    Trace,
}

impl SeverityLevel {
    /// Number of levels, and the size of every per-level table
    pub const COUNT: usize = 7;

    /// All levels, most severe first
    pub const ALL: [SeverityLevel; Self::COUNT] = [
        SeverityLevel::Panic,
        SeverityLevel::Fatal,
        SeverityLevel::Error,
        SeverityLevel::Warning,
        SeverityLevel::Info,
        SeverityLevel::Debug,
        SeverityLevel::Trace,
    ];

    /// Fixed table slot for this level
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a level by name, case-insensitively, with `warn` accepted
    /// for `warning`. Does not allocate.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        SeverityLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
            .or_else(|| name.eq_ignore_ascii_case("warn").then_some(SeverityLevel::Warning))
    }

    /// Label value used in metrics output
    pub const fn as_str(self) -> &'static str {
        match self {
            SeverityLevel::Panic => "panic",
            SeverityLevel::Fatal => "fatal",
            SeverityLevel::Error => "error",
            SeverityLevel::Warning => "warning",
            SeverityLevel::Info => "info",
            SeverityLevel::Debug => "debug",
            SeverityLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for SeverityLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => SeverityLevel::Error,
            tracing::Level::WARN => SeverityLevel::Warning,
            tracing::Level::INFO => SeverityLevel::Info,
            tracing::Level::DEBUG => SeverityLevel::Debug,
            _ => SeverityLevel::Trace,
        }
    }
}

/// Returned when a level name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized severity level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for SeverityLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeverityLevel::from_name(s).ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

/// Fixed set of severity levels, stored as a bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSet(u8);

impl LevelSet {
    /// No levels
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every level
    pub const fn all() -> Self {
        Self((1 << SeverityLevel::COUNT) - 1)
    }

    /// Set with `level` added
    pub const fn with(self, level: SeverityLevel) -> Self {
        Self(self.0 | (1 << level.index()))
    }

    #[inline]
    pub const fn contains(self, level: SeverityLevel) -> bool {
        self.0 & (1 << level.index()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in most-severe-first order
    pub fn iter(self) -> impl Iterator<Item = SeverityLevel> {
        SeverityLevel::ALL
            .into_iter()
            .filter(move |level| self.contains(*level))
    }
}

/// Panic, fatal, error and warning: the levels worth alerting on
impl Default for LevelSet {
    fn default() -> Self {
        Self::empty()
            .with(SeverityLevel::Panic)
            .with(SeverityLevel::Fatal)
            .with(SeverityLevel::Error)
            .with(SeverityLevel::Warning)
    }
}

impl FromIterator<SeverityLevel> for LevelSet {
    fn from_iter<I: IntoIterator<Item = SeverityLevel>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), LevelSet::with)
    }
}
