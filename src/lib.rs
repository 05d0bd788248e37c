//! Logcount - per-level log event counters
//!
//! This library counts log events by severity level on the logging hot
//! path and exposes the counts to a pull-based metrics scraper.

pub mod config;
pub mod level;
pub mod metrics;
pub mod relay;
pub mod util;

pub use config::Config;
pub use level::{LevelSet, SeverityLevel};

/// Version for display
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
