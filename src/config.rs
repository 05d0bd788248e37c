//! Configuration management
//!
//! Handles loading and validating configuration from TOML files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

use crate::level::{LevelSet, SeverityLevel};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub counting: CountingConfig,
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics endpoint
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Metrics server bind address
    #[serde(default = "default_metrics_addr")]
    pub bind_addr: SocketAddr,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Which severity levels get a counter
#[derive(Debug, Clone, Deserialize)]
pub struct CountingConfig {
    #[serde(default = "default_counted_levels")]
    pub levels: Vec<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            bind_addr: default_metrics_addr(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for CountingConfig {
    fn default() -> Self {
        Self {
            levels: default_counted_levels(),
        }
    }
}

impl CountingConfig {
    /// Parse the configured names into a level set
    pub fn level_set(&self) -> Result<LevelSet> {
        self.levels
            .iter()
            .map(|name| name.parse::<SeverityLevel>().map_err(anyhow::Error::from))
            .collect()
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_metrics_addr() -> SocketAddr { SocketAddr::from(([127, 0, 0, 1], 9090)) }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }
fn default_counted_levels() -> Vec<String> {
    LevelSet::default().iter().map(|level| level.as_str().to_string()).collect()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.counting.levels.is_empty() {
            anyhow::bail!("counting.levels must name at least one level");
        }
        self.counting
            .level_set()
            .context("Invalid entry in counting.levels")?;
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            anyhow::bail!("logging.format must be \"json\" or \"pretty\"");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();

        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.bind_addr, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.counting.level_set().unwrap(), LevelSet::default());
    }

    #[test]
    fn test_custom_levels() {
        let config = Config::from_toml(
            r#"
            [metrics]
            bind_addr = "0.0.0.0:9100"

            [counting]
            levels = ["error", "warn", "info"]
            "#,
        )
        .unwrap();

        let set = config.counting.level_set().unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(SeverityLevel::Warning));
        assert!(set.contains(SeverityLevel::Info));
        assert!(!set.contains(SeverityLevel::Panic));
    }

    #[test]
    fn test_rejects_unknown_level() {
        let err = Config::from_toml("[counting]\nlevels = [\"error\", \"loud\"]").unwrap_err();
        assert!(format!("{err:#}").contains("loud"));
    }

    #[test]
    fn test_rejects_empty_levels() {
        assert!(Config::from_toml("[counting]\nlevels = []").is_err());
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Config::from_toml("[logging]\nformat = \"xml\"").is_err());
    }
}
