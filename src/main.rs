//! Logcount - Entry Point
//!
//! Relays `<level> <message>` lines from stdin into the logging framework
//! and serves the resulting per-level counts for Prometheus.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tracing::{error, info};

use logcount::metrics::{
    install_panic_hook, start_api_server, EventHook, LevelCounterStore, MetricsCollector,
    PrometheusEndpoint,
};
use logcount::relay::relay_lines;
use logcount::{Config, VERSION};

const DEFAULT_CONFIG: &str = "logcount.toml";

/// Application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    // One store for the whole process, shared by the hook and the collector
    let store = Arc::new(LevelCounterStore::new(config.counting.level_set()?));
    let hook = EventHook::new(store.clone());

    logcount::util::init_tracing(&config.logging, hook.clone())?;
    install_panic_hook(hook);

    info!(
        version = VERSION,
        config_path = ?config_path,
        levels = ?config.counting.levels,
        "Starting logcount"
    );

    if config.metrics.enabled {
        let endpoint = Arc::new(PrometheusEndpoint::new(MetricsCollector::new(store.clone())));
        let addr = start_api_server(config.metrics.bind_addr, endpoint, store.clone())
            .with_context(|| format!("Failed to bind metrics endpoint {}", config.metrics.bind_addr))?;
        info!(bind_addr = %addr, "Metrics endpoint started");
    }

    tokio::select! {
        result = relay_lines(BufReader::new(tokio::io::stdin())) => {
            match result {
                Ok(relayed) => info!(relayed, "Input closed"),
                Err(e) => {
                    error!(fatal = true, error = %e, "Relay failed");
                    return Err(e.into());
                }
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!(counts = ?store.counts().levels, "Stopped");
    Ok(())
}

/// Use the explicit path if given, else `logcount.toml` if present, else defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(Path::new(DEFAULT_CONFIG)),
        None => Ok(Config::default()),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
