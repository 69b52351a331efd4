//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(&config.level)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match config.format.as_str() {
        "json" => builder
            .json()
            .try_init()
            .map_err(|e| anyhow!("Failed to install json subscriber: {e}")),
        _ => builder
            .pretty()
            .try_init()
            .map_err(|e| anyhow!("Failed to install subscriber: {e}")),
    }
}

fn default_directive(level: &str) -> String {
    format!("{level},tower_http=info,hyper=warn,reqwest=warn")
}
