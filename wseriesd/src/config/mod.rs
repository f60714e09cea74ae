//! Configuration management module
//!
//! Static daemon settings (TOML) plus the runtime configuration service and
//! the store it persists through.

mod service;
mod store;

pub(crate) use service::{BootSource, ConfigService};
pub(crate) use store::{ConfigStore, FileStore, MemoryStore};

use std::path::Path;
use tokio::fs;
use tracing::{debug, info};
use wseries_core::{Result, StaticConfig, WSeriesError};

/// Load static config from TOML file, creating with defaults if missing.
pub(crate) async fn load_static_config(path: &Path) -> Result<StaticConfig> {
    if !path.exists() {
        info!(
            "Static config not found at {}. Creating with defaults.",
            path.display()
        );

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                WSeriesError::Config(format!(
                    "Failed to create config directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let config = StaticConfig::default();
        let toml_str = config
            .to_toml()
            .map_err(|e| WSeriesError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, &toml_str)
            .await
            .map_err(|e| WSeriesError::Config(format!("Failed to write config file: {}", e)))?;

        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| WSeriesError::Config(format!("Failed to read config file: {}", e)))?;

    let config = StaticConfig::from_toml(&content)
        .map_err(|e| WSeriesError::Config(format!("Failed to parse config file: {}", e)))?;

    debug!("--- Static Config ---");
    debug!("  Data directory: {}", config.data_dir.display());
    debug!("  Bind: {}:{}", config.server.bind, config.server.port);
    debug!("  Telemetry interval: {}ms", config.server.telemetry_interval_ms);
    debug!(
        "  Store: {}/{}",
        config.storage.namespace, config.storage.key
    );
    debug!("---------------------");

    Ok(config)
}
