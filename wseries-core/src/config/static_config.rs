//! Static daemon settings loaded once at startup
//!
//! This configuration is read-only after the daemon starts. The runtime
//! configuration record lives in the persistence store, not here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::paths::default_data_dir;

/// HTTP/WebSocket server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub bind: String,
    /// Listen port
    pub port: u16,
    /// Telemetry push period in milliseconds
    #[serde(default = "default_telemetry_interval_ms")]
    pub telemetry_interval_ms: u64,
    /// Directory holding the web UI, served at `/` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

fn default_telemetry_interval_ms() -> u64 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            telemetry_interval_ms: default_telemetry_interval_ms(),
            static_dir: None,
        }
    }
}

/// Persistence store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Namespace the configuration blob lives under
    pub namespace: String,
    /// Key of the configuration blob within the namespace
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: "wseries".to_string(),
            key: "runtime".to_string(),
        }
    }
}

/// Sensor presence advertised by `/api/capabilities`.
///
/// Presence is declared per board build; nothing is probed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorPresence {
    /// ZMPT101B fitted
    pub zmpt_present: bool,
    /// ACS712 fitted
    pub acs_present: bool,
    /// INA219 fitted
    pub ina_present: bool,
    /// ADS1115 fitted
    pub ads_present: bool,
}

impl Default for SensorPresence {
    fn default() -> Self {
        Self {
            zmpt_present: true,
            acs_present: true,
            ina_present: false,
            ads_present: false,
        }
    }
}

/// Static configuration for the WSeries daemon.
///
/// Located at `~/.config/wseries/config.toml` by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticConfig {
    /// Directory for the persistence store
    ///
    /// Defaults to `~/.local/share/wseries` (XDG data directory).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Store namespace and key
    #[serde(default)]
    pub storage: StorageConfig,

    /// Advertised sensor presence
    #[serde(default)]
    pub capabilities: SensorPresence,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            capabilities: SensorPresence::default(),
        }
    }
}

impl StaticConfig {
    /// Parse StaticConfig from TOML string.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize StaticConfig to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
