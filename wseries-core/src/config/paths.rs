//! Default locations for daemon settings and the runtime record store

use std::path::PathBuf;

/// Returns the default path for the daemon's TOML settings.
///
/// `<config_dir>/wseries/config.toml`, falling back to `/etc/wseries/config.toml`
/// when the platform has no per-user config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("wseries")
        .join("config.toml")
}

/// Returns the default root for the runtime record store.
///
/// The file store keeps its document at `<data_dir>/<namespace>/<key>.json`,
/// so with the default `[storage]` section the record ends up at
/// `~/.local/share/wseries/wseries/runtime.json` on Linux
/// (`/var/lib/wseries/...` without a per-user data directory).
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/var/lib"))
        .join("wseries")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_wseries_toml() {
        assert!(default_config_path().ends_with("wseries/config.toml"));
    }

    #[test]
    fn test_store_document_lives_under_data_dir() {
        let record = default_data_dir().join("wseries").join("runtime.json");
        assert!(record.starts_with(default_data_dir()));
        assert!(record.ends_with("wseries/wseries/runtime.json"));
    }
}
