//! Persistence store for the runtime configuration
//!
//! The whole record is persisted as one JSON blob under a namespaced key.
//! There are no partial-field writes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;
use wseries_core::{RuntimeConfig, WSeriesError};

/// Result of reading the stored configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LoadOutcome {
    /// A document that parsed as a record
    Loaded(RuntimeConfig),
    /// Nothing stored, or an empty blob
    Absent,
    /// Stored bytes that could not be read or parsed
    Corrupt(String),
}

impl LoadOutcome {
    fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return LoadOutcome::Absent;
        }
        match RuntimeConfig::from_json(bytes) {
            Ok(config) => LoadOutcome::Loaded(config),
            Err(e) => LoadOutcome::Corrupt(e.to_string()),
        }
    }
}

/// Durable storage for a single configuration document.
#[async_trait]
pub(crate) trait ConfigStore: Send + Sync {
    /// Read the stored document.
    async fn load(&self) -> LoadOutcome;

    /// Overwrite the stored document with `config`.
    async fn save(&self, config: &RuntimeConfig) -> wseries_core::Result<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// File-backed store: `<data_dir>/<namespace>/<key>.json`.
pub(crate) struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for `namespace`/`key` under `data_dir`.
    pub fn new(data_dir: &Path, namespace: &str, key: &str) -> Self {
        Self {
            path: data_dir.join(namespace).join(format!("{}.json", key)),
        }
    }

    /// Location of the stored document.
    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write content atomically (write to temp, sync, then rename).
    async fn write_atomic(&self, content: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn load(&self) -> LoadOutcome {
        match fs::read(&self.path).await {
            Ok(bytes) => LoadOutcome::from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LoadOutcome::Absent,
            Err(e) => LoadOutcome::Corrupt(format!("Failed to read {}: {}", self.describe(), e)),
        }
    }

    async fn save(&self, config: &RuntimeConfig) -> wseries_core::Result<()> {
        let content = config.to_json()?;

        self.write_atomic(&content).await.map_err(|e| {
            WSeriesError::Persistence(format!("Failed to write {}: {}", self.describe(), e))
        })?;

        debug!("Saved runtime configuration to {}", self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store for ephemeral runs and tests.
#[derive(Default)]
pub(crate) struct MemoryStore {
    blob: Mutex<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `bytes`.
    #[cfg(test)]
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Mutex::new(Some(bytes.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent saves fail, simulating a flash write error.
    #[cfg(test)]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored bytes.
    #[cfg(test)]
    pub async fn bytes(&self) -> Option<Vec<u8>> {
        self.blob.lock().await.clone()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load(&self) -> LoadOutcome {
        match self.blob.lock().await.as_deref() {
            Some(bytes) => LoadOutcome::from_bytes(bytes),
            None => LoadOutcome::Absent,
        }
    }

    async fn save(&self, config: &RuntimeConfig) -> wseries_core::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WSeriesError::Persistence(
                "memory store rejected write".to_string(),
            ));
        }
        let content = config.to_json()?;
        *self.blob.lock().await = Some(content);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
