//! Configuration service
//!
//! Sole owner of the live [`RuntimeConfig`]. All reads go through
//! [`ConfigService::snapshot`], all writes through [`ConfigService::update`].

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use wseries_core::config::{advisories, validate, Advisory};
use wseries_core::{RuntimeConfig, Section, SectionUpdate};

use super::store::{ConfigStore, LoadOutcome};

/// Where the live record came from at boot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BootSource {
    /// Loaded from the store and validated
    Store,
    /// Store was empty
    DefaultsAbsent,
    /// Store held unparseable data
    DefaultsCorrupt(String),
    /// Store held a record that failed validation
    DefaultsInvalid(String),
}

/// What happened to the store after an accepted update.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Persistence {
    /// Record written
    Saved,
    /// Nothing changed and the store already matches
    Unchanged,
    /// Write failed; the in-memory record is still updated
    Failed(String),
}

/// Result of an accepted update.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UpdateOutcome {
    /// Section that was replaced
    pub section: Section,
    /// Store result
    pub persistence: Persistence,
    /// Sensor coverage advisories for the new record
    pub advisories: Vec<Advisory>,
}

impl UpdateOutcome {
    /// Whether the store now holds the committed record.
    pub fn persisted(&self) -> bool {
        !matches!(self.persistence, Persistence::Failed(_))
    }

    /// Warnings to surface to the caller.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Persistence::Failed(reason) = &self.persistence {
            warnings.push(format!("configuration applied but not persisted: {}", reason));
        }
        warnings.extend(self.advisories.iter().map(ToString::to_string));
        warnings
    }
}

struct LiveState {
    config: RuntimeConfig,
    /// Whether the store holds exactly `config`
    in_sync: bool,
}

/// Owns the live configuration and mediates every read and write.
pub(crate) struct ConfigService {
    state: RwLock<LiveState>,
    store: Arc<dyn ConfigStore>,
    boot_source: BootSource,
}

impl ConfigService {
    /// Load the record from `store`, falling back to defaults.
    ///
    /// A loaded record is validated before it is trusted. Defaults are never
    /// written back; the store is only touched by a later accepted update.
    pub async fn initialize(store: Arc<dyn ConfigStore>) -> Self {
        info!("Loading runtime configuration from {}", store.describe());

        let (config, boot_source) = match store.load().await {
            LoadOutcome::Loaded(config) => match validate(&config) {
                Ok(()) => (config, BootSource::Store),
                Err(e) => {
                    warn!("Stored configuration is invalid ({}). Using defaults.", e);
                    (RuntimeConfig::default(), BootSource::DefaultsInvalid(e.to_string()))
                }
            },
            LoadOutcome::Absent => {
                info!("No stored configuration. Using defaults.");
                (RuntimeConfig::default(), BootSource::DefaultsAbsent)
            }
            LoadOutcome::Corrupt(reason) => {
                warn!("Stored configuration is corrupt ({}). Using defaults.", reason);
                (RuntimeConfig::default(), BootSource::DefaultsCorrupt(reason))
            }
        };

        for advisory in advisories(&config) {
            warn!("{}", advisory);
        }
        debug_config(&config);

        Self {
            state: RwLock::new(LiveState {
                config,
                in_sync: boot_source == BootSource::Store,
            }),
            store,
            boot_source,
        }
    }

    /// How the live record was obtained at boot.
    pub fn boot_source(&self) -> &BootSource {
        &self.boot_source
    }

    /// Copy of the live record.
    pub async fn snapshot(&self) -> RuntimeConfig {
        self.state.read().await.config.clone()
    }

    /// Replace one section, validate the whole result, commit, then persist.
    ///
    /// The write lock is held throughout, so concurrent updates apply one at
    /// a time. A failed save does not roll back the in-memory commit.
    ///
    /// # Errors
    ///
    /// Returns [`wseries_core::WSeriesError::ValidationRejected`] if the
    /// resulting record is invalid; nothing is changed or written.
    pub async fn update(&self, update: SectionUpdate) -> wseries_core::Result<UpdateOutcome> {
        let section = update.section();
        let mut state = self.state.write().await;

        let candidate = update.applied(&state.config);
        if let Err(e) = validate(&candidate) {
            info!("Rejected {} update: {}", section, e);
            return Err(e.into());
        }

        let changed = candidate != state.config;
        state.config = candidate;

        let persistence = if !changed && state.in_sync {
            debug!("{} update changed nothing, skipping store write", section);
            Persistence::Unchanged
        } else {
            match self.store.save(&state.config).await {
                Ok(()) => {
                    state.in_sync = true;
                    Persistence::Saved
                }
                Err(e) => {
                    warn!("Applied {} update but failed to persist it: {}", section, e);
                    state.in_sync = false;
                    Persistence::Failed(e.to_string())
                }
            }
        };

        let advisories = advisories(&state.config);
        for advisory in &advisories {
            warn!("{}", advisory);
        }
        info!("Applied {} update", section);

        Ok(UpdateOutcome {
            section,
            persistence,
            advisories,
        })
    }
}

/// Print configuration to debug log
fn debug_config(config: &RuntimeConfig) {
    debug!("--- Runtime Config ---");
    debug!("  Backend: {}", config.backend);
    debug!("  AC: {:?}", config.ac);
    debug!("  DC: {:?}", config.dc);
    debug!("  Supercap: {:?}", config.supercap);
    debug!("  Sensors: {:?}", config.sensors);
    debug!("  Guards: {:?}", config.guards);
    debug!("  Auto-trigger: {:?}", config.auto_trigger);
    debug!("  Active slot: {}", config.active_slot);
    debug!("----------------------");
}
