//! Whole-section replacement of the runtime configuration

use serde::Serialize;
use std::fmt;

use super::record::{
    AcParams, AutoTriggerConfig, Backend, DcParams, GuardConfig, RuntimeConfig, SensorSet,
    SupercapParams,
};

/// Independently replaceable part of [`RuntimeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Backend selection plus the AC, DC and supercap groups
    Electrical,
    /// Sensor toggles
    Sensors,
    /// Safety guards
    Guards,
    /// Auto-trigger parameters
    AutoTrigger,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Electrical => "electrical",
            Section::Sensors => "sensors",
            Section::Guards => "guards",
            Section::AutoTrigger => "auto_trigger",
        };
        f.write_str(name)
    }
}

/// A candidate value for exactly one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    /// Replace backend selection and all three parameter groups
    Electrical {
        /// New active backend
        backend: Backend,
        /// AC parameters
        ac: AcParams,
        /// DC parameters
        dc: DcParams,
        /// Supercapacitor parameters
        supercap: SupercapParams,
    },
    /// Replace sensor toggles
    Sensors(SensorSet),
    /// Replace safety guards
    Guards(GuardConfig),
    /// Replace auto-trigger parameters
    AutoTrigger(AutoTriggerConfig),
}

impl SectionUpdate {
    /// Section this update replaces.
    pub fn section(&self) -> Section {
        match self {
            SectionUpdate::Electrical { .. } => Section::Electrical,
            SectionUpdate::Sensors(_) => Section::Sensors,
            SectionUpdate::Guards(_) => Section::Guards,
            SectionUpdate::AutoTrigger(_) => Section::AutoTrigger,
        }
    }

    /// Overwrite the matching section of `config`, leaving the rest untouched.
    pub fn apply_to(self, config: &mut RuntimeConfig) {
        match self {
            SectionUpdate::Electrical {
                backend,
                ac,
                dc,
                supercap,
            } => {
                config.backend = backend;
                config.ac = ac;
                config.dc = dc;
                config.supercap = supercap;
            }
            SectionUpdate::Sensors(sensors) => config.sensors = sensors,
            SectionUpdate::Guards(guards) => config.guards = guards,
            SectionUpdate::AutoTrigger(auto_trigger) => config.auto_trigger = auto_trigger,
        }
    }

    /// Return a copy of `config` with this update applied.
    pub fn applied(self, config: &RuntimeConfig) -> RuntimeConfig {
        let mut candidate = config.clone();
        self.apply_to(&mut candidate);
        candidate
    }
}
