//! Runtime configuration record
//!
//! The single configuration document the controller runs from. Field names
//! on the wire (and in the persisted blob) follow the device's JSON contract,
//! so several Rust fields carry a `serde(rename)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Power source the controller manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// AC mains
    #[serde(rename = "AC")]
    Ac,
    /// DC supply
    #[serde(rename = "DC")]
    Dc,
    /// Supercapacitor bank
    #[serde(rename = "Supercap")]
    Supercap,
}

impl Backend {
    /// Every backend, in advertisement order.
    pub const ALL: [Backend; 3] = [Backend::Ac, Backend::Dc, Backend::Supercap];

    /// Wire name of the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Ac => "AC",
            Backend::Dc => "DC",
            Backend::Supercap => "Supercap",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("unknown backend '{}'", s))
    }
}

/// AC mains parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcParams {
    /// Switch on zero crossings
    pub zero_cross: bool,
    /// Conduct for half cycles only
    pub half_cycle: bool,
}

/// DC supply parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcParams {
    /// Current limit in amps
    #[serde(rename = "i_limit")]
    pub current_limit_amps: f32,
    /// PWM duty cycle in percent (0-100)
    #[serde(rename = "pwm")]
    pub pwm_duty: u32,
}

/// Supercapacitor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupercapParams {
    /// Precharge the bank before a cycle
    #[serde(rename = "precharge")]
    pub precharge_enabled: bool,
    /// Energy limit per cycle in joules
    #[serde(rename = "joule")]
    pub energy_limit_joules: f32,
}

/// Sensor enablement toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSet {
    /// ZMPT101B mains voltage transformer
    pub zmpt: bool,
    /// ACS712 hall-effect current sensor
    pub acs712: bool,
    /// INA219 shunt voltage/current monitor
    pub ina219: bool,
    /// ADS1115 external ADC
    pub ads1115: bool,
    /// Beep in the web UI on cycle events
    pub web_beep: bool,
}

impl SensorSet {
    /// Whether any current-capable sensor is enabled.
    pub fn has_current_sense(&self) -> bool {
        self.acs712 || self.ina219 || self.ads1115
    }
}

/// Backend-independent safety ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Voltage cutoff in volts
    #[serde(rename = "v_cutoff")]
    pub voltage_cutoff_v: f32,
    /// Current guard in amps
    #[serde(rename = "i_guard")]
    pub current_guard_a: f32,
    /// Miniature-circuit-breaker style current guard
    #[serde(rename = "mcb_guard")]
    pub mcb_guard_enabled: bool,
}

/// Automatic trigger parameters (AC backend only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoTriggerConfig {
    /// Feature switch
    pub enabled: bool,
    /// Current threshold in amps RMS
    #[serde(rename = "i_thresh_arms")]
    pub current_threshold_arms: f32,
    /// Cut-in voltage in volts RMS
    #[serde(rename = "v_cutin_vrms")]
    pub voltage_cutin_vrms: f32,
    /// Settling time after threshold crossing
    pub settle_ms: u32,
    /// Minimum delay before the next trigger
    #[serde(rename = "retrig_ms")]
    pub retrigger_cooldown_ms: u32,
}

impl Default for AutoTriggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            current_threshold_arms: 1.5,
            voltage_cutin_vrms: 180.0,
            settle_ms: 60,
            retrigger_cooldown_ms: 800,
        }
    }
}

/// Parameter group of the active backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElectricalParams<'a> {
    /// AC mains is active
    Ac(&'a AcParams),
    /// DC supply is active
    Dc(&'a DcParams),
    /// Supercapacitor bank is active
    Supercap(&'a SupercapParams),
}

/// The controller's runtime configuration.
///
/// All three backend groups are kept even though only the one selected by
/// `backend` is authoritative, so switching backends does not lose tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Active power backend
    pub backend: Backend,
    /// AC parameters
    pub ac: AcParams,
    /// DC parameters
    pub dc: DcParams,
    /// Supercapacitor parameters
    #[serde(rename = "sc")]
    pub supercap: SupercapParams,
    /// Sensor toggles
    pub sensors: SensorSet,
    /// Safety guards
    pub guards: GuardConfig,
    /// Auto-trigger parameters
    ///
    /// Documents written before auto-trigger existed have no `aut` object.
    #[serde(rename = "aut", default)]
    pub auto_trigger: AutoTriggerConfig,
    /// Live configuration slot
    #[serde(rename = "slots", with = "slots")]
    pub active_slot: u8,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Ac,
            ac: AcParams {
                zero_cross: true,
                half_cycle: false,
            },
            dc: DcParams {
                current_limit_amps: 15.0,
                pwm_duty: 80,
            },
            supercap: SupercapParams {
                precharge_enabled: false,
                energy_limit_joules: 0.0,
            },
            sensors: SensorSet {
                zmpt: true,
                acs712: true,
                ina219: false,
                ads1115: false,
                web_beep: true,
            },
            guards: GuardConfig {
                voltage_cutoff_v: 180.0,
                current_guard_a: 15.0,
                mcb_guard_enabled: true,
            },
            auto_trigger: AutoTriggerConfig::default(),
            active_slot: 1,
        }
    }
}

impl RuntimeConfig {
    /// Parameter group selected by `backend`.
    pub fn active_electrical(&self) -> ElectricalParams<'_> {
        match self.backend {
            Backend::Ac => ElectricalParams::Ac(&self.ac),
            Backend::Dc => ElectricalParams::Dc(&self.dc),
            Backend::Supercap => ElectricalParams::Supercap(&self.supercap),
        }
    }

    /// Whether a control loop should run auto-trigger detection.
    ///
    /// Auto-trigger is reserved for the AC backend; on other backends the
    /// parameters are retained but inert.
    pub fn auto_trigger_armed(&self) -> bool {
        self.auto_trigger.enabled && self.backend == Backend::Ac
    }

    /// Parse a record from its JSON document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serialize the record to its compact JSON document.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

// `active_slot` is nested as `"slots": {"active": n}` on the wire.
mod slots {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Slots {
        active: u8,
    }

    pub(super) fn serialize<S>(active: &u8, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Slots { active: *active }.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        Slots::deserialize(deserializer).map(|s| s.active)
    }
}
