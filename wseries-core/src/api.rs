//! API models for the WSeries control-plane API
//!
//! Request bodies mirror the device's JSON contract; each converts into a
//! [`SectionUpdate`] for the configuration service.

use crate::config::{
    validate::parse_backend, AcParams, AutoTriggerConfig, Backend, DcParams, GuardConfig,
    Rejection, SectionUpdate, SensorPresence, SensorSet, SupercapParams, ValidationErrors,
};
use serde::{Deserialize, Serialize};

/// Firmware identifier advertised by `/api/capabilities`.
pub const FIRMWARE_ID: &str = concat!("wseries-", env!("CARGO_PKG_VERSION"));

/// `POST /api/config/backend` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRequest {
    /// Backend name, checked against the known backends
    pub backend: String,
    /// AC parameters
    pub ac: AcParams,
    /// DC parameters
    pub dc: DcParams,
    /// Supercapacitor parameters
    pub sc: SupercapParams,
}

impl BackendRequest {
    /// Convert into an electrical section update.
    ///
    /// # Errors
    ///
    /// Rejects the whole update if `backend` is not a known backend name.
    pub fn into_update(self) -> Result<SectionUpdate, ValidationErrors> {
        Ok(SectionUpdate::Electrical {
            backend: parse_backend(&self.backend)?,
            ac: self.ac,
            dc: self.dc,
            supercap: self.sc,
        })
    }
}

/// `POST /api/config/sensors` body.
///
/// `web_beep` is read from inside `sensors`, the same place it is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorsRequest {
    /// Sensor toggles
    pub sensors: SensorSet,
}

impl From<SensorsRequest> for SectionUpdate {
    fn from(req: SensorsRequest) -> Self {
        SectionUpdate::Sensors(req.sensors)
    }
}

/// `POST /api/config/guards` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardsRequest {
    /// Safety guards
    pub guards: GuardConfig,
}

impl From<GuardsRequest> for SectionUpdate {
    fn from(req: GuardsRequest) -> Self {
        SectionUpdate::Guards(req.guards)
    }
}

/// Per-backend auto-trigger parameters; only AC is defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoTriggerGroups {
    /// AC auto-trigger parameters
    pub ac: AutoTriggerConfig,
}

/// `POST /api/config/auto_trigger` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoTriggerRequest {
    /// Auto-trigger groups
    pub aut: AutoTriggerGroups,
}

impl From<AutoTriggerRequest> for SectionUpdate {
    fn from(req: AutoTriggerRequest) -> Self {
        SectionUpdate::AutoTrigger(req.aut.ac)
    }
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable summary
    pub error: String,
    /// Field-level rejections, present for validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejections: Vec<Rejection>,
}

/// Body returned when an update was applied but raised warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWarnings {
    /// Warning messages
    pub warnings: Vec<String>,
}

/// `GET /api/capabilities` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    /// Firmware identifier
    pub fw: String,
    /// Supported backends
    pub backends: Vec<Backend>,
    /// Declared sensor presence
    pub sensors: SensorPresence,
}

impl CapabilitiesResponse {
    /// Advertisement for a board with the given sensor presence.
    pub fn new(sensors: SensorPresence) -> Self {
        Self {
            fw: FIRMWARE_ID.to_string(),
            backends: Backend::ALL.to_vec(),
            sensors,
        }
    }
}

/// WebSocket frame type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Periodic status push
    Telemetry,
}

/// Power cycle state reported in telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleState {
    /// No cycle in progress
    Idle,
}

/// Telemetry frame pushed to WebSocket clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Frame type tag
    #[serde(rename = "type")]
    pub kind: FrameKind,
    /// Cycle state
    pub state: CycleState,
    /// Measured RMS voltage
    pub vrms: f32,
    /// Measured RMS current
    pub irms: f32,
}

impl Telemetry {
    /// Placeholder frame sent while no control loop is feeding measurements.
    pub fn idle() -> Self {
        Self {
            kind: FrameKind::Telemetry,
            state: CycleState::Idle,
            vrms: 0.0,
            irms: 0.0,
        }
    }
}
