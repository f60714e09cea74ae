//! Runtime configuration validation
//!
//! Validation runs against a whole candidate record, never a single section,
//! because some rules (the MCB guard needing a current sensor) span sections.
//! Every failing field is reported, not just the first one.

use serde::{Serialize, Serializer};
use std::fmt;

use super::record::{Backend, RuntimeConfig};

/// Upper bound for `dc.pwm`.
pub const MAX_PWM_DUTY: u32 = 100;

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    /// Backend name is not one of AC, DC, Supercap
    #[error("unknown backend '{0}'")]
    UnknownBackend(String),
    /// NaN or infinite
    #[error("must be finite, got {0}")]
    NotFinite(f32),
    /// Zero or negative where strictly positive is required
    #[error("must be greater than 0, got {0}")]
    NotPositive(f32),
    /// Negative where non-negative is required
    #[error("must not be negative, got {0}")]
    Negative(f32),
    /// PWM duty outside 0-100
    #[error("pwm out of range: {0} (must be 0-{max})", max = MAX_PWM_DUTY)]
    PwmOutOfRange(u32),
    /// Cooldown shorter than settle time
    #[error("retrigger cooldown {retrig_ms} ms is shorter than settle time {settle_ms} ms")]
    CooldownBeforeSettle { settle_ms: u32, retrig_ms: u32 },
    /// MCB guard enabled without any current sensor
    #[error("guard unsatisfiable: mcb_guard needs acs712, ina219 or ads1115 enabled")]
    GuardUnsatisfiable,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Wire path of the field, e.g. `guards.v_cutoff`
    pub field: &'static str,
    /// Reason, serialized as its message
    #[serde(serialize_with = "serialize_display")]
    pub reason: RejectReason,
}

impl Rejection {
    fn new(field: &'static str, reason: RejectReason) -> Self {
        Self { field, reason }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::Display,
{
    serializer.collect_str(value)
}

/// Non-empty list of rejected fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("configuration rejected: {}", join(.0))]
pub struct ValidationErrors(pub Vec<Rejection>);

impl ValidationErrors {
    /// Rejected fields.
    pub fn rejections(&self) -> &[Rejection] {
        &self.0
    }

    /// Whether `field` is among the rejected fields.
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|r| r.field == field)
    }
}

fn join(rejections: &[Rejection]) -> String {
    rejections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolve a backend name from a request, rejecting unknown names.
pub fn parse_backend(name: &str) -> Result<Backend, ValidationErrors> {
    name.parse::<Backend>().map_err(|_| {
        ValidationErrors(vec![Rejection::new(
            "backend",
            RejectReason::UnknownBackend(name.to_string()),
        )])
    })
}

fn check_positive(errors: &mut Vec<Rejection>, field: &'static str, value: f32) {
    if !value.is_finite() {
        errors.push(Rejection::new(field, RejectReason::NotFinite(value)));
    } else if value <= 0.0 {
        errors.push(Rejection::new(field, RejectReason::NotPositive(value)));
    }
}

fn check_non_negative(errors: &mut Vec<Rejection>, field: &'static str, value: f32) {
    if !value.is_finite() {
        errors.push(Rejection::new(field, RejectReason::NotFinite(value)));
    } else if value < 0.0 {
        errors.push(Rejection::new(field, RejectReason::Negative(value)));
    }
}

/// Validate a complete candidate record.
///
/// Pure: the candidate is only read.
///
/// # Errors
///
/// Returns every rejected field if any rule fails.
pub fn validate(config: &RuntimeConfig) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    // Guards apply regardless of backend
    check_positive(&mut errors, "guards.v_cutoff", config.guards.voltage_cutoff_v);
    check_positive(&mut errors, "guards.i_guard", config.guards.current_guard_a);
    if config.guards.mcb_guard_enabled && !config.sensors.has_current_sense() {
        errors.push(Rejection::new(
            "guards.mcb_guard",
            RejectReason::GuardUnsatisfiable,
        ));
    }

    // Inactive backend groups are retained, so they are checked too
    check_non_negative(&mut errors, "dc.i_limit", config.dc.current_limit_amps);
    if config.dc.pwm_duty > MAX_PWM_DUTY {
        errors.push(Rejection::new(
            "dc.pwm",
            RejectReason::PwmOutOfRange(config.dc.pwm_duty),
        ));
    }
    check_non_negative(&mut errors, "sc.joule", config.supercap.energy_limit_joules);

    let aut = &config.auto_trigger;
    check_non_negative(&mut errors, "aut.i_thresh_arms", aut.current_threshold_arms);
    check_non_negative(&mut errors, "aut.v_cutin_vrms", aut.voltage_cutin_vrms);
    if aut.retrigger_cooldown_ms < aut.settle_ms {
        errors.push(Rejection::new(
            "aut.retrig_ms",
            RejectReason::CooldownBeforeSettle {
                settle_ms: aut.settle_ms,
                retrig_ms: aut.retrigger_cooldown_ms,
            },
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Non-blocking observation about a valid record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// AC backend active without the zmpt voltage sensor
    AcWithoutVoltageSense,
    /// DC or supercap backend active without ina219 or ads1115
    DcWithoutSense,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::AcWithoutVoltageSense => {
                f.write_str("AC backend is active but zmpt voltage sensing is disabled")
            }
            Advisory::DcWithoutSense => f.write_str(
                "DC/Supercap backend is active but neither ina219 nor ads1115 is enabled",
            ),
        }
    }
}

/// Sensor coverage advisories for the active backend.
pub fn advisories(config: &RuntimeConfig) -> Vec<Advisory> {
    let sensors = &config.sensors;
    let mut out = Vec::new();
    match config.backend {
        Backend::Ac => {
            if !sensors.zmpt {
                out.push(Advisory::AcWithoutVoltageSense);
            }
        }
        Backend::Dc | Backend::Supercap => {
            if !sensors.ina219 && !sensors.ads1115 {
                out.push(Advisory::DcWithoutSense);
            }
        }
    }
    out
}
