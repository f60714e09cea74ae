//! Configuration types for WSeries
//!
//! # Architecture
//!
//! Configuration is split into:
//! - [`RuntimeConfig`] - the controller's live configuration record, mutable
//!   via API one [`Section`] at a time and persisted as a single JSON document
//! - [`StaticConfig`] - daemon settings (bind address, store location,
//!   advertised capabilities), loaded once at startup from TOML
//!
//! Candidate records are checked with [`validate`] before they replace the
//! live record.

mod paths;
mod record;
mod section;
mod static_config;
pub mod validate;

pub use paths::{default_config_path, default_data_dir};
pub use record::{
    AcParams, AutoTriggerConfig, Backend, DcParams, ElectricalParams, GuardConfig, RuntimeConfig,
    SensorSet, SupercapParams,
};
pub use section::{Section, SectionUpdate};
pub use static_config::{SensorPresence, ServerConfig, StaticConfig, StorageConfig};
pub use validate::{advisories, validate, Advisory, RejectReason, Rejection, ValidationErrors};
