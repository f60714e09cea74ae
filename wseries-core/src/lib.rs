//! WSeries Core Library
//!
//! Configuration model, validation rules, and API types for the WSeries
//! power-delivery controller. Used by the daemon and by anything that needs
//! to read or produce the controller's configuration document.

pub mod api;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{
    default_config_path, default_data_dir, Backend, RuntimeConfig, Section, SectionUpdate,
    StaticConfig,
};
pub use error::*;
