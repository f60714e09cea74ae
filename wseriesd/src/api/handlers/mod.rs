//! API request handlers for the WSeries daemon.
//!
//! # Handler Modules
//!
//! - [`config`] - Runtime configuration read and per-section updates
//! - [`info`] - Root endpoint and capability advertisement
//! - [`cycle`] - Cycle trigger/abort hooks for the future control loop
//! - [`telemetry`] - WebSocket telemetry channel
//!
//! # API Structure
//!
//! Handlers accept `State<AppState>`, return `Result<_, ApiError>`, and log
//! requests with `tracing`. Update endpoints parse their body from raw bytes
//! so a missing or wrong `Content-Type` is not an error.

pub mod config;
pub mod cycle;
pub mod info;
pub mod telemetry;
