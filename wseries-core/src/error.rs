//! Error types for the WSeries system

use thiserror::Error;

use crate::config::ValidationErrors;

/// Core error type for WSeries operations
#[derive(Error, Debug)]
pub enum WSeriesError {
    /// Daemon settings errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body could not be parsed
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Well-formed candidate failed validation
    #[error(transparent)]
    ValidationRejected(#[from] ValidationErrors),

    /// Store write failed
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for WSeries operations
pub type Result<T> = std::result::Result<T, WSeriesError>;

impl From<serde_json::Error> for WSeriesError {
    fn from(err: serde_json::Error) -> Self {
        WSeriesError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RejectReason, Rejection};

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: WSeriesError = json_err.into();

        match err {
            WSeriesError::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: WSeriesError = io_err.into();

        match err {
            WSeriesError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = WSeriesError::Config("bad port".to_string());
        assert_eq!(format!("{}", err), "Configuration error: bad port");

        let err = WSeriesError::MalformedInput("expected value at line 1".to_string());
        assert_eq!(
            format!("{}", err),
            "Malformed input: expected value at line 1"
        );

        let err = WSeriesError::Persistence("disk full".to_string());
        assert_eq!(format!("{}", err), "Persistence failure: disk full");

        let err: WSeriesError = ValidationErrors(vec![Rejection {
            field: "dc.pwm",
            reason: RejectReason::PwmOutOfRange(150),
        }])
        .into();
        assert_eq!(
            format!("{}", err),
            "configuration rejected: dc.pwm: pwm out of range: 150 (must be 0-100)"
        );
    }
}
