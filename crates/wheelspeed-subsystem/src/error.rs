//! Error types for subsystem construction and configuration.

use thiserror::Error;
use wheelspeed_calibration::CalibrationError;
use wheelspeed_detector::DetectorError;
use wheelspeed_uds::DiagnosticError;

/// Subsystem errors.
#[derive(Debug, Error)]
pub enum SubsystemError {
    /// Invalid subsystem-level configuration.
    #[error("Invalid subsystem configuration: {0}")]
    InvalidConfiguration(String),

    /// Detector rejected its parameters.
    #[error(transparent)]
    Detector(#[from] DetectorError),

    /// Calibration manager error.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Diagnostic layer error.
    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),

    /// JSON configuration could not be parsed.
    #[error("JSON configuration error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration could not be parsed.
    #[error("YAML configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SubsystemError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Result alias for subsystem operations.
pub type SubsystemResult<T> = Result<T, SubsystemError>;
