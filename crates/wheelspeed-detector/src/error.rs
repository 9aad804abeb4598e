//! Error types for detector configuration.

use thiserror::Error;

/// Detector errors.
///
/// Detection itself never fails; only reconfiguration can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// A detection parameter is outside its allowed range.
    #[error("Invalid detection parameter '{name}': {reason}")]
    InvalidParameter {
        /// Field name.
        name: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl DetectorError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidParameter { name, reason }
    }
}

/// Result alias for detector operations.
pub type DetectorResult<T> = Result<T, DetectorError>;
