//! Error types for calibration operations.

use thiserror::Error;
use wheelspeed_types::{ProviderError, StoreError, WheelPosition};

use crate::{CalibrationState, SessionResult};

/// Errors that can occur during calibration operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// A session is already running for the wheel.
    #[error("Calibration already in progress for {0}")]
    InProgress(WheelPosition),

    /// The wheel has no active session.
    #[error("No active calibration session for {0}")]
    NotActive(WheelPosition),

    /// The session cannot be applied in its current state.
    #[error("Calibration for {wheel} cannot be applied (state {state:?}, result {result:?})")]
    NotApplicable {
        /// Wheel.
        wheel: WheelPosition,
        /// Session state.
        state: CalibrationState,
        /// Session result.
        result: SessionResult,
    },

    /// A request parameter is outside its allowed range.
    #[error("Invalid calibration parameter '{name}': {reason}")]
    InvalidParameter {
        /// Field name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A correction factor outside the configured bounds.
    #[error("Correction factor {factor} outside [{min}, {max}]")]
    OutOfRange {
        /// Rejected factor.
        factor: f32,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// Invalid manager configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Calibration blob could not be encoded or decoded.
    #[error("Calibration encoding failed for {wheel}: {reason}")]
    Encoding {
        /// Wheel.
        wheel: WheelPosition,
        /// Codec message.
        reason: String,
    },

    /// The sensor layer refused a request.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Non-volatile storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CalibrationError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an encoding error.
    #[must_use]
    pub fn encoding(wheel: WheelPosition, reason: impl Into<String>) -> Self {
        Self::Encoding {
            wheel,
            reason: reason.into(),
        }
    }

    /// Session result code that best describes this error.
    pub fn session_result(&self) -> SessionResult {
        match self {
            Self::InProgress(_) => SessionResult::InProgress,
            Self::InvalidParameter { .. } | Self::InvalidConfiguration(_) => {
                SessionResult::InvalidParameter
            }
            Self::OutOfRange { .. } => SessionResult::OutOfRange,
            Self::Store(_) | Self::Encoding { .. } => SessionResult::PersistenceError,
            Self::NotActive(_) | Self::NotApplicable { .. } | Self::Provider(_) => {
                SessionResult::NotOk
            }
        }
    }
}

/// Result alias for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;
