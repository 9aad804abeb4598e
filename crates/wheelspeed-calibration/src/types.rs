//! Calibration request and outcome types.

use serde::{Deserialize, Serialize};
use wheelspeed_types::WheelPosition;

use crate::{CalibrationError, CalibrationResult};

/// Reference speed used by automatically scheduled sessions (km/h).
pub const AUTO_CALIBRATION_REFERENCE_KMH: f32 = 50.0;

/// Duration of automatically scheduled sessions (ms).
pub const AUTO_CALIBRATION_DURATION_MS: u32 = 10_000;

/// How a calibration was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CalibrationMethod {
    /// Entered by a technician.
    #[default]
    Manual = 0,
    /// Scheduled by the periodic sweep.
    Automatic = 1,
    /// Compared against a known reference speed.
    ReferenceBased = 2,
    /// Compared against satellite ground speed.
    GpsBased = 3,
    /// Restored to factory defaults.
    FactoryReset = 4,
}

impl CalibrationMethod {
    /// Numeric code of this method.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Lifecycle state of a calibration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CalibrationState {
    /// No session.
    #[default]
    Idle = 0,
    /// Accepted, starts on the next tick.
    Requested = 1,
    /// Collecting samples.
    InProgress = 2,
    /// Finished with a usable estimate.
    Completed = 3,
    /// Finished without a usable estimate.
    Failed = 4,
    /// Stopped by request.
    Cancelled = 5,
}

impl CalibrationState {
    /// Numeric code of this state.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether a session in this state is active.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Requested | Self::InProgress)
    }

    /// Whether this state ends a session.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Result code attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum SessionResult {
    /// Success.
    #[default]
    Ok = 0,
    /// Generic failure, including timeout and cancellation.
    NotOk = 1,
    /// Request parameter rejected.
    InvalidParameter = 2,
    /// Correction factor outside the configured bounds.
    OutOfRange = 3,
    /// Non-volatile storage failed.
    PersistenceError = 4,
    /// Estimate did not pass validation.
    ValidationFailed = 5,
    /// Session still running.
    InProgress = 6,
}

impl SessionResult {
    /// Numeric code of this result.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Parameters of a calibration session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRequest {
    /// Wheel to calibrate.
    pub wheel: WheelPosition,
    /// Calibration method.
    pub method: CalibrationMethod,
    /// Trusted reference speed (km/h).
    pub reference_speed_kmh: f32,
    /// Accepted accuracy loss (%).
    pub tolerance_percent: f32,
    /// Minimum collection time (ms).
    pub duration_ms: u32,
    /// Replace a session that is already running.
    pub force: bool,
}

impl CalibrationRequest {
    /// Request with a 2 % tolerance and a 10 s collection window.
    pub fn new(wheel: WheelPosition, method: CalibrationMethod, reference_speed_kmh: f32) -> Self {
        Self {
            wheel,
            method,
            reference_speed_kmh,
            tolerance_percent: 2.0,
            duration_ms: AUTO_CALIBRATION_DURATION_MS,
            force: false,
        }
    }

    /// Request issued by the automatic sweep.
    pub fn automatic(wheel: WheelPosition, tolerance_percent: f32) -> Self {
        Self::new(wheel, CalibrationMethod::Automatic, AUTO_CALIBRATION_REFERENCE_KMH)
            .with_tolerance(tolerance_percent)
    }

    /// Set the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance_percent: f32) -> Self {
        self.tolerance_percent = tolerance_percent;
        self
    }

    /// Set the collection window.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Allow this request to replace a running session.
    #[must_use]
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Validate request parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference speed is not positive, the tolerance
    /// is outside `(0, 100]` or the duration is zero.
    pub fn validate(&self) -> CalibrationResult<()> {
        if !(self.reference_speed_kmh.is_finite() && self.reference_speed_kmh > 0.0) {
            return Err(CalibrationError::invalid_parameter(
                "reference_speed_kmh",
                "must be a positive finite number",
            ));
        }
        if !(self.tolerance_percent > 0.0 && self.tolerance_percent <= 100.0) {
            return Err(CalibrationError::invalid_parameter(
                "tolerance_percent",
                "must be in (0, 100]",
            ));
        }
        if self.duration_ms == 0 {
            return Err(CalibrationError::invalid_parameter(
                "duration_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Plausibility verdict for a wheel's live calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationValidation {
    /// Factor within the configured bounds and marked valid.
    pub valid: bool,
    /// `(1 - |factor - 1|) * 100`, never negative.
    pub accuracy_percent: f32,
}
