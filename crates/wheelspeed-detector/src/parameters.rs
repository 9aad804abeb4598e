//! Detection thresholds and switches.

use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::{DetectorError, DetectorResult};

/// Thresholds, debounce window and per-check enable flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParameters {
    /// Maximum distance from the median wheel speed (km/h).
    pub speed_difference_threshold_kmh: f32,
    /// Maximum plausible wheel acceleration while not braking (m/s²).
    pub acceleration_threshold_mps2: f32,
    /// Maximum correction-factor drift from unity (%).
    pub calibration_drift_threshold_percent: f32,
    /// Time a condition must persist before it is confirmed (ms).
    pub debounce_time_ms: u32,
    /// Consecutive detections after which a wheel counts as persistently faulty.
    pub max_consecutive_errors: u8,
    /// Run the speed plausibility check.
    pub enable_speed_plausibility: bool,
    /// Run the acceleration plausibility check.
    pub enable_acceleration_check: bool,
    /// Run the calibration drift check.
    pub enable_calibration_check: bool,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            speed_difference_threshold_kmh: 30.0,
            acceleration_threshold_mps2: 15.0,
            calibration_drift_threshold_percent: 10.0,
            debounce_time_ms: 100,
            max_consecutive_errors: 5,
            enable_speed_plausibility: true,
            enable_acceleration_check: true,
            enable_calibration_check: true,
        }
    }
}

impl DetectionParameters {
    /// Tighter thresholds for test benches.
    pub fn conservative() -> Self {
        Self {
            speed_difference_threshold_kmh: 20.0,
            acceleration_threshold_mps2: 10.0,
            calibration_drift_threshold_percent: 5.0,
            debounce_time_ms: 60,
            max_consecutive_errors: 3,
            ..Self::default()
        }
    }

    /// Looser thresholds for rough-road validation.
    pub fn relaxed() -> Self {
        Self {
            speed_difference_threshold_kmh: 45.0,
            acceleration_threshold_mps2: 25.0,
            calibration_drift_threshold_percent: 15.0,
            debounce_time_ms: 200,
            max_consecutive_errors: 10,
            ..Self::default()
        }
    }

    /// Debounce window as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_time_ms))
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a threshold is not a positive finite number or a
    /// count is zero.
    pub fn validate(&self) -> DetectorResult<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if !positive(self.speed_difference_threshold_kmh) {
            return Err(DetectorError::invalid_parameter(
                "speed_difference_threshold_kmh",
                "must be a positive finite number",
            ));
        }
        if !positive(self.acceleration_threshold_mps2) {
            return Err(DetectorError::invalid_parameter(
                "acceleration_threshold_mps2",
                "must be a positive finite number",
            ));
        }
        if !positive(self.calibration_drift_threshold_percent) {
            return Err(DetectorError::invalid_parameter(
                "calibration_drift_threshold_percent",
                "must be a positive finite number",
            ));
        }
        if self.debounce_time_ms == 0 {
            return Err(DetectorError::invalid_parameter(
                "debounce_time_ms",
                "must be greater than 0",
            ));
        }
        if self.max_consecutive_errors == 0 {
            return Err(DetectorError::invalid_parameter(
                "max_consecutive_errors",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Create a parameter builder starting from the defaults.
    #[must_use]
    pub fn builder() -> DetectionParametersBuilder {
        DetectionParametersBuilder::default()
    }
}

/// Builder for [`DetectionParameters`].
#[derive(Debug, Default)]
pub struct DetectionParametersBuilder {
    params: DetectionParameters,
}

impl DetectionParametersBuilder {
    /// Set the speed-difference threshold (km/h).
    #[must_use]
    pub fn speed_difference_threshold_kmh(mut self, kmh: f32) -> Self {
        self.params.speed_difference_threshold_kmh = kmh;
        self
    }

    /// Set the acceleration threshold (m/s²).
    #[must_use]
    pub fn acceleration_threshold_mps2(mut self, mps2: f32) -> Self {
        self.params.acceleration_threshold_mps2 = mps2;
        self
    }

    /// Set the calibration drift threshold (%).
    #[must_use]
    pub fn calibration_drift_threshold_percent(mut self, percent: f32) -> Self {
        self.params.calibration_drift_threshold_percent = percent;
        self
    }

    /// Set the debounce window (ms).
    #[must_use]
    pub fn debounce_time_ms(mut self, ms: u32) -> Self {
        self.params.debounce_time_ms = ms;
        self
    }

    /// Set the consecutive-error cap.
    #[must_use]
    pub fn max_consecutive_errors(mut self, count: u8) -> Self {
        self.params.max_consecutive_errors = count;
        self
    }

    /// Enable or disable the speed plausibility check.
    #[must_use]
    pub fn speed_plausibility(mut self, enabled: bool) -> Self {
        self.params.enable_speed_plausibility = enabled;
        self
    }

    /// Enable or disable the acceleration check.
    #[must_use]
    pub fn acceleration_check(mut self, enabled: bool) -> Self {
        self.params.enable_acceleration_check = enabled;
        self
    }

    /// Enable or disable the calibration drift check.
    #[must_use]
    pub fn calibration_check(mut self, enabled: bool) -> Self {
        self.params.enable_calibration_check = enabled;
        self
    }

    /// Build the parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn build(self) -> DetectorResult<DetectionParameters> {
        self.params.validate()?;
        Ok(self.params)
    }
}
