//! Calibration manager configuration.

use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::{CalibrationError, CalibrationResult};

/// Largest sample buffer a session can be configured with.
pub const MAX_SAMPLE_CAPACITY: usize = 1000;

/// Calibration manager configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Sample buffer capacity per session.
    pub max_samples: u16,
    /// Samples required before an estimate is attempted.
    pub min_samples: u16,
    /// Upper bound for an accepted correction factor.
    pub max_correction_factor: f32,
    /// Lower bound for an accepted correction factor.
    pub min_correction_factor: f32,
    /// Tolerance used by automatically scheduled sessions (%).
    pub default_tolerance_percent: f32,
    /// Hard limit on a session's runtime (ms).
    pub session_timeout_ms: u32,
    /// Run the periodic automatic sweep.
    pub enable_auto_calibration: bool,
    /// Interval between automatic sweeps (ms).
    pub auto_check_interval_ms: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_samples: 1000,
            min_samples: 50,
            max_correction_factor: 1.5,
            min_correction_factor: 0.5,
            default_tolerance_percent: 2.0,
            session_timeout_ms: 30_000,
            enable_auto_calibration: true,
            auto_check_interval_ms: 3_600_000,
        }
    }
}

impl CalibrationConfig {
    /// Session timeout as a duration.
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.session_timeout_ms))
    }

    /// Sweep interval as a duration.
    pub fn auto_check_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.auto_check_interval_ms))
    }

    /// Whether `factor` lies within `[min_correction_factor, max_correction_factor]`.
    pub fn factor_in_range(&self, factor: f32) -> bool {
        factor >= self.min_correction_factor && factor <= self.max_correction_factor
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> CalibrationResult<()> {
        if self.min_samples == 0 {
            return Err(CalibrationError::invalid_configuration(
                "min_samples must be greater than 0",
            ));
        }
        if self.min_samples > self.max_samples {
            return Err(CalibrationError::invalid_configuration(
                "min_samples must not exceed max_samples",
            ));
        }
        if usize::from(self.max_samples) > MAX_SAMPLE_CAPACITY {
            return Err(CalibrationError::invalid_configuration(format!(
                "max_samples must not exceed {MAX_SAMPLE_CAPACITY}"
            )));
        }
        if !(self.min_correction_factor.is_finite()
            && self.max_correction_factor.is_finite()
            && self.min_correction_factor > 0.0
            && self.min_correction_factor < self.max_correction_factor)
        {
            return Err(CalibrationError::invalid_configuration(
                "correction factor bounds must satisfy 0 < min < max",
            ));
        }
        if !(self.default_tolerance_percent > 0.0 && self.default_tolerance_percent <= 100.0) {
            return Err(CalibrationError::invalid_configuration(
                "default_tolerance_percent must be in (0, 100]",
            ));
        }
        if self.session_timeout_ms == 0 {
            return Err(CalibrationError::invalid_configuration(
                "session_timeout_ms must be greater than 0",
            ));
        }
        if self.auto_check_interval_ms == 0 {
            return Err(CalibrationError::invalid_configuration(
                "auto_check_interval_ms must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> CalibrationConfigBuilder {
        CalibrationConfigBuilder::default()
    }
}

/// Builder for [`CalibrationConfig`].
#[derive(Debug, Default)]
pub struct CalibrationConfigBuilder {
    config: CalibrationConfig,
}

impl CalibrationConfigBuilder {
    /// Set the sample window.
    #[must_use]
    pub fn samples(mut self, min: u16, max: u16) -> Self {
        self.config.min_samples = min;
        self.config.max_samples = max;
        self
    }

    /// Set the accepted correction-factor bounds.
    #[must_use]
    pub fn factor_range(mut self, min: f32, max: f32) -> Self {
        self.config.min_correction_factor = min;
        self.config.max_correction_factor = max;
        self
    }

    /// Set the default tolerance (%).
    #[must_use]
    pub fn default_tolerance_percent(mut self, percent: f32) -> Self {
        self.config.default_tolerance_percent = percent;
        self
    }

    /// Set the session timeout (ms).
    #[must_use]
    pub fn session_timeout_ms(mut self, ms: u32) -> Self {
        self.config.session_timeout_ms = ms;
        self
    }

    /// Enable or disable the automatic sweep.
    #[must_use]
    pub fn auto_calibration(mut self, enabled: bool) -> Self {
        self.config.enable_auto_calibration = enabled;
        self
    }

    /// Set the sweep interval (ms).
    #[must_use]
    pub fn auto_check_interval_ms(mut self, ms: u32) -> Self {
        self.config.auto_check_interval_ms = ms;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> CalibrationResult<CalibrationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
