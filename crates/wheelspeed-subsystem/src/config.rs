//! Layered subsystem configuration.

use core::time::Duration;
use serde::{Deserialize, Serialize};
use wheelspeed_calibration::CalibrationConfig;
use wheelspeed_detector::DetectionParameters;
use wheelspeed_uds::DiagnosticConfig;

use crate::{SubsystemError, SubsystemResult};

/// Configuration for the whole subsystem.
///
/// Every section is optional in a config file; missing fields take their
/// defaults.
///
/// ```rust
/// use wheelspeed_subsystem::SubsystemConfig;
///
/// let config = SubsystemConfig::from_json_str(r#"{ "cycle_period_ms": 10 }"#)?;
/// assert_eq!(config.cycle_period_ms, 10);
/// assert_eq!(config.diagnostics.session_timeout_ms, 5_000);
/// # Ok::<(), wheelspeed_subsystem::SubsystemError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsystemConfig {
    /// Period of the cyclic tick (ms).
    pub cycle_period_ms: u32,
    /// Detector thresholds.
    pub detection: DetectionParameters,
    /// Calibration manager settings.
    pub calibration: CalibrationConfig,
    /// Diagnostic server settings.
    pub diagnostics: DiagnosticConfig,
}

impl Default for SubsystemConfig {
    fn default() -> Self {
        Self {
            cycle_period_ms: 20,
            detection: DetectionParameters::default(),
            calibration: CalibrationConfig::default(),
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl SubsystemConfig {
    /// Cycle period as a duration.
    pub fn cycle_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.cycle_period_ms))
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first section error found.
    pub fn validate(&self) -> SubsystemResult<()> {
        if self.cycle_period_ms == 0 {
            return Err(SubsystemError::invalid_configuration(
                "cycle_period_ms must be greater than 0",
            ));
        }
        self.detection.validate()?;
        self.calibration.validate()?;
        self.diagnostics.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or validate.
    pub fn from_json_str(json: &str) -> SubsystemResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        tracing::debug!(?config, "Loaded JSON configuration");
        Ok(config)
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or validate.
    pub fn from_yaml_str(yaml: &str) -> SubsystemResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        tracing::debug!(?config, "Loaded YAML configuration");
        Ok(config)
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> SubsystemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Start building a configuration from the defaults.
    pub fn builder() -> SubsystemConfigBuilder {
        SubsystemConfigBuilder::default()
    }
}

/// Builder for [`SubsystemConfig`].
#[derive(Debug, Clone, Default)]
pub struct SubsystemConfigBuilder {
    config: SubsystemConfig,
}

impl SubsystemConfigBuilder {
    /// Set the cycle period.
    #[must_use]
    pub fn cycle_period_ms(mut self, ms: u32) -> Self {
        self.config.cycle_period_ms = ms;
        self
    }

    /// Set the detector parameters.
    #[must_use]
    pub fn detection(mut self, detection: DetectionParameters) -> Self {
        self.config.detection = detection;
        self
    }

    /// Set the calibration configuration.
    #[must_use]
    pub fn calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.config.calibration = calibration;
        self
    }

    /// Set the S3 session timeout.
    #[must_use]
    pub fn session_timeout_ms(mut self, ms: u32) -> Self {
        self.config.diagnostics.session_timeout_ms = ms;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> SubsystemResult<SubsystemConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheelspeed_test_helpers::prelude::*;

    #[test]
    fn test_empty_documents_take_defaults() -> TestResult {
        assert_eq!(SubsystemConfig::from_json_str("{}")?, SubsystemConfig::default());
        assert_eq!(SubsystemConfig::from_yaml_str("{}")?, SubsystemConfig::default());
        Ok(())
    }

    #[test]
    fn test_yaml_nested_sections() -> TestResult {
        let yaml = "\
cycle_period_ms: 10
detection:
  debounce_time_ms: 60
calibration:
  min_samples: 20
diagnostics:
  session_timeout_ms: 2000
";
        let config = SubsystemConfig::from_yaml_str(yaml)?;
        assert_eq!(config.cycle_period(), Duration::from_millis(10));
        assert_eq!(config.detection.debounce_time_ms, 60);
        assert_eq!(config.calibration.min_samples, 20);
        assert_eq!(config.calibration.max_samples, 1_000);
        assert_eq!(config.diagnostics.session_timeout_ms, 2_000);
        Ok(())
    }

    #[test]
    fn test_invalid_sections_are_rejected() {
        assert!(matches!(
            SubsystemConfig::from_json_str(r#"{ "cycle_period_ms": 0 }"#),
            Err(SubsystemError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SubsystemConfig::from_json_str(r#"{ "calibration": { "min_samples": 0 } }"#),
            Err(SubsystemError::Calibration(_))
        ));
        assert!(matches!(
            SubsystemConfig::from_json_str(r#"{ "diagnostics": { "session_timeout_ms": 0 } }"#),
            Err(SubsystemError::Diagnostic(_))
        ));
        assert!(matches!(
            SubsystemConfig::from_yaml_str("cycle_period_ms: [1, 2]"),
            Err(SubsystemError::Yaml(_))
        ));
    }

    #[test]
    fn test_json_round_trip() -> TestResult {
        let config = SubsystemConfig::builder()
            .cycle_period_ms(25)
            .session_timeout_ms(3_000)
            .build()?;
        let json = config.to_json_string()?;
        assert_eq!(SubsystemConfig::from_json_str(&json)?, config);
        Ok(())
    }
}
