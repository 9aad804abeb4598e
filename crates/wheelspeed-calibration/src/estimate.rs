//! Correction-factor estimation from collected samples.

use serde::{Deserialize, Serialize};

use crate::CalibrationConfig;

/// One measured/reference speed pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Speed reported by the sensor (km/h).
    pub measured_kmh: f32,
    /// Trusted reference speed (km/h).
    pub reference_kmh: f32,
}

impl CalibrationSample {
    /// Create a sample.
    pub const fn new(measured_kmh: f32, reference_kmh: f32) -> Self {
        Self {
            measured_kmh,
            reference_kmh,
        }
    }

    fn is_usable(&self) -> bool {
        self.measured_kmh > 0.0 && self.reference_kmh > 0.0
    }
}

/// Estimated calibration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEstimate {
    /// `mean(reference) / mean(measured)`.
    pub correction_factor: f32,
    /// Always `0.0` for the ratio method.
    pub offset: f32,
    /// `100 - |mean(measured) - mean(reference)| / mean(reference) * 100`.
    pub accuracy_percent: f32,
    /// Samples with both speeds positive.
    pub usable_samples: usize,
}

impl CalibrationEstimate {
    /// Estimate from samples, ignoring any pair with a non-positive speed.
    ///
    /// Returns `None` when no usable sample remains.
    pub fn from_samples(samples: &[CalibrationSample]) -> Option<Self> {
        let (count, sum_measured, sum_reference) = samples
            .iter()
            .filter(|s| s.is_usable())
            .fold((0usize, 0.0f64, 0.0f64), |(n, m, r), s| {
                (
                    n.saturating_add(1),
                    m + f64::from(s.measured_kmh),
                    r + f64::from(s.reference_kmh),
                )
            });

        if count == 0 {
            return None;
        }

        #[expect(clippy::cast_precision_loss, reason = "count never exceeds the sample buffer")]
        let n = count as f64;
        let avg_measured = sum_measured / n;
        let avg_reference = sum_reference / n;

        #[expect(clippy::cast_possible_truncation, reason = "f32 is the storage precision")]
        let correction_factor = (avg_reference / avg_measured) as f32;
        #[expect(clippy::cast_possible_truncation, reason = "f32 is the storage precision")]
        let accuracy_percent =
            (100.0 - (avg_measured - avg_reference).abs() / avg_reference * 100.0) as f32;

        Some(Self {
            correction_factor,
            offset: 0.0,
            accuracy_percent,
            usable_samples: count,
        })
    }

    /// Whether the estimate is acceptable under `config` and `tolerance_percent`.
    pub fn is_acceptable(&self, config: &CalibrationConfig, tolerance_percent: f32) -> bool {
        config.factor_in_range(self.correction_factor)
            && self.accuracy_percent >= 100.0 - tolerance_percent
    }
}
