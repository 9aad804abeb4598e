//! Individual plausibility checks.
//!
//! Each check is a pure function over one wheel's inputs so it can be
//! exercised without a running detector.

use wheelspeed_types::{MalfunctionKind, SensorCalibration, SpeedData, WheelMap, WheelPosition};

/// Result of a check that fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finding {
    /// Classified malfunction.
    pub kind: MalfunctionKind,
    /// Magnitude that exceeded the threshold, in the check's unit.
    pub deviation: f32,
}

impl Finding {
    /// Create a finding.
    pub const fn new(kind: MalfunctionKind, deviation: f32) -> Self {
        Self { kind, deviation }
    }
}

/// Median of all valid, finite wheel speeds.
///
/// Returns `0.0` when fewer than two wheels are valid. With an even count
/// the two central values are averaged.
pub fn median_valid_speed(wheels: &WheelMap<SpeedData>) -> f32 {
    let mut speeds: heapless::Vec<f32, { WheelPosition::COUNT }> = heapless::Vec::new();
    for reading in wheels.values() {
        if reading.valid && reading.speed_kmh.is_finite() && speeds.push(reading.speed_kmh).is_err() {
            break;
        }
    }

    if speeds.len() < 2 {
        return 0.0;
    }
    speeds.sort_unstable_by(f32::total_cmp);

    let mid = speeds.len() / 2;
    let upper = speeds.get(mid).copied().unwrap_or(0.0);
    if speeds.len() % 2 == 0 {
        let lower = speeds.get(mid.saturating_sub(1)).copied().unwrap_or(0.0);
        (lower + upper) / 2.0
    } else {
        upper
    }
}

/// Calibration drift check.
///
/// Fires when the correction factor has moved more than `threshold_percent`
/// away from unity. The deviation is the drift in percent.
pub fn calibration_drift(calibration: &SensorCalibration, threshold_percent: f32) -> Option<Finding> {
    let drift = calibration.drift_percent();
    (drift > threshold_percent).then_some(Finding::new(MalfunctionKind::Miscalibration, drift))
}

/// Speed plausibility check against the vehicle median.
///
/// An invalid reading always fires, with a deviation of `0`.
pub fn speed_plausibility(reading: &SpeedData, median_kmh: f32, threshold_kmh: f32) -> Option<Finding> {
    if !reading.valid {
        return Some(Finding::new(MalfunctionKind::SpeedDifferenceExcessive, 0.0));
    }
    let deviation = (reading.speed_kmh - median_kmh).abs();
    (deviation > threshold_kmh)
        .then_some(Finding::new(MalfunctionKind::SpeedDifferenceExcessive, deviation))
}

/// Acceleration plausibility check.
///
/// Hard deceleration is expected while braking, so the threshold only
/// applies with the pedal released. An invalid reading always fires, with a
/// deviation of `0`.
pub fn acceleration_plausibility(
    reading: &SpeedData,
    brake_pedal_pressed: bool,
    threshold_mps2: f32,
) -> Option<Finding> {
    if !reading.valid {
        return Some(Finding::new(MalfunctionKind::AccelerationImplausible, 0.0));
    }
    let magnitude = reading.acceleration_mps2.abs();
    (magnitude > threshold_mps2 && !brake_pedal_pressed)
        .then_some(Finding::new(MalfunctionKind::AccelerationImplausible, magnitude))
}
