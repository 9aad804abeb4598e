//! The cyclic malfunction detector.

use core::time::Duration;

use wheelspeed_types::{
    SensorCalibration, Severity, SpeedDataProvider, SystemState, VehicleData, WheelMap,
    WheelPosition,
};

use crate::{
    DetectionCounters, DetectionParameters, DetectorResult, Finding, MalfunctionStatus,
    acceleration_plausibility, calibration_drift, median_valid_speed, speed_plausibility,
};

/// Overall health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemHealth {
    /// No wheel currently has an active malfunction.
    pub healthy: bool,
    /// Aggregated state from the last cycle.
    pub state: SystemState,
}

/// Per-wheel malfunction detector.
///
/// Owns one [`MalfunctionStatus`] and one set of [`DetectionCounters`] per
/// wheel for its whole lifetime. Statuses are mutated by
/// [`run_cycle`](Self::run_cycle) and reset by [`clear`](Self::clear); they
/// are never removed.
///
/// # RT-Safety
///
/// `run_cycle` performs no heap allocation and runs in bounded time.
#[derive(Debug, Clone)]
pub struct MalfunctionDetector {
    parameters: DetectionParameters,
    vehicle: VehicleData,
    statuses: WheelMap<MalfunctionStatus>,
    counters: WheelMap<DetectionCounters>,
    system_state: SystemState,
}

impl Default for MalfunctionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MalfunctionDetector {
    /// Create a detector with default parameters.
    pub fn new() -> Self {
        Self {
            parameters: DetectionParameters::default(),
            vehicle: VehicleData::default(),
            statuses: WheelMap::default(),
            counters: WheelMap::default(),
            system_state: SystemState::Monitoring,
        }
    }

    /// Create a detector with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters do not validate.
    pub fn with_parameters(parameters: DetectionParameters) -> DetectorResult<Self> {
        parameters.validate()?;
        Ok(Self {
            parameters,
            ..Self::new()
        })
    }

    /// Current parameters.
    pub fn parameters(&self) -> &DetectionParameters {
        &self.parameters
    }

    /// Replace the parameters.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the current parameters in place, if the new
    /// ones do not validate.
    pub fn set_parameters(&mut self, parameters: DetectionParameters) -> DetectorResult<()> {
        parameters.validate()?;
        self.parameters = parameters;
        tracing::debug!(?parameters, "Detection parameters updated");
        Ok(())
    }

    /// Feed the latest vehicle snapshot.
    pub fn update_vehicle_data(&mut self, vehicle: VehicleData) {
        self.vehicle = vehicle;
    }

    /// Latest vehicle snapshot.
    pub fn vehicle_data(&self) -> &VehicleData {
        &self.vehicle
    }

    /// Run one detection cycle over all wheels.
    ///
    /// # Arguments
    ///
    /// * `elapsed` - Time since the previous cycle, added to the debounce
    ///   counter of every active wheel.
    /// * `provider` - Source of the live calibration for the drift check. A
    ///   wheel whose calibration cannot be read skips the drift check.
    ///
    /// # Returns
    ///
    /// The aggregated system state after this cycle.
    pub fn run_cycle<P>(&mut self, elapsed: Duration, provider: &P) -> SystemState
    where
        P: SpeedDataProvider + ?Sized,
    {
        let median = median_valid_speed(&self.vehicle.wheels);

        for wheel in WheelPosition::ALL {
            let calibration = provider.calibration(wheel).ok();
            let finding = self.evaluate_wheel(wheel, median, calibration.as_ref());
            self.apply_finding(wheel, finding, elapsed);
        }

        self.system_state = self.aggregate_state();
        self.system_state
    }

    /// Run the check chain for one wheel without mutating any state.
    fn evaluate_wheel(
        &self,
        wheel: WheelPosition,
        median: f32,
        calibration: Option<&SensorCalibration>,
    ) -> Option<Finding> {
        let reading = self.vehicle.wheel(wheel);
        let p = &self.parameters;

        if p.enable_calibration_check
            && let Some(cal) = calibration
            && let Some(finding) = calibration_drift(cal, p.calibration_drift_threshold_percent)
        {
            return Some(finding);
        }

        if p.enable_speed_plausibility
            && let Some(finding) =
                speed_plausibility(reading, median, p.speed_difference_threshold_kmh)
        {
            return Some(finding);
        }

        if p.enable_acceleration_check {
            return acceleration_plausibility(
                reading,
                self.vehicle.brake_pedal_pressed,
                p.acceleration_threshold_mps2,
            );
        }

        None
    }

    fn apply_finding(&mut self, wheel: WheelPosition, finding: Option<Finding>, elapsed: Duration) {
        // Cache values before borrowing
        let cap = self.parameters.max_consecutive_errors;
        let debounce = self.parameters.debounce();

        let status = self.statuses.get_mut(wheel);
        let counters = self.counters.get_mut(wheel);

        match finding {
            Some(finding) => {
                status.kind = finding.kind;
                status.severity = finding.kind.severity_for(finding.deviation);
                status.active = true;
                status.deviation = finding.deviation;
                status.occurrence_count = status.occurrence_count.saturating_add(1);
                counters.record_error(cap);
            }
            None => {
                counters.clear_consecutive();
                status.active = false;
            }
        }

        if status.active {
            counters.debounce_elapsed = counters.debounce_elapsed.saturating_add(elapsed);
            if counters.debounce_elapsed >= debounce && !status.confirmed {
                status.confirmed = true;
                tracing::info!(
                    wheel = %wheel,
                    kind = %status.kind,
                    severity = ?status.severity,
                    deviation = status.deviation,
                    "Malfunction confirmed"
                );
            }
        } else {
            if status.confirmed {
                tracing::info!(wheel = %wheel, kind = %status.kind, "Malfunction condition cleared");
            }
            counters.debounce_elapsed = Duration::ZERO;
            status.confirmed = false;
        }
    }

    fn aggregate_state(&self) -> SystemState {
        let statuses = || self.statuses.values();
        if statuses().any(|s| s.is_confirmed_at_least(Severity::High)) {
            SystemState::Malfunction
        } else if statuses().any(|s| s.confirmed) {
            SystemState::Degraded
        } else {
            SystemState::Monitoring
        }
    }

    /// Aggregated state from the last cycle.
    pub fn system_state(&self) -> SystemState {
        self.system_state
    }

    /// Status of one wheel.
    pub fn status(&self, wheel: WheelPosition) -> &MalfunctionStatus {
        self.statuses.get(wheel)
    }

    /// Status of every wheel.
    pub fn statuses(&self) -> &WheelMap<MalfunctionStatus> {
        &self.statuses
    }

    /// Counters behind one wheel's status.
    pub fn counters(&self, wheel: WheelPosition) -> &DetectionCounters {
        self.counters.get(wheel)
    }

    /// Consecutive cycles in which `wheel` has been flagged.
    pub fn consecutive_errors(&self, wheel: WheelPosition) -> u8 {
        self.counters.get(wheel).consecutive_errors
    }

    /// Whether `wheel` has been flagged for at least the configured number
    /// of consecutive cycles.
    pub fn is_persistent(&self, wheel: WheelPosition) -> bool {
        self.consecutive_errors(wheel) >= self.parameters.max_consecutive_errors
    }

    /// Reset a wheel's status and counters.
    ///
    /// Idempotent: clearing a wheel with nothing recorded changes nothing.
    pub fn clear(&mut self, wheel: WheelPosition) {
        *self.statuses.get_mut(wheel) = MalfunctionStatus::new();
        self.counters.get_mut(wheel).reset();
        self.system_state = self.aggregate_state();
    }

    /// Reset every wheel.
    pub fn clear_all(&mut self) {
        for wheel in WheelPosition::ALL {
            self.clear(wheel);
        }
    }

    /// Healthy iff no wheel has an active malfunction.
    pub fn check_system_health(&self) -> SystemHealth {
        SystemHealth {
            healthy: !self.statuses.values().any(|s| s.active),
            state: self.system_state,
        }
    }

    /// Run the drift check alone, honouring the enable flag.
    pub fn check_calibration_drift(&self, calibration: &SensorCalibration) -> Option<Finding> {
        if !self.parameters.enable_calibration_check {
            return None;
        }
        calibration_drift(calibration, self.parameters.calibration_drift_threshold_percent)
    }

    /// Median of the valid wheel speeds in the latest snapshot.
    pub fn median_speed(&self) -> f32 {
        median_valid_speed(&self.vehicle.wheels)
    }

    /// First wheel, in index order, whose valid speed is further from the
    /// median than the speed-difference threshold.
    ///
    /// Returns the wheel and its deviation (km/h).
    pub fn detect_speed_differences(&self) -> Option<(WheelPosition, f32)> {
        let median = self.median_speed();
        let threshold = self.parameters.speed_difference_threshold_kmh;

        self.vehicle
            .wheels
            .iter()
            .filter(|(_, r)| r.valid)
            .map(|(wheel, r)| (wheel, (r.speed_kmh - median).abs()))
            .find(|&(_, deviation)| deviation > threshold)
    }
}
