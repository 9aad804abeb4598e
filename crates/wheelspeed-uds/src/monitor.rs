//! Mirror confirmed detector malfunctions into the DTC registry.

use wheelspeed_detector::MalfunctionDetector;
use wheelspeed_types::{MalfunctionKind, WheelPosition};

use crate::dtc::{DtcRegistry, FaultContext};
use crate::ids::dtc;

/// DTC for a malfunction kind on a wheel. `None` for [`MalfunctionKind::None`].
pub fn dtc_for_malfunction(kind: MalfunctionKind, wheel: WheelPosition) -> Option<u32> {
    let index = u32::from(wheel.index());
    match kind {
        MalfunctionKind::None => None,
        MalfunctionKind::Miscalibration => {
            Some(dtc::SPEED_SENSOR_MISCALIBRATED_FL.saturating_add(index))
        }
        MalfunctionKind::SensorFailure => Some(dtc::SPEED_SENSOR_FAILURE_FL.saturating_add(index)),
        MalfunctionKind::SpeedDifferenceExcessive => Some(dtc::SPEED_PLAUSIBILITY),
        MalfunctionKind::WheelSlipExcessive
        | MalfunctionKind::AccelerationImplausible
        | MalfunctionKind::CalibrationDrift
        | MalfunctionKind::SystemError => Some(dtc::SYSTEM_MALFUNCTION),
    }
}

/// Report every confirmed wheel malfunction as an active DTC.
///
/// Runs once per cycle, so a malfunction that stays confirmed is reported
/// on every cycle and reaches DTC confirmation on its third report.
/// Returns the number of reports made.
pub fn report_confirmed(detector: &MalfunctionDetector, registry: &mut DtcRegistry) -> usize {
    let mut reported = 0usize;
    for (wheel, status) in detector.statuses().iter() {
        if !status.confirmed {
            continue;
        }
        let Some(code) = dtc_for_malfunction(status.kind, wheel) else {
            continue;
        };
        registry.report(
            code,
            true,
            FaultContext {
                wheel: Some(wheel),
                kind: status.kind,
                severity: status.severity,
            },
        );
        reported = reported.saturating_add(1);
    }
    reported
}
