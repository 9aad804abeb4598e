//! Routine identifiers and option records.

use wheelspeed_calibration::{CalibrationMethod, CalibrationRequest, AUTO_CALIBRATION_REFERENCE_KMH};
use wheelspeed_types::WheelPosition;

use crate::did::wheel_at;
use crate::ids::rid;

/// Length of the start-calibration option record.
pub const START_CALIBRATION_RECORD_LEN: usize = 6;

/// A supported routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineId {
    /// Start a reference-based calibration of one wheel.
    StartCalibration(WheelPosition),
    /// Report validity and accuracy of the live calibration.
    ValidateCalibration,
    /// Reset every wheel to factory calibration.
    ResetCalibrationAll,
    /// Check every sensor for a usable reading and calibration.
    SelfTest,
}

impl RoutineId {
    /// Route a raw routine identifier.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            rid::START_CALIBRATION_FL..=rid::START_CALIBRATION_RR => {
                wheel_at(id, rid::START_CALIBRATION_FL).map(Self::StartCalibration)
            }
            rid::VALIDATE_CALIBRATION => Some(Self::ValidateCalibration),
            rid::RESET_CALIBRATION_ALL => Some(Self::ResetCalibrationAll),
            rid::SELF_TEST => Some(Self::SelfTest),
            _ => None,
        }
    }
}

/// Build the calibration request for a start-calibration routine.
///
/// Without an option record the request is reference-based at 50 km/h with
/// a 2 % tolerance and a 10 s window. A 6-byte record carries the reference
/// speed ×10, the tolerance ×100 and the duration in ms. Any other record
/// length yields `None`.
pub fn start_calibration_request(wheel: WheelPosition, record: &[u8]) -> Option<CalibrationRequest> {
    let default = CalibrationRequest::new(
        wheel,
        CalibrationMethod::ReferenceBased,
        AUTO_CALIBRATION_REFERENCE_KMH,
    );
    match *record {
        [] => Some(default),
        [s0, s1, t0, t1, d0, d1] => {
            let reference_speed_kmh = f32::from(u16::from_be_bytes([s0, s1])) / 10.0;
            Some(CalibrationRequest {
                reference_speed_kmh,
                tolerance_percent: f32::from(u16::from_be_bytes([t0, t1])) / 100.0,
                duration_ms: u32::from(u16::from_be_bytes([d0, d1])),
                ..default
            })
        }
        _ => None,
    }
}
