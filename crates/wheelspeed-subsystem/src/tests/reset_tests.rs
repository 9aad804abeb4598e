//! ECU reset and session timeout handling through the subsystem.

use approx::assert_relative_eq;
use wheelspeed_calibration::{
    CalibrationMethod, CalibrationRequest, CalibrationState, LoadOutcome,
};
use wheelspeed_test_helpers::prelude::*;
use wheelspeed_types::{MalfunctionKind, SensorCalibration, WheelPosition};
use wheelspeed_uds::DiagnosticSession;

use super::{send, subsystem};

const FL: WheelPosition = WheelPosition::FrontLeft;

#[test]
fn test_hard_reset_reloads_calibration_and_clears_detector() -> TestResult {
    let mut subsystem = subsystem();
    subsystem.provider_mut().force_calibration(
        FL,
        SensorCalibration {
            correction_factor: 1.15,
            ..SensorCalibration::factory()
        },
    );
    for _ in 0..5 {
        subsystem.run_cycle(false);
    }
    assert!(subsystem.detector().status(FL).confirmed);
    subsystem.start_calibration(CalibrationRequest::new(
        WheelPosition::RearLeft,
        CalibrationMethod::Manual,
        60.0,
    ))?;

    assert_eq!(send(&mut subsystem, &[0x10, 0x02]).first(), Some(&0x50));
    assert_eq!(send(&mut subsystem, &[0x11, 0x01]), vec![0x51, 0x01]);

    assert_relative_eq!(subsystem.provider().calibrations[FL].correction_factor, 1.0);
    assert!(matches!(subsystem.load_outcomes()[FL], LoadOutcome::Restored(_)));
    assert_eq!(subsystem.detector().status(FL).kind, MalfunctionKind::None);
    assert_eq!(
        subsystem.calibration().session(WheelPosition::RearLeft).state,
        CalibrationState::Cancelled
    );
    assert_eq!(subsystem.diagnostics().session(), DiagnosticSession::Default);
    // Stored DTCs survive the reset.
    assert!(subsystem.diagnostics().registry().get(0xC1_4100).is_some());
    Ok(())
}

#[test]
fn test_rejected_reset_changes_nothing() {
    let mut subsystem = subsystem();
    subsystem.provider_mut().force_calibration(
        FL,
        SensorCalibration {
            correction_factor: 1.2,
            ..SensorCalibration::factory()
        },
    );
    assert_eq!(send(&mut subsystem, &[0x11, 0x01]), vec![0x7F, 0x11, 0x22]);
    assert_relative_eq!(subsystem.provider().calibrations[FL].correction_factor, 1.2);
}

#[test]
fn test_extended_session_times_out_between_cycles() {
    let mut subsystem = subsystem();
    assert_eq!(send(&mut subsystem, &[0x10, 0x03]).first(), Some(&0x50));

    // 249 cycles of 20 ms: 4980 ms idle.
    for _ in 0..249 {
        subsystem.run_cycle(false);
    }
    assert_eq!(subsystem.diagnostics().session(), DiagnosticSession::Extended);
    subsystem.run_cycle(false);
    assert_eq!(subsystem.diagnostics().session(), DiagnosticSession::Default);
}
