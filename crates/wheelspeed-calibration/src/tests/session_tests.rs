//! Session lifecycle tests.

use approx::assert_relative_eq;
use core::time::Duration;
use wheelspeed_test_helpers::prelude::*;
use wheelspeed_types::{SensorCalibration, SpeedData, WheelPosition};

use super::{CYCLE, Rig};
use crate::fault_codes::CALIBRATION_FAILED;
use crate::*;

const FL: WheelPosition = WheelPosition::FrontLeft;

fn quick_config() -> CalibrationConfig {
    must(
        CalibrationConfig::builder()
            .samples(5, 100)
            .session_timeout_ms(1_000)
            .auto_check_interval_ms(1_000)
            .build(),
    )
}

fn request(reference: f32) -> CalibrationRequest {
    CalibrationRequest::new(FL, CalibrationMethod::ReferenceBased, reference).with_duration_ms(200)
}

/// Tick until the wheel's session leaves the active states. Returns the final tick.
fn run_until_settled(
    manager: &mut CalibrationManager,
    rig: &mut Rig,
    mut now: Duration,
    max_ticks: usize,
) -> Duration {
    for _ in 0..max_ticks {
        now += CYCLE;
        manager.process(&rig.bus, &mut rig.faults, now);
        if !manager.session(FL).is_active() {
            break;
        }
    }
    now
}

#[test]
fn test_start_moves_to_requested_then_in_progress() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();

    manager.start(request(60.0), Duration::ZERO)?;
    let session = manager.session(FL);
    assert_eq!(session.state, CalibrationState::Requested);
    assert_eq!(session.result, SessionResult::InProgress);
    assert!(session.is_active());
    assert!(manager.any_active());

    manager.process(&rig.bus, &mut rig.faults, CYCLE);
    assert_eq!(manager.session(FL).state, CalibrationState::InProgress);
    assert!(manager.samples(FL).is_empty());

    manager.process(&rig.bus, &mut rig.faults, CYCLE * 2);
    assert_eq!(manager.samples(FL).len(), 1);
    assert_eq!(manager.session(FL).samples_collected, 1);
    Ok(())
}

#[test]
fn test_session_completes_and_retires_next_tick() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();

    manager.start(request(60.0), Duration::ZERO)?;
    let now = run_until_settled(&mut manager, &mut rig, Duration::ZERO, 50);

    let session = *manager.session(FL);
    assert_eq!(session.state, CalibrationState::Completed);
    assert_eq!(session.result, SessionResult::Ok);
    assert!(!session.is_active());
    assert!(session.ended_at.is_none());
    assert!(usize::from(session.samples_collected) >= 5);
    assert!(now >= Duration::from_millis(200));
    assert_relative_eq!(session.correction_factor, 1.0);
    assert_relative_eq!(session.accuracy_percent, 100.0);

    manager.process(&rig.bus, &mut rig.faults, now + CYCLE);
    assert_eq!(manager.session(FL).ended_at, Some(now + CYCLE));
    assert_eq!(manager.session(FL).state, CalibrationState::Completed);
    assert!(!rig.faults.raised(CALIBRATION_FAILED));
    Ok(())
}

#[test]
fn test_apply_writes_factor_and_records_history() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();
    rig.bus.set_reading(FL, SpeedData::valid(57.0));

    manager.start(request(60.0).with_tolerance(6.0), Duration::ZERO)?;
    let now = run_until_settled(&mut manager, &mut rig, Duration::ZERO, 50);
    assert_eq!(manager.session(FL).state, CalibrationState::Completed);
    assert_relative_eq!(manager.session(FL).accuracy_percent, 95.0, epsilon = 1e-3);

    let applied = manager.apply(FL, true, &mut rig.ctx(now))?;
    assert_relative_eq!(applied.correction_factor, 60.0 / 57.0, epsilon = 1e-5);
    assert!(applied.valid);
    assert_eq!(rig.bus.calibrations[FL], applied);
    assert_eq!(rig.store.writes, 1);

    let entry = must_some(manager.history(FL).latest().copied(), "history entry");
    assert_eq!(entry.method, CalibrationMethod::ReferenceBased);
    assert_eq!(entry.result, SessionResult::Ok);
    assert_relative_eq!(entry.old_correction_factor, 1.0);
    assert_relative_eq!(entry.new_correction_factor, 60.0 / 57.0, epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_apply_without_persist_skips_store() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();
    manager.start(request(60.0), Duration::ZERO)?;
    let now = run_until_settled(&mut manager, &mut rig, Duration::ZERO, 50);

    let _applied = manager.apply(FL, false, &mut rig.ctx(now))?;
    assert_eq!(rig.store.writes, 0);
    assert_eq!(manager.history(FL).len(), 1);
    Ok(())
}

#[test]
fn test_low_accuracy_fails_validation_and_raises_fault() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();
    rig.bus.set_reading(FL, SpeedData::valid(57.0));

    manager.start(request(60.0), Duration::ZERO)?;
    let now = run_until_settled(&mut manager, &mut rig, Duration::ZERO, 50);

    let session = *manager.session(FL);
    assert_eq!(session.state, CalibrationState::Failed);
    assert_eq!(session.result, SessionResult::ValidationFailed);
    assert!(rig.faults.raised(CALIBRATION_FAILED));

    let err = manager.apply(FL, true, &mut rig.ctx(now));
    assert!(matches!(err, Err(CalibrationError::NotApplicable { .. })));
    assert_eq!(rig.bus.calibrations[FL], SensorCalibration::factory());
    assert!(manager.history(FL).is_empty());
    Ok(())
}

#[test]
fn test_too_few_moving_samples_fail_without_an_estimate() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();
    rig.bus.set_reading(FL, SpeedData::valid(0.0));

    manager.start(request(60.0), Duration::ZERO)?;
    manager.process(&rig.bus, &mut rig.faults, CYCLE);
    rig.bus.set_reading(FL, SpeedData::valid(66.0));
    manager.process(&rig.bus, &mut rig.faults, CYCLE * 2);
    rig.bus.set_reading(FL, SpeedData::valid(0.0));
    run_until_settled(&mut manager, &mut rig, CYCLE * 2, 50);

    let session = *manager.session(FL);
    assert_eq!(session.state, CalibrationState::Failed);
    assert_eq!(session.result, SessionResult::ValidationFailed);
    assert!(usize::from(session.samples_collected) >= 5);
    assert_relative_eq!(session.correction_factor, 1.0);
    assert_relative_eq!(session.accuracy_percent, 0.0);
    assert!(rig.faults.raised(CALIBRATION_FAILED));
    Ok(())
}

#[test]
fn test_no_valid_speed_times_out() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();
    rig.bus.set_reading(FL, SpeedData::invalid());

    manager.start(request(60.0), Duration::ZERO)?;
    let now = run_until_settled(&mut manager, &mut rig, Duration::ZERO, 100);

    let session = *manager.session(FL);
    assert_eq!(session.state, CalibrationState::Failed);
    assert_eq!(session.result, SessionResult::NotOk);
    assert_eq!(session.samples_collected, 0);
    assert_eq!(now, Duration::from_millis(1_000));
    assert!(rig.faults.raised(CALIBRATION_FAILED));
    Ok(())
}

#[test]
fn test_second_start_is_rejected_unless_forced() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    manager.start(request(60.0), Duration::ZERO)?;

    let err = manager.start(request(80.0), CYCLE);
    assert_eq!(err, Err(CalibrationError::InProgress(FL)));
    assert_relative_eq!(manager.session(FL).request.reference_speed_kmh, 60.0);

    manager.start(request(80.0).forced(), CYCLE)?;
    let session = manager.session(FL);
    assert_eq!(session.state, CalibrationState::Requested);
    assert_relative_eq!(session.request.reference_speed_kmh, 80.0);
    assert_eq!(session.started_at, CYCLE);
    Ok(())
}

#[test]
fn test_cancel_only_while_active() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    assert_eq!(
        manager.cancel(FL, Duration::ZERO),
        Err(CalibrationError::NotActive(FL))
    );

    manager.start(request(60.0), Duration::ZERO)?;
    manager.cancel(FL, CYCLE)?;
    let session = manager.session(FL);
    assert_eq!(session.state, CalibrationState::Cancelled);
    assert_eq!(session.result, SessionResult::NotOk);
    assert_eq!(session.ended_at, Some(CYCLE));
    assert!(!session.is_active());

    assert_eq!(manager.cancel(FL, CYCLE), Err(CalibrationError::NotActive(FL)));
    Ok(())
}

#[test]
fn test_invalid_request_leaves_session_untouched() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let bad = CalibrationRequest::new(FL, CalibrationMethod::Manual, 0.0);
    let err = manager.start(bad, Duration::ZERO);
    assert!(matches!(err, Err(CalibrationError::InvalidParameter { name: "reference_speed_kmh", .. })));
    assert_eq!(manager.session(FL).state, CalibrationState::Idle);

    let zero_window = request(60.0).with_duration_ms(0);
    assert!(manager.start(zero_window, Duration::ZERO).is_err());
    let wide_tolerance = request(60.0).with_tolerance(150.0);
    assert!(manager.start(wide_tolerance, Duration::ZERO).is_err());
    Ok(())
}

#[test]
fn test_sample_buffer_is_capped_at_max_samples() -> TestResult {
    let config = CalibrationConfig::builder().samples(5, 8).build()?;
    let mut manager = CalibrationManager::new(config)?;
    let rig = &mut Rig::default();

    manager.start(request(60.0).with_duration_ms(5_000), Duration::ZERO)?;
    let mut now = Duration::ZERO;
    for _ in 0..30 {
        now += CYCLE;
        manager.process(&rig.bus, &mut rig.faults, now);
    }
    assert_eq!(manager.samples(FL).len(), 8);
    assert_eq!(manager.session(FL).samples_collected, 8);
    assert!(manager.session(FL).is_active());
    Ok(())
}

#[test]
fn test_other_wheels_stay_idle() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();
    manager.start(request(60.0), Duration::ZERO)?;
    let _now = run_until_settled(&mut manager, &mut rig, Duration::ZERO, 50);

    for wheel in [
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ] {
        assert_eq!(manager.session(wheel).state, CalibrationState::Idle);
        assert!(manager.samples(wheel).is_empty());
    }
    Ok(())
}

#[test]
fn test_validate_calibration_accuracy_is_floored() -> TestResult {
    let manager = CalibrationManager::default();
    let mut rig = Rig::default();

    let v = manager.validate_calibration(FL, &rig.bus)?;
    assert!(v.valid);
    assert_relative_eq!(v.accuracy_percent, 100.0);

    rig.bus.force_calibration(
        FL,
        SensorCalibration {
            correction_factor: 1.2,
            ..SensorCalibration::factory()
        },
    );
    let v = manager.validate_calibration(FL, &rig.bus)?;
    assert!(v.valid);
    assert_relative_eq!(v.accuracy_percent, 80.0, epsilon = 1e-4);

    rig.bus.force_calibration(
        FL,
        SensorCalibration {
            correction_factor: 2.5,
            ..SensorCalibration::factory()
        },
    );
    let v = manager.validate_calibration(FL, &rig.bus)?;
    assert!(!v.valid);
    assert_relative_eq!(v.accuracy_percent, 0.0);

    rig.bus.force_calibration(
        FL,
        SensorCalibration {
            valid: false,
            ..SensorCalibration::factory()
        },
    );
    assert!(!manager.validate_calibration(FL, &rig.bus)?.valid);
    Ok(())
}

#[test]
fn test_auto_check_waits_for_interval_and_targets_weak_wheels() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let mut rig = Rig::default();
    rig.bus.force_calibration(
        WheelPosition::RearRight,
        SensorCalibration {
            correction_factor: 1.15,
            ..SensorCalibration::factory()
        },
    );

    assert_eq!(manager.auto_calibration_check(&rig.bus, Duration::from_millis(500)), 0);
    assert!(!manager.any_active());

    assert_eq!(manager.auto_calibration_check(&rig.bus, Duration::from_millis(1_000)), 1);
    let session = manager.session(WheelPosition::RearRight);
    assert!(session.is_active());
    assert_eq!(session.request.method, CalibrationMethod::Automatic);
    assert_relative_eq!(session.request.reference_speed_kmh, AUTO_CALIBRATION_REFERENCE_KMH);
    assert_eq!(session.request.duration_ms, AUTO_CALIBRATION_DURATION_MS);
    assert!(!session.request.force);
    assert!(!manager.session(FL).is_active());

    // Gate restarts from the last sweep.
    assert_eq!(manager.auto_calibration_check(&rig.bus, Duration::from_millis(1_500)), 0);
    // Running session is not replaced.
    assert_eq!(manager.auto_calibration_check(&rig.bus, Duration::from_millis(2_000)), 0);
    Ok(())
}

#[test]
fn test_auto_check_disabled() -> TestResult {
    let config = CalibrationConfig::builder()
        .auto_calibration(false)
        .auto_check_interval_ms(1_000)
        .build()?;
    let mut manager = CalibrationManager::new(config)?;
    let mut rig = Rig::default();
    rig.bus.force_calibration(
        FL,
        SensorCalibration {
            valid: false,
            ..SensorCalibration::factory()
        },
    );
    assert_eq!(manager.auto_calibration_check(&rig.bus, Duration::from_secs(10)), 0);
    Ok(())
}

#[test]
fn test_set_config_rejects_invalid_and_keeps_previous() -> TestResult {
    let mut manager = CalibrationManager::new(quick_config())?;
    let bad = CalibrationConfig {
        min_samples: 0,
        ..CalibrationConfig::default()
    };
    assert!(manager.set_config(bad).is_err());
    assert_eq!(manager.config().min_samples, 5);

    let oversized = CalibrationConfig {
        max_samples: 2_000,
        ..CalibrationConfig::default()
    };
    assert!(CalibrationManager::new(oversized).is_err());
    Ok(())
}
