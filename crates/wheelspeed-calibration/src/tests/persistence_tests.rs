//! Load, save, factory reset and manual write tests.

use approx::assert_relative_eq;
use core::time::Duration;
use wheelspeed_test_helpers::prelude::*;
use wheelspeed_types::{SensorCalibration, WheelPosition};

use super::Rig;
use crate::fault_codes::{CALIBRATION_OUT_OF_RANGE, NVM_ERROR};
use crate::*;

const RL: WheelPosition = WheelPosition::RearLeft;

fn tuned(factor: f32) -> SensorCalibration {
    SensorCalibration {
        correction_factor: factor,
        timestamp_ms: 7,
        ..SensorCalibration::factory()
    }
}

#[test]
fn test_load_restores_stored_calibration() -> TestResult {
    let mut rig = Rig::default();
    rig.store
        .blocks
        .insert(block_id(RL), encode_calibration(RL, &tuned(1.03))?);
    let mut manager = CalibrationManager::default();

    let outcome = manager.load(RL, &mut rig.ctx(Duration::ZERO))?;
    assert_eq!(outcome, LoadOutcome::Restored(tuned(1.03)));
    assert_eq!(rig.bus.calibrations[RL], tuned(1.03));
    assert!(rig.faults.reports.is_empty());
    assert!(manager.history(RL).is_empty());
    Ok(())
}

#[test]
fn test_blank_store_falls_back_without_fault() -> TestResult {
    let mut rig = Rig::default();
    rig.bus.force_calibration(RL, tuned(1.2));
    let mut manager = CalibrationManager::default();

    let outcome = manager.load(RL, &mut rig.ctx(Duration::from_millis(40)))?;
    assert_eq!(
        outcome,
        LoadOutcome::FactoryDefaults {
            reason: FallbackReason::Blank,
            persisted: true
        }
    );
    assert_relative_eq!(rig.bus.calibrations[RL].correction_factor, 1.0);
    assert_eq!(rig.bus.calibrations[RL].timestamp_ms, 40);
    assert!(!rig.faults.raised(NVM_ERROR));
    assert!(rig.store.blocks.contains_key(&block_id(RL)));

    let entry = must_some(manager.history(RL).latest().copied(), "factory entry");
    assert_eq!(entry.method, CalibrationMethod::FactoryReset);
    assert_relative_eq!(entry.old_correction_factor, 1.2);
    Ok(())
}

#[test]
fn test_out_of_range_stored_value_falls_back() -> TestResult {
    let mut rig = Rig::default();
    rig.store
        .blocks
        .insert(block_id(RL), encode_calibration(RL, &tuned(1.7))?);
    let mut manager = CalibrationManager::default();

    let outcome = manager.load(RL, &mut rig.ctx(Duration::ZERO))?;
    assert!(matches!(
        outcome,
        LoadOutcome::FactoryDefaults {
            reason: FallbackReason::Invalid,
            ..
        }
    ));
    assert_eq!(rig.bus.calibrations[RL].correction_factor.to_bits(), 1.0f32.to_bits());
    Ok(())
}

#[test]
fn test_corrupt_block_raises_nvm_fault() -> TestResult {
    let mut rig = Rig::default();
    rig.store.blocks.insert(block_id(RL), vec![0xFF, 0x00, 0x13]);
    let mut manager = CalibrationManager::default();

    let outcome = manager.load(RL, &mut rig.ctx(Duration::ZERO))?;
    assert!(matches!(
        outcome,
        LoadOutcome::FactoryDefaults {
            reason: FallbackReason::Unreadable,
            persisted: true
        }
    ));
    assert!(rig.faults.raised(NVM_ERROR));
    Ok(())
}

#[test]
fn test_broken_store_still_applies_factory_defaults() -> TestResult {
    let mut rig = Rig {
        store: MemoryStore::broken(),
        ..Rig::default()
    };
    rig.bus.force_calibration(RL, tuned(1.4));
    let mut manager = CalibrationManager::default();

    let outcome = manager.load(RL, &mut rig.ctx(Duration::ZERO))?;
    assert_eq!(
        outcome,
        LoadOutcome::FactoryDefaults {
            reason: FallbackReason::Unreadable,
            persisted: false
        }
    );
    assert_relative_eq!(rig.bus.calibrations[RL].correction_factor, 1.0);
    assert!(rig.faults.raised(NVM_ERROR));

    let entry = must_some(manager.history(RL).latest().copied(), "factory entry");
    assert_eq!(entry.result, SessionResult::PersistenceError);
    Ok(())
}

#[test]
fn test_init_loads_every_wheel() -> TestResult {
    let mut rig = Rig::default();
    rig.store.blocks.insert(
        block_id(WheelPosition::FrontRight),
        encode_calibration(WheelPosition::FrontRight, &tuned(0.98))?,
    );
    let mut manager = CalibrationManager::default();

    let outcomes = manager.init(&mut rig.ctx(Duration::ZERO))?;
    assert_eq!(
        outcomes[WheelPosition::FrontRight],
        LoadOutcome::Restored(tuned(0.98))
    );
    for wheel in [WheelPosition::FrontLeft, WheelPosition::RearLeft, WheelPosition::RearRight] {
        assert!(matches!(outcomes[wheel], LoadOutcome::FactoryDefaults { .. }));
    }
    assert_eq!(rig.store.blocks.len(), 4);
    Ok(())
}

#[test]
fn test_save_failure_raises_fault_and_errors() {
    let mut rig = Rig::default();
    rig.store.fail_writes = true;
    let mut manager = CalibrationManager::default();

    let err = manager.save(RL, &mut rig.ctx(Duration::ZERO));
    assert!(matches!(err, Err(CalibrationError::Store(_))));
    assert!(rig.faults.raised(NVM_ERROR));
}

#[test]
fn test_saved_blob_decodes_to_live_calibration() -> TestResult {
    let mut rig = Rig::default();
    rig.bus.force_calibration(RL, tuned(1.11));
    let mut manager = CalibrationManager::default();

    manager.save(RL, &mut rig.ctx(Duration::ZERO))?;
    let blob = must_some(rig.store.blocks.get(&block_id(RL)).cloned(), "saved block");
    assert_eq!(decode_calibration(RL, &blob)?, tuned(1.11));
    Ok(())
}

#[test]
fn test_reset_to_factory_records_previous_factor() -> TestResult {
    let mut rig = Rig::default();
    rig.bus.force_calibration(RL, tuned(0.9));
    let mut manager = CalibrationManager::default();

    manager.reset_to_factory(RL, &mut rig.ctx(Duration::from_millis(100)))?;
    assert_eq!(
        rig.bus.calibrations[RL],
        SensorCalibration {
            timestamp_ms: 100,
            ..SensorCalibration::factory()
        }
    );
    let entry = must_some(manager.history(RL).latest().copied(), "factory entry");
    assert_eq!(entry.method, CalibrationMethod::FactoryReset);
    assert_eq!(entry.result, SessionResult::Ok);
    assert_relative_eq!(entry.old_correction_factor, 0.9);
    assert_relative_eq!(entry.new_correction_factor, 1.0);
    Ok(())
}

#[test]
fn test_write_calibration_applies_partial_update() -> TestResult {
    let mut rig = Rig::default();
    let mut manager = CalibrationManager::default();
    let update = CalibrationUpdate {
        correction_factor: 1.05,
        offset: Some(-0.25),
        pulses_per_revolution: None,
        wheel_circumference_m: None,
    };

    let written = manager.write_calibration(RL, update, &mut rig.ctx(Duration::from_millis(60)))?;
    assert_relative_eq!(written.correction_factor, 1.05);
    assert_relative_eq!(written.offset, -0.25);
    assert_eq!(written.pulses_per_revolution, SensorCalibration::FACTORY_PULSES_PER_REVOLUTION);
    assert_eq!(written.timestamp_ms, 60);
    assert_eq!(rig.bus.calibrations[RL], written);
    assert_eq!(rig.store.writes, 1);

    let entry = must_some(manager.history(RL).latest().copied(), "manual entry");
    assert_eq!(entry.method, CalibrationMethod::Manual);
    assert_relative_eq!(entry.accuracy_percent, 95.0, epsilon = 1e-4);
    Ok(())
}

#[test]
fn test_write_calibration_rejects_out_of_range_factor() {
    let mut rig = Rig::default();
    let mut manager = CalibrationManager::default();

    let err = manager.write_calibration(
        RL,
        CalibrationUpdate::factor(1.6),
        &mut rig.ctx(Duration::ZERO),
    );
    assert!(matches!(err, Err(CalibrationError::OutOfRange { .. })));
    assert!(rig.faults.raised(CALIBRATION_OUT_OF_RANGE));
    assert_eq!(rig.bus.calibrations[RL], SensorCalibration::factory());
    assert!(manager.history(RL).is_empty());
}

#[test]
fn test_write_calibration_persists_best_effort() -> TestResult {
    let mut rig = Rig::default();
    rig.store.fail_writes = true;
    let mut manager = CalibrationManager::default();

    let written =
        manager.write_calibration(RL, CalibrationUpdate::factor(0.95), &mut rig.ctx(Duration::ZERO))?;
    assert_relative_eq!(rig.bus.calibrations[RL].correction_factor, written.correction_factor);
    assert!(rig.faults.raised(NVM_ERROR));
    let entry = must_some(manager.history(RL).latest().copied(), "manual entry");
    assert_eq!(entry.result, SessionResult::PersistenceError);
    Ok(())
}

#[test]
fn test_write_calibration_rejects_zero_pulses() {
    let mut rig = Rig::default();
    let mut manager = CalibrationManager::default();
    let update = CalibrationUpdate {
        pulses_per_revolution: Some(0),
        ..CalibrationUpdate::factor(1.0)
    };
    let err = manager.write_calibration(RL, update, &mut rig.ctx(Duration::ZERO));
    assert!(matches!(err, Err(CalibrationError::InvalidParameter { .. })));
    assert_eq!(rig.bus.calibration_writes, 0);
}
