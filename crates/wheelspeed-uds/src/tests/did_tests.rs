//! ReadDataByIdentifier and WriteDataByIdentifier tests.

use approx::assert_relative_eq;
use insta::assert_snapshot;
use wheelspeed_calibration::fault_codes::CALIBRATION_OUT_OF_RANGE;
use wheelspeed_calibration::block_id;
use wheelspeed_types::{SensorCalibration, SpeedData, WheelPosition};

use super::Bench;
use crate::DiagnosticSession;

const FL: WheelPosition = WheelPosition::FrontLeft;

#[test]
fn test_read_speed_data() {
    let mut bench = Bench::default();
    bench
        .bus
        .set_reading(WheelPosition::RearRight, SpeedData::valid(60.0).with_acceleration(1.5));
    assert_snapshot!(bench.hex(&[0x22, 0xF1, 0x03]), @"62 F1 03 17 70 17 70 00 96 01 64");
}

#[test]
fn test_read_factory_calibration() {
    let mut bench = Bench::default();
    assert_snapshot!(
        bench.hex(&[0x22, 0xF1, 0x10]),
        @"62 F1 10 27 10 00 00 00 3C 08 34 01 00 00 00 00"
    );
}

#[test]
fn test_read_rejects_unknown_or_short_identifier() {
    let mut bench = Bench::default();
    assert_snapshot!(bench.hex(&[0x22, 0xF1, 0x30]), @"7F 22 31");
    assert_snapshot!(bench.hex(&[0x22, 0xF1, 0x04]), @"7F 22 31");
    assert_snapshot!(bench.hex(&[0x22, 0xF1]), @"7F 22 13");
}

#[test]
fn test_read_unavailable_sensor_is_conditions_not_correct() {
    let mut bench = Bench::default();
    bench.bus.unavailable[FL] = true;
    assert_snapshot!(bench.hex(&[0x22, 0xF1, 0x00]), @"7F 22 22");
    assert_snapshot!(bench.hex(&[0x22, 0xF1, 0x10]), @"7F 22 22");
}

#[test]
fn test_read_system_status_of_healthy_system() {
    let mut bench = Bench::default();
    bench.tick();
    assert_snapshot!(
        bench.hex(&[0x22, 0xF1, 0x20]),
        @"62 F1 20 01 01 00 00 00 00 00 00 00 00 00 00 00 00 00"
    );
    assert_snapshot!(bench.hex(&[0x22, 0xF1, 0x21]), @"62 F1 21 00 00 00 00 00 00 00 00");
}

#[test]
fn test_read_system_status_with_confirmed_miscalibration() {
    let mut bench = Bench::default();
    bench.bus.force_calibration(
        FL,
        SensorCalibration {
            correction_factor: 1.12,
            ..SensorCalibration::factory()
        },
    );
    for _ in 0..5 {
        bench.tick();
    }
    assert!(bench.detector.status(FL).confirmed);

    // Malfunction, unhealthy, FL miscalibration/high/active+confirmed, 1 active DTC.
    assert_snapshot!(
        bench.hex(&[0x22, 0xF1, 0x20]),
        @"62 F1 20 03 00 01 03 03 00 00 00 00 00 00 00 00 00 01"
    );
    assert_snapshot!(bench.hex(&[0x22, 0xF1, 0x21]), @"62 F1 21 00 05 00 00 00 00 00 00");
}

#[test]
fn test_write_requires_extended_session() {
    let mut bench = Bench::default();
    assert_snapshot!(bench.hex(&[0x2E, 0xF1, 0x10, 0x29, 0x04]), @"7F 2E 22");
    assert_eq!(bench.bus.calibration_writes, 0);

    bench.enter(DiagnosticSession::Extended);
    assert_snapshot!(bench.hex(&[0x2E, 0xF1, 0x10, 0x29, 0x04]), @"6E F1 10");
    assert_relative_eq!(bench.bus.calibrations[FL].correction_factor, 1.05);
    assert!(bench.store.blocks.contains_key(&block_id(FL)));
}

#[test]
fn test_write_full_record() {
    let mut bench = Bench::default();
    bench.now = core::time::Duration::from_millis(250);
    bench.enter(DiagnosticSession::Extended);

    let frame = [0x2E, 0xF1, 0x12, 0x26, 0xAC, 0xFF, 0x9C, 0x00, 0x30, 0x07, 0xD0];
    assert_snapshot!(bench.hex(&frame), @"6E F1 12");

    let cal = bench.bus.calibrations[WheelPosition::RearLeft];
    assert_relative_eq!(cal.correction_factor, 0.99);
    assert_relative_eq!(cal.offset, -1.0);
    assert_eq!(cal.pulses_per_revolution, 48);
    assert_relative_eq!(cal.wheel_circumference_m, 2.0);
    assert_eq!(cal.timestamp_ms, 250);
}

#[test]
fn test_write_rejections() {
    let mut bench = Bench::default();
    bench.enter(DiagnosticSession::Extended);

    assert_snapshot!(bench.hex(&[0x2E, 0xF1, 0x10]), @"7F 2E 13");
    assert_snapshot!(bench.hex(&[0x2E, 0xF1, 0x00, 0x27, 0x10]), @"7F 2E 31");
    assert_snapshot!(bench.hex(&[0x2E, 0xF1, 0x10, 0x27, 0x10, 0x00]), @"7F 2E 13");
    assert_eq!(bench.bus.calibration_writes, 0);
}

#[test]
fn test_write_out_of_range_factor_raises_dtc() {
    let mut bench = Bench::default();
    bench.enter(DiagnosticSession::Extended);

    assert_snapshot!(bench.hex(&[0x2E, 0xF1, 0x11, 0x3E, 0x80]), @"7F 2E 31");
    assert_eq!(
        bench.bus.calibrations[WheelPosition::FrontRight],
        SensorCalibration::factory()
    );
    assert!(bench.server.registry().get(CALIBRATION_OUT_OF_RANGE).is_some());
}

#[test]
fn test_write_rejected_by_sensor_is_conditions_not_correct() {
    let mut bench = Bench::default();
    bench.enter(DiagnosticSession::Extended);
    bench.bus.reject_calibration_writes = true;
    assert_snapshot!(bench.hex(&[0x2E, 0xF1, 0x10, 0x27, 0x10]), @"7F 2E 22");
}
