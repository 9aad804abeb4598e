//! Full malfunction lifecycle integration tests.

use std::time::Duration;
use wheelspeed_detector::prelude::*;
use wheelspeed_test_helpers::prelude::*;
use wheelspeed_types::{SensorCalibration, SpeedData, VehicleData, WheelMap, WheelPosition};

const CYCLE: Duration = Duration::from_millis(20);

fn cruising(speed: f32) -> VehicleData {
    VehicleData::from_wheels(WheelMap::from_fn(|_| SpeedData::valid(speed)))
}

#[test]
fn test_miscalibrated_wheel_lifecycle() -> Result<(), DetectorError> {
    init_test_tracing();
    let mut bus = MockSensorBus::cruising(60.0);
    let mut detector = MalfunctionDetector::with_parameters(DetectionParameters::default())?;

    // 1. Normal operation
    detector.update_vehicle_data(cruising(60.0));
    assert_eq!(detector.run_cycle(CYCLE, &bus), SystemState::Monitoring);

    // 2. Front-left sensor drifts 15 %
    bus.force_calibration(
        WheelPosition::FrontLeft,
        SensorCalibration {
            correction_factor: 1.15,
            valid: false,
            ..SensorCalibration::factory()
        },
    );
    for _ in 0..4 {
        assert_eq!(detector.run_cycle(CYCLE, &bus), SystemState::Monitoring);
    }
    assert!(detector.status(WheelPosition::FrontLeft).active);

    // 3. Debounce window closes: 15 % is high severity, not critical
    assert_eq!(detector.run_cycle(CYCLE, &bus), SystemState::Malfunction);
    let status = *detector.status(WheelPosition::FrontLeft);
    assert!(status.confirmed);
    assert_eq!(status.kind, MalfunctionKind::Miscalibration);
    assert_eq!(status.severity, Severity::High);

    // 4. Other wheels unaffected
    for wheel in [
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ] {
        assert!(!detector.status(wheel).active);
    }

    // 5. Sensor repaired, condition disappears on the next cycle
    bus.force_calibration(WheelPosition::FrontLeft, SensorCalibration::factory());
    assert_eq!(detector.run_cycle(CYCLE, &bus), SystemState::Monitoring);
    assert!(detector.check_system_health().healthy);

    // 6. Explicit clear wipes the remembered kind
    detector.clear(WheelPosition::FrontLeft);
    assert_eq!(
        detector.status(WheelPosition::FrontLeft).kind,
        MalfunctionKind::None
    );

    Ok(())
}

#[test]
fn test_sensor_dropout_is_worst_case_plausibility_failure() {
    let bus = MockSensorBus::cruising(60.0);
    let mut detector = MalfunctionDetector::new();

    let mut data = cruising(60.0);
    data.wheels[WheelPosition::RearLeft] = SpeedData::invalid();
    detector.update_vehicle_data(data);

    let mut state = SystemState::Monitoring;
    for _ in 0..5 {
        state = detector.run_cycle(CYCLE, &bus);
    }

    // Low severity, so the vehicle is degraded rather than malfunctioning
    assert_eq!(state, SystemState::Degraded);
    assert!(detector.status(WheelPosition::RearLeft).confirmed);
    assert!(detector.detect_speed_differences().is_none());
}
