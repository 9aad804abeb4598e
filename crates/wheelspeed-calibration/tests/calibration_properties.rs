//! Property-based tests for estimation, history and the session lifecycle.

use core::time::Duration;
use proptest::prelude::*;
use wheelspeed_calibration::{
    CalibrationConfig, CalibrationEstimate, CalibrationHistory, CalibrationHistoryEntry,
    CalibrationManager, CalibrationMethod, CalibrationRequest, CalibrationSample, HISTORY_CAPACITY,
    SessionResult,
};
use wheelspeed_test_helpers::prelude::*;
use wheelspeed_types::{SpeedData, WheelPosition};

const CYCLE: Duration = Duration::from_millis(20);

fn sample() -> impl Strategy<Value = CalibrationSample> {
    (-10.0f32..200.0, -10.0f32..200.0).prop_map(|(m, r)| CalibrationSample::new(m, r))
}

proptest! {
    #[test]
    fn test_estimate_uses_only_positive_pairs(
        samples in proptest::collection::vec(sample(), 0..200),
    ) {
        let usable = samples
            .iter()
            .filter(|s| s.measured_kmh > 0.0 && s.reference_kmh > 0.0)
            .count();
        match CalibrationEstimate::from_samples(&samples) {
            None => prop_assert_eq!(usable, 0),
            Some(est) => {
                prop_assert_eq!(est.usable_samples, usable);
                prop_assert!(est.correction_factor > 0.0);
                prop_assert!(est.accuracy_percent <= 100.0 + 1e-3);
                prop_assert_eq!(est.offset.to_bits(), 0.0f32.to_bits());
            }
        }
    }

    #[test]
    fn test_constant_ratio_recovers_factor(
        speed in 20.0f32..180.0,
        factor in 0.6f32..1.4,
        n in 1usize..100,
    ) {
        let samples: Vec<_> = (0..n)
            .map(|_| CalibrationSample::new(speed, speed * factor))
            .collect();
        let est = must_some(CalibrationEstimate::from_samples(&samples), "usable samples");
        prop_assert!((est.correction_factor - factor).abs() < 1e-3);
    }

    #[test]
    fn test_history_keeps_newest_entries(count in 0usize..40) {
        let mut history = CalibrationHistory::new();
        for i in 0..count {
            history.record(CalibrationHistoryEntry {
                timestamp_ms: u32::try_from(i).unwrap_or(u32::MAX),
                method: CalibrationMethod::Manual,
                result: SessionResult::Ok,
                old_correction_factor: 1.0,
                new_correction_factor: 1.0,
                accuracy_percent: 100.0,
            });
        }
        prop_assert_eq!(history.len(), count.min(HISTORY_CAPACITY));
        let first = count.saturating_sub(HISTORY_CAPACITY);
        let stamps: Vec<u32> = history.iter().map(|e| e.timestamp_ms).collect();
        let expected: Vec<u32> = (first..count)
            .map(|i| u32::try_from(i).unwrap_or(u32::MAX))
            .collect();
        prop_assert_eq!(stamps, expected);
    }

    #[test]
    fn test_active_sessions_have_no_end_time(
        speeds in proptest::collection::vec(prop_oneof![Just(None), (1.0f32..150.0).prop_map(Some)], 1..120),
        cancel_at in proptest::option::of(0usize..120),
    ) {
        let config = must(CalibrationConfig::builder().samples(5, 50).session_timeout_ms(1_500).build());
        let mut manager = must(CalibrationManager::new(config));
        let mut bus = MockSensorBus::cruising(60.0);
        let mut faults = RecordingFaultReporter::new();
        let wheel = WheelPosition::FrontRight;

        let request = CalibrationRequest::new(wheel, CalibrationMethod::GpsBased, 60.0)
            .with_duration_ms(300)
            .with_tolerance(50.0);
        must(manager.start(request, Duration::ZERO));

        let mut now = Duration::ZERO;
        for (i, speed) in speeds.iter().enumerate() {
            now += CYCLE;
            bus.set_reading(wheel, speed.map_or_else(SpeedData::invalid, SpeedData::valid));
            if cancel_at == Some(i) {
                let _cancelled = manager.cancel(wheel, now).is_ok();
            }
            manager.process(&bus, &mut faults, now);

            let session = manager.session(wheel);
            if session.is_active() {
                prop_assert!(session.ended_at.is_none());
            }
            prop_assert!(usize::from(session.samples_collected) <= 50);
            prop_assert_eq!(usize::from(session.samples_collected), manager.samples(wheel).len());
        }

        manager.process(&bus, &mut faults, now + CYCLE);
        let session = manager.session(wheel);
        prop_assert_eq!(session.is_active(), session.ended_at.is_none());
    }
}
