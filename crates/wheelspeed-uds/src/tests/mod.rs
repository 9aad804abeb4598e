//! Unit tests for the diagnostic server.

mod did_tests;

use core::fmt::Write as _;
use core::time::Duration;
use wheelspeed_calibration::CalibrationManager;
use wheelspeed_detector::MalfunctionDetector;
use wheelspeed_test_helpers::prelude::*;
use wheelspeed_types::{SpeedData, VehicleData, WheelMap};

use crate::{DiagnosticContext, DiagnosticRequest, DiagnosticServer, DiagnosticSession};

pub(crate) const CYCLE: Duration = Duration::from_millis(20);
pub(crate) const MAX_RESPONSE: usize = 64;

/// A server wired to a detector, a calibration manager and in-memory
/// collaborators.
#[derive(Debug, Default)]
pub(crate) struct Bench {
    pub server: DiagnosticServer,
    pub detector: MalfunctionDetector,
    pub calibration: CalibrationManager,
    pub bus: MockSensorBus,
    pub store: MemoryStore,
    pub now: Duration,
}

impl Bench {
    /// Send a raw frame and return the response bytes.
    pub fn send(&mut self, frame: &[u8]) -> Vec<u8> {
        self.send_with_max(frame, MAX_RESPONSE)
    }

    pub fn send_with_max(&mut self, frame: &[u8], max: usize) -> Vec<u8> {
        let request = must(DiagnosticRequest::from_bytes(frame, max));
        let mut ctx = DiagnosticContext {
            detector: &mut self.detector,
            calibration: &mut self.calibration,
            provider: &mut self.bus,
            store: &mut self.store,
            now: self.now,
        };
        self.server.process(&request, &mut ctx).into_bytes()
    }

    /// Send and render the response as spaced hex.
    pub fn hex(&mut self, frame: &[u8]) -> String {
        hex(&self.send(frame))
    }

    pub fn enter(&mut self, session: DiagnosticSession) {
        let response = self.send(&[0x10, session.code()]);
        assert_eq!(response.first(), Some(&0x50));
    }

    /// Advance one cycle: detector on the bus snapshot, then the server.
    pub fn tick(&mut self) {
        self.now += CYCLE;
        let wheels = WheelMap::from_fn(|w| self.bus.readings[w]);
        self.detector.update_vehicle_data(VehicleData::from_wheels(wheels));
        self.detector.run_cycle(CYCLE, &self.bus);
        self.server.run_cycle(&self.detector, self.now);
    }

    pub fn cruise(speed_kmh: f32) -> Self {
        let mut bench = Self::default();
        bench.bus.set_all_speeds(speed_kmh);
        bench
            .detector
            .update_vehicle_data(VehicleData::from_wheels(WheelMap::from_fn(|_| {
                SpeedData::valid(speed_kmh)
            })));
        bench
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().saturating_mul(3));
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _written = write!(out, "{byte:02X}");
    }
    out
}
