//! Unit tests for the calibration manager.

mod persistence_tests;
mod session_tests;

use core::time::Duration;
use wheelspeed_test_helpers::prelude::*;

use crate::CalibrationContext;

pub(crate) const CYCLE: Duration = Duration::from_millis(20);

/// Sensor bus, store and fault sink bundled for manager calls.
#[derive(Debug, Default)]
pub(crate) struct Rig {
    pub bus: MockSensorBus,
    pub store: MemoryStore,
    pub faults: RecordingFaultReporter,
}

impl Rig {
    pub fn ctx(&mut self, now: Duration) -> CalibrationContext<'_> {
        CalibrationContext {
            provider: &mut self.bus,
            store: &mut self.store,
            faults: &mut self.faults,
            now,
        }
    }
}
