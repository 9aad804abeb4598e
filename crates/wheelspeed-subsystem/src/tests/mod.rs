//! Unit tests for the subsystem context.

mod reset_tests;

use wheelspeed_test_helpers::prelude::*;

use crate::{SubsystemConfig, WheelSpeedSubsystem};

pub(crate) type TestSubsystem = WheelSpeedSubsystem<MockSensorBus, MemoryStore>;

/// Subsystem with default configuration over a cruising bus and a blank store.
pub(crate) fn subsystem() -> TestSubsystem {
    subsystem_with(MockSensorBus::default(), MemoryStore::new())
}

pub(crate) fn subsystem_with(bus: MockSensorBus, store: MemoryStore) -> TestSubsystem {
    init_test_tracing();
    must(WheelSpeedSubsystem::new(SubsystemConfig::default(), bus, store))
}

/// Send a frame and return the response bytes.
pub(crate) fn send(subsystem: &mut TestSubsystem, frame: &[u8]) -> Vec<u8> {
    must(subsystem.handle_bytes(frame, 64)).into_bytes()
}
