//! End-to-end scenarios for the wheel-speed monitor.
//!
//! The suite drives a complete [`WheelSpeedSubsystem`] over in-memory
//! sensors and storage:
//! - Fault injection on one wheel with a scripted timeline
//! - Calibration round trips through the diagnostic wire protocol
//! - Persistence fallback across simulated power cycles

#![deny(rust_2018_idioms)]
#![deny(warnings)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::print_stdout)]

pub mod rig;
pub mod scenario;

pub use rig::Rig;
pub use scenario::{FaultInjection, Injection, Scenario, ScenarioReport};

use wheelspeed_subsystem::WheelSpeedSubsystem;
use wheelspeed_test_helpers::prelude::{MemoryStore, MockSensorBus};

/// Subsystem over in-memory collaborators.
pub type TestSubsystem = WheelSpeedSubsystem<MockSensorBus, MemoryStore>;

/// Response buffer size used by the scenarios.
pub const MAX_RESPONSE_LEN: usize = 64;
