//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use wheelspeed_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_some};

#[cfg(feature = "mock")]
pub use crate::mock::{MemoryStore, MockSensorBus, RecordingFaultReporter};

#[cfg(feature = "logging")]
pub use crate::logging::init_test_tracing;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
