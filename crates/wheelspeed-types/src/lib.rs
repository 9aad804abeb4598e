//! Shared domain types for the wheel-speed monitor.
//!
//! Every other crate in the workspace speaks in terms of the types defined
//! here:
//!
//! - [`WheelPosition`] and the per-wheel table [`WheelMap`]
//! - Sensor records: [`SpeedData`], [`SensorCalibration`], [`VehicleData`]
//! - Classification enums: [`MalfunctionKind`], [`Severity`], [`SystemState`]
//! - Collaborator contracts: [`SpeedDataProvider`], [`CalibrationStore`],
//!   [`FaultReporter`]
//!
//! Time is never read from the OS. Callers inject a monotonic tick as a
//! [`core::time::Duration`] measured from subsystem start.
//!
//! # Example
//!
//! ```rust
//! use wheelspeed_types::{WheelMap, WheelPosition};
//!
//! let mut counts = WheelMap::<u32>::default();
//! counts[WheelPosition::RearLeft] += 1;
//! assert_eq!(counts.iter().map(|(_, c)| *c).sum::<u32>(), 1);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod error;
mod malfunction;
mod ports;
mod sensor;
mod wheel;

pub use error::{InvalidWheelIndex, ProviderError, ProviderResult, StoreError, StoreResult};
pub use malfunction::{MalfunctionKind, Severity, SystemState};
pub use ports::{BlockId, CalibrationStore, FaultReporter, SpeedDataProvider};
pub use sensor::{SensorCalibration, SpeedData, VehicleData, millis_u32};
pub use wheel::{WheelMap, WheelPosition};
