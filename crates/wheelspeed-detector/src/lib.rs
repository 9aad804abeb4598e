//! Wheel-speed sensor malfunction detection.
//!
//! The detector runs once per fixed detection cycle. For every wheel it
//! evaluates a short, priority-ordered chain of checks and stops at the
//! first one that fires:
//!
//! 1. **Calibration drift**: `|correction_factor - 1| * 100` above the drift
//!    threshold (reported as [`MalfunctionKind::Miscalibration`]).
//! 2. **Speed plausibility**: distance from the median of all valid wheel
//!    speeds above the speed-difference threshold, or the reading is invalid.
//! 3. **Acceleration plausibility**: `|acceleration|` above the threshold
//!    while the brake pedal is released, or the reading is invalid.
//!
//! # Debounce
//!
//! ```text
//!            condition present              elapsed >= debounce
//! ┌──────────┐ ─────────────────► ┌────────┐ ──────────────────► ┌───────────┐
//! │ Inactive │                    │ Active │                     │ Confirmed │
//! └──────────┘ ◄───────────────── └────────┘                     └─────┬─────┘
//!      ▲         condition gone                                        │
//!      └───────────────────────────────────────────────────────────────┘
//!                     condition gone or explicit clear
//! ```
//!
//! Debounce time is accumulated from the elapsed cycle time handed to
//! [`MalfunctionDetector::run_cycle`]; no OS timer is involved.
//!
//! # Example
//!
//! ```rust
//! use core::time::Duration;
//! use wheelspeed_detector::MalfunctionDetector;
//! use wheelspeed_types::{SpeedData, SystemState, VehicleData, WheelMap};
//! # use wheelspeed_types::*;
//! # struct Factory;
//! # impl SpeedDataProvider for Factory {
//! #     fn speed_data(&self, _: WheelPosition) -> ProviderResult<SpeedData> { Ok(SpeedData::valid(60.0)) }
//! #     fn calibration(&self, _: WheelPosition) -> ProviderResult<SensorCalibration> { Ok(SensorCalibration::factory()) }
//! #     fn set_calibration(&mut self, _: WheelPosition, _: SensorCalibration) -> ProviderResult<()> { Ok(()) }
//! # }
//!
//! let mut detector = MalfunctionDetector::new();
//! detector.update_vehicle_data(VehicleData::from_wheels(WheelMap::from_fn(|_| {
//!     SpeedData::valid(60.0)
//! })));
//!
//! let state = detector.run_cycle(Duration::from_millis(20), &Factory);
//! assert_eq!(state, SystemState::Monitoring);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod checks;
mod detector;
mod error;
mod parameters;
mod status;

pub mod prelude;

pub use checks::{
    Finding, acceleration_plausibility, calibration_drift, median_valid_speed, speed_plausibility,
};
pub use detector::{MalfunctionDetector, SystemHealth};
pub use error::{DetectorError, DetectorResult};
pub use parameters::{DetectionParameters, DetectionParametersBuilder};
pub use status::{DetectionCounters, MalfunctionStatus};

pub use wheelspeed_types::{MalfunctionKind, Severity, SystemState};
