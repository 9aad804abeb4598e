//! Wheel-speed monitor subsystem.
//!
//! Ties the workspace together: [`WheelSpeedSubsystem`] owns a
//! [`MalfunctionDetector`](wheelspeed_detector::MalfunctionDetector), a
//! [`CalibrationManager`](wheelspeed_calibration::CalibrationManager) and a
//! [`DiagnosticServer`](wheelspeed_uds::DiagnosticServer), plus the sensor
//! provider and calibration store they share. No global state is involved;
//! several subsystems can run side by side.
//!
//! # Example
//!
//! ```rust,ignore
//! use wheelspeed_subsystem::prelude::*;
//!
//! let config = SubsystemConfig::from_yaml_str("cycle_period_ms: 10\n")?;
//! let mut subsystem = WheelSpeedSubsystem::new(config, sensors, nvm)?;
//! let state = subsystem.run_cycle(false);
//! let status = subsystem.handle_bytes(&[0x22, 0xF1, 0x20], 64)?;
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod config;
mod error;
mod shared;
mod subsystem;

pub mod prelude;

pub use config::{SubsystemConfig, SubsystemConfigBuilder};
pub use error::{SubsystemError, SubsystemResult};
pub use shared::SharedSubsystem;
pub use subsystem::WheelSpeedSubsystem;

#[cfg(test)]
mod tests;
