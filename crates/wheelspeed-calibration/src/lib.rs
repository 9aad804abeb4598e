//! Wheel-speed sensor calibration management.
//!
//! Each wheel owns exactly one [`CalibrationSession`] for the lifetime of the
//! [`CalibrationManager`]. A session is driven by the cyclic
//! [`CalibrationManager::process`] call:
//!
//! ```text
//!  start()          next tick              min samples && duration elapsed
//! ┌──────┐ ───► ┌───────────┐ ───► ┌─────────────┐ ───────────────────► ┌───────────┐
//! │ Idle │      │ Requested │      │ In progress │                      │ Completed │
//! └──────┘      └───────────┘      └──────┬──────┘                      └───────────┘
//!                                         │ validation failed / timeout
//!                                         ▼
//!                                   ┌──────────┐      cancel()   ┌───────────┐
//!                                   │  Failed  │                 │ Cancelled │
//!                                   └──────────┘                 └───────────┘
//! ```
//!
//! Terminal sessions are retired (end time stamped) on the tick after they
//! finish. Only a completed session with an `Ok` result can be applied to
//! the sensor.
//!
//! Collaborators are passed in per call through a [`CalibrationContext`],
//! so the manager owns no references and can live inside a larger context
//! object.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod config;
mod error;
mod estimate;
mod history;
mod manager;
mod persistence;
mod session;
mod types;

pub mod fault_codes;
pub mod prelude;

pub use config::{CalibrationConfig, CalibrationConfigBuilder, MAX_SAMPLE_CAPACITY};
pub use error::{CalibrationError, CalibrationResult};
pub use estimate::{CalibrationEstimate, CalibrationSample};
pub use history::{CalibrationHistory, CalibrationHistoryEntry, HISTORY_CAPACITY};
pub use manager::{
    CalibrationContext, CalibrationManager, CalibrationUpdate, FallbackReason, LoadOutcome,
};
pub use persistence::{block_id, decode_calibration, encode_calibration};
pub use session::CalibrationSession;
pub use types::{
    AUTO_CALIBRATION_DURATION_MS, AUTO_CALIBRATION_REFERENCE_KMH, CalibrationMethod,
    CalibrationRequest, CalibrationState, CalibrationValidation, SessionResult,
};

#[cfg(test)]
mod tests;
