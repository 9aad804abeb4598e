//! Prelude for convenient imports.
//!
//! ```rust
//! use wheelspeed_calibration::prelude::*;
//! ```

pub use crate::{
    CalibrationConfig, CalibrationContext, CalibrationError, CalibrationManager,
    CalibrationMethod, CalibrationRequest, CalibrationResult, CalibrationSession,
    CalibrationState, CalibrationUpdate, CalibrationValidation, LoadOutcome, SessionResult,
};
