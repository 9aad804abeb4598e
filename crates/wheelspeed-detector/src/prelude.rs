//! Prelude for convenient imports.
//!
//! ```rust
//! use wheelspeed_detector::prelude::*;
//! ```

pub use crate::{
    DetectionCounters, DetectionParameters, DetectionParametersBuilder, DetectorError,
    DetectorResult, Finding, MalfunctionDetector, MalfunctionKind, MalfunctionStatus, Severity,
    SystemHealth, SystemState, median_valid_speed,
};
