//! Prelude for convenient imports.
//!
//! ```rust
//! use wheelspeed_subsystem::prelude::*;
//! ```

pub use crate::{
    SharedSubsystem, SubsystemConfig, SubsystemConfigBuilder, SubsystemError, SubsystemResult,
    WheelSpeedSubsystem,
};
