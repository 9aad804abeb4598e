//! Fault codes raised by the calibration manager.

/// A calibration session failed or timed out.
pub const CALIBRATION_FAILED: u32 = 0xC1_4187;

/// A correction factor outside the configured bounds was rejected.
pub const CALIBRATION_OUT_OF_RANGE: u32 = 0xC1_4287;

/// Non-volatile storage could not be read or written.
pub const NVM_ERROR: u32 = 0xC1_4387;
