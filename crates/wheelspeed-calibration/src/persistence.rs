//! Calibration blob encoding and store addressing.
//!
//! Blobs are a format version byte followed by the bincode (legacy
//! configuration) encoding of [`SensorCalibration`].

use serde::{Deserialize, Serialize};
use wheelspeed_types::{BlockId, SensorCalibration, WheelPosition};

use crate::{CalibrationError, CalibrationResult};

const FIRST_BLOCK: BlockId = 0x1001;
const FORMAT_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct StoredCalibration {
    version: u8,
    calibration: SensorCalibration,
}

fn config() -> impl bincode::config::Config {
    bincode::config::legacy()
}

/// Store block holding `wheel`'s calibration.
pub fn block_id(wheel: WheelPosition) -> BlockId {
    FIRST_BLOCK.saturating_add(BlockId::from(wheel.index()))
}

/// Encode a calibration for storage.
///
/// # Errors
///
/// Returns [`CalibrationError::Encoding`] if serialization fails.
pub fn encode_calibration(
    wheel: WheelPosition,
    calibration: &SensorCalibration,
) -> CalibrationResult<Vec<u8>> {
    let stored = StoredCalibration {
        version: FORMAT_VERSION,
        calibration: *calibration,
    };
    bincode::serde::encode_to_vec(&stored, config())
        .map_err(|e| CalibrationError::encoding(wheel, e.to_string()))
}

/// Decode a stored calibration blob.
///
/// # Errors
///
/// Returns [`CalibrationError::Encoding`] for truncated blobs, trailing
/// bytes or an unknown format version.
pub fn decode_calibration(
    wheel: WheelPosition,
    bytes: &[u8],
) -> CalibrationResult<SensorCalibration> {
    let (stored, used): (StoredCalibration, usize) =
        bincode::serde::decode_from_slice(bytes, config())
            .map_err(|e| CalibrationError::encoding(wheel, e.to_string()))?;
    if used != bytes.len() {
        return Err(CalibrationError::encoding(
            wheel,
            format!("trailing bytes: used {used} of {}", bytes.len()),
        ));
    }
    if stored.version != FORMAT_VERSION {
        return Err(CalibrationError::encoding(
            wheel,
            format!("unsupported format version {}", stored.version),
        ));
    }
    Ok(stored.calibration)
}
