//! UDS diagnostic service for the wheel-speed monitor.
//!
//! The [`DiagnosticServer`] answers ISO 14229 style requests against the
//! detector and calibration manager, owns the diagnostic session and keeps
//! the [`DtcRegistry`].
//!
//! | SID  | Service                     | Session   |
//! |------|-----------------------------|-----------|
//! | 0x10 | DiagnosticSessionControl    | any       |
//! | 0x11 | ECUReset (hard)             | programming |
//! | 0x14 | ClearDiagnosticInformation  | any       |
//! | 0x19 | ReadDTCInformation          | any       |
//! | 0x22 | ReadDataByIdentifier        | any       |
//! | 0x2E | WriteDataByIdentifier       | extended  |
//! | 0x2F | InputOutputControl          | rejected  |
//! | 0x31 | RoutineControl (start)      | extended  |
//!
//! Every request is answered. Positive responses carry `sid + 0x40`;
//! negative responses are exactly `7F sid nrc`.
//!
//! # Example
//!
//! ```rust
//! use core::time::Duration;
//! use wheelspeed_calibration::CalibrationManager;
//! use wheelspeed_detector::MalfunctionDetector;
//! use wheelspeed_uds::{DiagnosticContext, DiagnosticRequest, DiagnosticServer};
//! # use wheelspeed_types::*;
//! # struct Bus;
//! # impl SpeedDataProvider for Bus {
//! #     fn speed_data(&self, _: WheelPosition) -> ProviderResult<SpeedData> { Ok(SpeedData::valid(60.0)) }
//! #     fn calibration(&self, _: WheelPosition) -> ProviderResult<SensorCalibration> { Ok(SensorCalibration::factory()) }
//! #     fn set_calibration(&mut self, _: WheelPosition, _: SensorCalibration) -> ProviderResult<()> { Ok(()) }
//! # }
//! # struct Nvm;
//! # impl CalibrationStore for Nvm {
//! #     fn read_block(&self, b: BlockId) -> StoreResult<Vec<u8>> { Err(StoreError::BlockNotFound(b)) }
//! #     fn write_block(&mut self, _: BlockId, _: &[u8]) -> StoreResult<()> { Ok(()) }
//! # }
//!
//! let mut server = DiagnosticServer::default();
//! let mut detector = MalfunctionDetector::new();
//! let mut calibration = CalibrationManager::default();
//! let (mut bus, mut nvm) = (Bus, Nvm);
//! let mut ctx = DiagnosticContext {
//!     detector: &mut detector,
//!     calibration: &mut calibration,
//!     provider: &mut bus,
//!     store: &mut nvm,
//!     now: Duration::ZERO,
//! };
//!
//! let request = DiagnosticRequest::new(0x10, [0x03], 64);
//! let response = server.process(&request, &mut ctx);
//! assert_eq!(response.as_bytes(), &[0x50, 0x03, 0x00, 0x32, 0x01, 0xF4]);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod config;
mod did;
mod dtc;
mod error;
mod message;
mod monitor;
mod nrc;
mod routine;
mod service;
mod session;

pub mod ids;
pub mod prelude;

pub use config::DiagnosticConfig;
pub use did::{
    CALIBRATION_LEN, DataIdentifier, MALFUNCTION_COUNTER_LEN, SPEED_DATA_LEN, SYSTEM_STATUS_LEN,
    decode_calibration_write, encode_calibration, encode_malfunction_counters, encode_speed_data,
    encode_system_status,
};
pub use dtc::{CONFIRMATION_THRESHOLD, DTC_CAPACITY, DtcRecord, DtcRegistry, DtcStatus, FaultContext};
pub use error::{DiagnosticError, DiagnosticResult};
pub use message::{DiagnosticRequest, DiagnosticResponse, MIN_RESPONSE_LEN};
pub use monitor::{dtc_for_malfunction, report_confirmed};
pub use nrc::NegativeResponseCode;
pub use routine::{RoutineId, START_CALIBRATION_RECORD_LEN, start_calibration_request};
pub use service::{DiagnosticContext, DiagnosticServer, ServiceKind};
pub use session::DiagnosticSession;

#[cfg(test)]
mod tests;
