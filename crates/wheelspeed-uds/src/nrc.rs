//! Negative response codes.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Reason carried by a negative response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NegativeResponseCode {
    /// Request rejected for an unspecified reason.
    GeneralReject = 0x10,
    /// Unknown service id.
    ServiceNotSupported = 0x11,
    /// Unknown sub-function or session.
    SubFunctionNotSupported = 0x12,
    /// Request too short, too long, or response buffer too small.
    IncorrectMessageLength = 0x13,
    /// Wrong diagnostic session or ECU state.
    ConditionsNotCorrect = 0x22,
    /// Request arrived in the wrong order.
    RequestSequenceError = 0x24,
    /// Identifier or parameter outside the supported range.
    RequestOutOfRange = 0x31,
    /// Security access required.
    SecurityAccessDenied = 0x33,
}

impl NegativeResponseCode {
    /// Wire value.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire value.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x10 => Some(Self::GeneralReject),
            0x11 => Some(Self::ServiceNotSupported),
            0x12 => Some(Self::SubFunctionNotSupported),
            0x13 => Some(Self::IncorrectMessageLength),
            0x22 => Some(Self::ConditionsNotCorrect),
            0x24 => Some(Self::RequestSequenceError),
            0x31 => Some(Self::RequestOutOfRange),
            0x33 => Some(Self::SecurityAccessDenied),
            _ => None,
        }
    }
}

impl fmt::Display for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::GeneralReject => "general reject",
            Self::ServiceNotSupported => "service not supported",
            Self::SubFunctionNotSupported => "sub-function not supported",
            Self::IncorrectMessageLength => "incorrect message length",
            Self::ConditionsNotCorrect => "conditions not correct",
            Self::RequestSequenceError => "request sequence error",
            Self::RequestOutOfRange => "request out of range",
            Self::SecurityAccessDenied => "security access denied",
        };
        write!(f, "{text} (0x{:02X})", self.code())
    }
}
