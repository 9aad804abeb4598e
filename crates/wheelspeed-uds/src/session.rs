//! Diagnostic session types.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Diagnostic session. Gates which services are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiagnosticSession {
    /// Default session, entered at power-up and after S3 timeout.
    #[default]
    Default = 0x01,
    /// Programming session. Required for a hard reset.
    Programming = 0x02,
    /// Extended session. Required for writes and routines.
    Extended = 0x03,
    /// Safety system session.
    SafetySystem = 0x04,
}

impl DiagnosticSession {
    /// Wire value.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire value.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Default),
            0x02 => Some(Self::Programming),
            0x03 => Some(Self::Extended),
            0x04 => Some(Self::SafetySystem),
            _ => None,
        }
    }
}

impl fmt::Display for DiagnosticSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Programming => "programming",
            Self::Extended => "extended",
            Self::SafetySystem => "safety-system",
        };
        f.write_str(name)
    }
}
