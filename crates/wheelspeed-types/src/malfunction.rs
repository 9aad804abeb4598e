//! Malfunction classification shared by the detector and the diagnostic layer.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Kind of malfunction attributed to a wheel.
///
/// The discriminant is reported verbatim in the system status data
/// identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum MalfunctionKind {
    /// No malfunction recorded.
    #[default]
    None = 0,
    /// Correction factor has drifted away from unity.
    Miscalibration = 1,
    /// Sensor reports no usable data.
    SensorFailure = 2,
    /// Wheel slip beyond tolerance.
    WheelSlipExcessive = 3,
    /// Wheel speed deviates too far from the vehicle median.
    SpeedDifferenceExcessive = 4,
    /// Acceleration outside the physically plausible band.
    AccelerationImplausible = 5,
    /// Calibration drifting over time.
    CalibrationDrift = 6,
    /// Internal subsystem error.
    SystemError = 7,
}

impl MalfunctionKind {
    /// Numeric code of this kind.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a kind by numeric code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Miscalibration),
            2 => Some(Self::SensorFailure),
            3 => Some(Self::WheelSlipExcessive),
            4 => Some(Self::SpeedDifferenceExcessive),
            5 => Some(Self::AccelerationImplausible),
            6 => Some(Self::CalibrationDrift),
            7 => Some(Self::SystemError),
            _ => None,
        }
    }

    /// Classify a deviation magnitude for this kind.
    ///
    /// Breakpoints are strict (`>`), so a deviation sitting exactly on a
    /// breakpoint lands in the lower band. Kinds without a dedicated table
    /// are always [`Severity::Low`].
    pub fn severity_for(self, deviation: f32) -> Severity {
        match self {
            Self::Miscalibration => {
                if deviation > 15.0 {
                    Severity::Critical
                } else if deviation > 10.0 {
                    Severity::High
                } else if deviation > 5.0 {
                    Severity::Medium
                } else {
                    Severity::Low
                }
            }
            Self::SpeedDifferenceExcessive => {
                if deviation > 50.0 {
                    Severity::Critical
                } else if deviation > 30.0 {
                    Severity::High
                } else if deviation > 20.0 {
                    Severity::Medium
                } else {
                    Severity::Low
                }
            }
            Self::AccelerationImplausible => {
                if deviation > 20.0 {
                    Severity::Critical
                } else if deviation > 15.0 {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            _ => Severity::Low,
        }
    }
}

impl fmt::Display for MalfunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "no malfunction",
            Self::Miscalibration => "sensor miscalibration",
            Self::SensorFailure => "sensor failure",
            Self::WheelSlipExcessive => "excessive wheel slip",
            Self::SpeedDifferenceExcessive => "excessive speed difference",
            Self::AccelerationImplausible => "implausible acceleration",
            Self::CalibrationDrift => "calibration drift",
            Self::SystemError => "system error",
        };
        f.write_str(text)
    }
}

/// Malfunction severity, ordered from harmless to critical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Severity {
    /// No malfunction.
    #[default]
    None = 0,
    /// Informational.
    Low = 1,
    /// Degrades accuracy.
    Medium = 2,
    /// Function impaired.
    High = 3,
    /// Function must not be relied upon.
    Critical = 4,
}

impl Severity {
    /// Numeric code of this severity.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Aggregate state of the wheel-speed subsystem.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum SystemState {
    /// Not yet started.
    #[default]
    Inactive = 0,
    /// Normal supervision.
    Monitoring = 1,
    /// Active brake intervention.
    Intervention = 2,
    /// A confirmed malfunction of high or critical severity exists.
    Malfunction = 3,
    /// A confirmed malfunction of lower severity exists.
    Degraded = 4,
}

impl SystemState {
    /// Numeric code of this state.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Inactive => "inactive",
            Self::Monitoring => "monitoring",
            Self::Intervention => "intervention",
            Self::Malfunction => "malfunction",
            Self::Degraded => "degraded",
        };
        f.write_str(text)
    }
}
