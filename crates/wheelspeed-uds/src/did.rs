//! Data identifiers and their payload layouts.
//!
//! All values are big-endian scaled integers. Floats are scaled, rounded
//! and saturated into the target integer range.

use wheelspeed_calibration::CalibrationUpdate;
use wheelspeed_detector::{MalfunctionStatus, SystemHealth};
use wheelspeed_types::{SensorCalibration, SpeedData, WheelMap, WheelPosition};

use crate::ids::did;

/// Length of the speed data payload.
pub const SPEED_DATA_LEN: usize = 8;
/// Length of the calibration payload.
pub const CALIBRATION_LEN: usize = 13;
/// Length of the system status payload.
pub const SYSTEM_STATUS_LEN: usize = 15;
/// Length of the malfunction counter payload.
pub const MALFUNCTION_COUNTER_LEN: usize = 8;

/// A supported data identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataIdentifier {
    /// Live speed reading of one wheel (read only).
    SpeedData(WheelPosition),
    /// Calibration of one wheel (read/write).
    Calibration(WheelPosition),
    /// Aggregate system status (read only).
    SystemStatus,
    /// Per-wheel occurrence counters (read only).
    MalfunctionCounter,
    /// Active diagnostic session (read only).
    ActiveSession,
}

impl DataIdentifier {
    /// Route a raw identifier.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            did::SPEED_SENSOR_FL..=did::SPEED_SENSOR_RR => {
                wheel_at(id, did::SPEED_SENSOR_FL).map(Self::SpeedData)
            }
            did::CALIBRATION_FL..=did::CALIBRATION_RR => {
                wheel_at(id, did::CALIBRATION_FL).map(Self::Calibration)
            }
            did::SYSTEM_STATUS => Some(Self::SystemStatus),
            did::MALFUNCTION_COUNTER => Some(Self::MalfunctionCounter),
            did::DIAGNOSTIC_SESSION => Some(Self::ActiveSession),
            _ => None,
        }
    }

    /// Raw identifier.
    pub fn id(self) -> u16 {
        match self {
            Self::SpeedData(wheel) => did::SPEED_SENSOR_FL.saturating_add(u16::from(wheel.index())),
            Self::Calibration(wheel) => did::CALIBRATION_FL.saturating_add(u16::from(wheel.index())),
            Self::SystemStatus => did::SYSTEM_STATUS,
            Self::MalfunctionCounter => did::MALFUNCTION_COUNTER,
            Self::ActiveSession => did::DIAGNOSTIC_SESSION,
        }
    }

    /// Whether WriteDataByIdentifier accepts this identifier.
    pub fn is_writable(self) -> bool {
        matches!(self, Self::Calibration(_))
    }
}

pub(crate) fn wheel_at(id: u16, base: u16) -> Option<WheelPosition> {
    let offset = id.checked_sub(base)?;
    WheelPosition::from_index(u8::try_from(offset).ok()?)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is rounded and clamped into the u16 range first"
)]
pub(crate) fn scale_u16(value: f32, scale: f32) -> u16 {
    let scaled = (value * scale).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(0.0, f32::from(u16::MAX)) as u16
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is rounded and clamped into the i16 range first"
)]
pub(crate) fn scale_i16(value: f32, scale: f32) -> i16 {
    let scaled = (value * scale).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is rounded and clamped into the u8 range first"
)]
pub(crate) fn scale_u8(value: f32) -> u8 {
    let rounded = value.round();
    if rounded.is_nan() {
        return 0;
    }
    rounded.clamp(0.0, f32::from(u8::MAX)) as u8
}

/// Speed payload: speed ×100, raw ×100, acceleration ×100, valid, quality.
pub fn encode_speed_data(data: &SpeedData) -> [u8; SPEED_DATA_LEN] {
    let [s0, s1] = scale_u16(data.speed_kmh, 100.0).to_be_bytes();
    let [r0, r1] = scale_u16(data.raw_speed_kmh, 100.0).to_be_bytes();
    let [a0, a1] = scale_i16(data.acceleration_mps2, 100.0).to_be_bytes();
    [s0, s1, r0, r1, a0, a1, u8::from(data.valid), data.quality]
}

/// Calibration payload: factor ×10000, offset ×100, pulses/rev,
/// circumference in mm, valid, timestamp.
pub fn encode_calibration(cal: &SensorCalibration) -> [u8; CALIBRATION_LEN] {
    let [f0, f1] = scale_u16(cal.correction_factor, 10_000.0).to_be_bytes();
    let [o0, o1] = scale_i16(cal.offset, 100.0).to_be_bytes();
    let [p0, p1] = cal.pulses_per_revolution.to_be_bytes();
    let [c0, c1] = scale_u16(cal.wheel_circumference_m, 1_000.0).to_be_bytes();
    let [t0, t1, t2, t3] = cal.timestamp_ms.to_be_bytes();
    [f0, f1, o0, o1, p0, p1, c0, c1, u8::from(cal.valid), t0, t1, t2, t3]
}

/// Decode a calibration write.
///
/// Accepts 2 bytes (factor), 4 bytes (+ offset) or 8 bytes (+ pulses/rev and
/// circumference). Any other length yields `None`.
pub fn decode_calibration_write(data: &[u8]) -> Option<CalibrationUpdate> {
    let factor = |hi: u8, lo: u8| f32::from(u16::from_be_bytes([hi, lo])) / 10_000.0;
    let offset = |hi: u8, lo: u8| f32::from(i16::from_be_bytes([hi, lo])) / 100.0;

    match *data {
        [f0, f1] => Some(CalibrationUpdate::factor(factor(f0, f1))),
        [f0, f1, o0, o1] => Some(CalibrationUpdate {
            offset: Some(offset(o0, o1)),
            ..CalibrationUpdate::factor(factor(f0, f1))
        }),
        [f0, f1, o0, o1, p0, p1, c0, c1] => Some(CalibrationUpdate {
            correction_factor: factor(f0, f1),
            offset: Some(offset(o0, o1)),
            pulses_per_revolution: Some(u16::from_be_bytes([p0, p1])),
            wheel_circumference_m: Some(f32::from(u16::from_be_bytes([c0, c1])) / 1_000.0),
        }),
        _ => None,
    }
}

/// System status payload: state, healthy, then per wheel (kind, severity,
/// flags) and finally the active DTC count.
pub fn encode_system_status(
    health: SystemHealth,
    statuses: &WheelMap<MalfunctionStatus>,
    active_dtcs: usize,
) -> [u8; SYSTEM_STATUS_LEN] {
    let mut out = [0u8; SYSTEM_STATUS_LEN];
    let wheel_bytes = statuses.values().flat_map(|s| {
        let flags = u8::from(s.active) | u8::from(s.confirmed) << 1;
        [s.kind.code(), s.severity.code(), flags]
    });
    let bytes = [health.state.code(), u8::from(health.healthy)]
        .into_iter()
        .chain(wheel_bytes)
        .chain(core::iter::once(u8::try_from(active_dtcs).unwrap_or(u8::MAX)));
    for (slot, byte) in out.iter_mut().zip(bytes) {
        *slot = byte;
    }
    out
}

/// Occurrence count per wheel, saturated to u16.
pub fn encode_malfunction_counters(
    statuses: &WheelMap<MalfunctionStatus>,
) -> [u8; MALFUNCTION_COUNTER_LEN] {
    let mut out = [0u8; MALFUNCTION_COUNTER_LEN];
    let bytes = statuses.values().flat_map(|s| {
        u16::try_from(s.occurrence_count)
            .unwrap_or(u16::MAX)
            .to_be_bytes()
    });
    for (slot, byte) in out.iter_mut().zip(bytes) {
        *slot = byte;
    }
    out
}
