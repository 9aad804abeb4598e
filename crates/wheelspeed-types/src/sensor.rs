//! Sensor readings, calibration parameters and the vehicle snapshot.

use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::{WheelMap, WheelPosition};

/// One wheel's speed reading as delivered by the sensor layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedData {
    /// Calibrated wheel speed (km/h).
    pub speed_kmh: f32,
    /// Uncorrected wheel speed (km/h).
    pub raw_speed_kmh: f32,
    /// Longitudinal wheel acceleration (m/s²).
    pub acceleration_mps2: f32,
    /// Whether the reading can be trusted.
    pub valid: bool,
    /// Signal quality, 0 (worst) to 100 (best).
    pub quality: u8,
}

impl SpeedData {
    /// A valid reading with the given speed and zero acceleration.
    pub fn valid(speed_kmh: f32) -> Self {
        Self {
            speed_kmh,
            raw_speed_kmh: speed_kmh,
            acceleration_mps2: 0.0,
            valid: true,
            quality: 100,
        }
    }

    /// An invalid reading.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Set the acceleration.
    #[must_use]
    pub fn with_acceleration(mut self, acceleration_mps2: f32) -> Self {
        self.acceleration_mps2 = acceleration_mps2;
        self
    }
}

/// Per-wheel sensor calibration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorCalibration {
    /// Multiplicative correction applied to the raw speed.
    pub correction_factor: f32,
    /// Additive offset applied after correction (km/h).
    pub offset: f32,
    /// Encoder pulses per wheel revolution.
    pub pulses_per_revolution: u16,
    /// Rolling circumference (m).
    pub wheel_circumference_m: f32,
    /// Whether these parameters have been validated.
    pub valid: bool,
    /// Tick at which the parameters were last written (ms).
    pub timestamp_ms: u32,
}

impl SensorCalibration {
    /// Nominal pulses per revolution of a factory sensor.
    pub const FACTORY_PULSES_PER_REVOLUTION: u16 = 60;
    /// Nominal rolling circumference of a factory wheel (m).
    pub const FACTORY_CIRCUMFERENCE_M: f32 = 2.1;

    /// Factory defaults: unity factor, no offset, nominal geometry, valid.
    pub const fn factory() -> Self {
        Self {
            correction_factor: 1.0,
            offset: 0.0,
            pulses_per_revolution: Self::FACTORY_PULSES_PER_REVOLUTION,
            wheel_circumference_m: Self::FACTORY_CIRCUMFERENCE_M,
            valid: true,
            timestamp_ms: 0,
        }
    }

    /// Drift of the correction factor from unity, in percent.
    pub fn drift_percent(&self) -> f32 {
        (self.correction_factor - 1.0).abs() * 100.0
    }
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::factory()
    }
}

/// Snapshot of all wheel readings plus vehicle-level context for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    /// Per-wheel readings.
    pub wheels: WheelMap<SpeedData>,
    /// Vehicle reference speed (km/h).
    pub reference_speed_kmh: f32,
    /// Longitudinal vehicle acceleration (m/s²).
    pub longitudinal_acceleration_mps2: f32,
    /// Lateral vehicle acceleration (m/s²).
    pub lateral_acceleration_mps2: f32,
    /// Driver is braking.
    pub brake_pedal_pressed: bool,
    /// Stability control is intervening.
    pub stability_control_active: bool,
}

impl VehicleData {
    /// Snapshot with the given wheel readings and neutral vehicle context.
    pub fn from_wheels(wheels: WheelMap<SpeedData>) -> Self {
        Self {
            wheels,
            ..Self::default()
        }
    }

    /// Reading for one wheel.
    pub fn wheel(&self, wheel: WheelPosition) -> &SpeedData {
        self.wheels.get(wheel)
    }
}

/// Milliseconds of a tick, saturating at `u32::MAX`.
pub fn millis_u32(tick: Duration) -> u32 {
    u32::try_from(tick.as_millis()).unwrap_or(u32::MAX)
}
