//! In-memory stand-ins for the monitor's collaborators.

use std::collections::HashMap;

use wheelspeed_types::{
    BlockId, CalibrationStore, FaultReporter, ProviderError, ProviderResult, SensorCalibration,
    SpeedData, SpeedDataProvider, StoreError, StoreResult, WheelMap, WheelPosition,
};

/// Four wheel sensors held in memory.
///
/// Calibration writes are checked the way a sensor front-end would:
/// the factor must lie strictly inside `(0.5, 2.0)` and the geometry must
/// be positive.
#[derive(Debug, Clone)]
pub struct MockSensorBus {
    pub readings: WheelMap<SpeedData>,
    pub calibrations: WheelMap<SensorCalibration>,
    pub unavailable: WheelMap<bool>,
    pub reject_calibration_writes: bool,
    pub calibration_writes: usize,
}

impl MockSensorBus {
    /// All wheels valid at `speed_kmh` with factory calibration.
    pub fn cruising(speed_kmh: f32) -> Self {
        Self {
            readings: WheelMap::from_fn(|_| SpeedData::valid(speed_kmh)),
            calibrations: WheelMap::from_fn(|_| SensorCalibration::factory()),
            unavailable: WheelMap::default(),
            reject_calibration_writes: false,
            calibration_writes: 0,
        }
    }

    /// Set every wheel to a valid reading at `speed_kmh`.
    pub fn set_all_speeds(&mut self, speed_kmh: f32) {
        for (_, reading) in self.readings.iter_mut() {
            *reading = SpeedData::valid(speed_kmh);
        }
    }

    /// Replace one wheel's reading.
    pub fn set_reading(&mut self, wheel: WheelPosition, reading: SpeedData) {
        self.readings[wheel] = reading;
    }

    /// Replace one wheel's calibration without going through validation.
    pub fn force_calibration(&mut self, wheel: WheelPosition, calibration: SensorCalibration) {
        self.calibrations[wheel] = calibration;
    }
}

impl Default for MockSensorBus {
    fn default() -> Self {
        Self::cruising(60.0)
    }
}

impl SpeedDataProvider for MockSensorBus {
    fn speed_data(&self, wheel: WheelPosition) -> ProviderResult<SpeedData> {
        if self.unavailable[wheel] {
            return Err(ProviderError::Unavailable(wheel));
        }
        Ok(self.readings[wheel])
    }

    fn calibration(&self, wheel: WheelPosition) -> ProviderResult<SensorCalibration> {
        if self.unavailable[wheel] {
            return Err(ProviderError::Unavailable(wheel));
        }
        Ok(self.calibrations[wheel])
    }

    fn set_calibration(
        &mut self,
        wheel: WheelPosition,
        calibration: SensorCalibration,
    ) -> ProviderResult<()> {
        if self.reject_calibration_writes {
            return Err(ProviderError::calibration_rejected(wheel, "writes disabled"));
        }
        if calibration.correction_factor <= 0.5 || calibration.correction_factor >= 2.0 {
            return Err(ProviderError::calibration_rejected(
                wheel,
                "correction factor outside (0.5, 2.0)",
            ));
        }
        if calibration.pulses_per_revolution == 0 || calibration.wheel_circumference_m <= 0.0 {
            return Err(ProviderError::calibration_rejected(
                wheel,
                "wheel geometry must be positive",
            ));
        }
        self.calibrations[wheel] = calibration;
        self.calibration_writes += 1;
        Ok(())
    }
}

/// Block store backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub blocks: HashMap<BlockId, Vec<u8>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose reads and writes both fail.
    pub fn broken() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl CalibrationStore for MemoryStore {
    fn read_block(&self, block: BlockId) -> StoreResult<Vec<u8>> {
        if self.fail_reads {
            return Err(StoreError::read_failed(block, "injected read failure"));
        }
        self.blocks
            .get(&block)
            .cloned()
            .ok_or(StoreError::BlockNotFound(block))
    }

    fn write_block(&mut self, block: BlockId, data: &[u8]) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::write_failed(block, "injected write failure"));
        }
        self.blocks.insert(block, data.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// Fault sink that remembers every report in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingFaultReporter {
    pub reports: Vec<(u32, bool)>,
}

impl RecordingFaultReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `code` was ever reported active.
    pub fn raised(&self, code: u32) -> bool {
        self.reports.iter().any(|&(c, active)| c == code && active)
    }
}

impl FaultReporter for RecordingFaultReporter {
    fn report_fault(&mut self, code: u32, active: bool) {
        self.reports.push((code, active));
    }
}
