//! Contracts for the collaborators that sit outside the monitor.
//!
//! The sensor layer, non-volatile storage and fault-code sink are owned by
//! the integrator. The monitor only ever talks to them through these traits,
//! and every call completes synchronously.

use crate::{ProviderResult, SensorCalibration, SpeedData, StoreResult, WheelPosition};

/// Identifier of a non-volatile storage block.
pub type BlockId = u16;

/// Source of per-wheel speed readings and the owner of live calibration.
pub trait SpeedDataProvider {
    /// Latest reading for a wheel.
    ///
    /// # Errors
    ///
    /// Returns an error if no reading is available.
    fn speed_data(&self, wheel: WheelPosition) -> ProviderResult<SpeedData>;

    /// Calibration currently applied to a wheel.
    ///
    /// # Errors
    ///
    /// Returns an error if the calibration cannot be read.
    fn calibration(&self, wheel: WheelPosition) -> ProviderResult<SensorCalibration>;

    /// Replace the calibration applied to a wheel.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the parameters.
    fn set_calibration(
        &mut self,
        wheel: WheelPosition,
        calibration: SensorCalibration,
    ) -> ProviderResult<()>;
}

/// Block-addressed non-volatile storage.
pub trait CalibrationStore {
    /// Read the blob stored in a block.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is missing or unreadable.
    fn read_block(&self, block: BlockId) -> StoreResult<Vec<u8>>;

    /// Write a blob into a block.
    ///
    /// # Errors
    ///
    /// Returns an error if the write does not complete.
    fn write_block(&mut self, block: BlockId, data: &[u8]) -> StoreResult<()>;
}

/// Sink for numeric fault codes.
pub trait FaultReporter {
    /// Report a fault code as active (test failed) or inactive (test passed).
    fn report_fault(&mut self, code: u32, active: bool);
}

impl<T: SpeedDataProvider + ?Sized> SpeedDataProvider for &mut T {
    fn speed_data(&self, wheel: WheelPosition) -> ProviderResult<SpeedData> {
        (**self).speed_data(wheel)
    }

    fn calibration(&self, wheel: WheelPosition) -> ProviderResult<SensorCalibration> {
        (**self).calibration(wheel)
    }

    fn set_calibration(
        &mut self,
        wheel: WheelPosition,
        calibration: SensorCalibration,
    ) -> ProviderResult<()> {
        (**self).set_calibration(wheel, calibration)
    }
}

impl<T: CalibrationStore + ?Sized> CalibrationStore for &mut T {
    fn read_block(&self, block: BlockId) -> StoreResult<Vec<u8>> {
        (**self).read_block(block)
    }

    fn write_block(&mut self, block: BlockId, data: &[u8]) -> StoreResult<()> {
        (**self).write_block(block, data)
    }
}
