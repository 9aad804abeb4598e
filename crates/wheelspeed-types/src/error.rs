//! Error types for collaborator contracts.

use thiserror::Error;

use crate::{BlockId, WheelPosition};

/// A numeric wheel index outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid wheel index: {0}")]
pub struct InvalidWheelIndex(pub u8);

/// Errors reported by a [`SpeedDataProvider`](crate::SpeedDataProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No reading is available for the wheel.
    #[error("Speed data unavailable for {0}")]
    Unavailable(WheelPosition),

    /// The provider refused a calibration update.
    #[error("Calibration rejected for {wheel}: {reason}")]
    CalibrationRejected {
        /// Wheel the update targeted.
        wheel: WheelPosition,
        /// Provider-supplied reason.
        reason: String,
    },
}

impl ProviderError {
    /// Create a calibration rejected error.
    #[must_use]
    pub fn calibration_rejected(wheel: WheelPosition, reason: impl Into<String>) -> Self {
        Self::CalibrationRejected {
            wheel,
            reason: reason.into(),
        }
    }
}

/// Result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors reported by a [`CalibrationStore`](crate::CalibrationStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The block has never been written.
    #[error("Block {0:#06x} not found")]
    BlockNotFound(BlockId),

    /// Reading the block failed.
    #[error("Read of block {block:#06x} failed: {reason}")]
    ReadFailed {
        /// Block id.
        block: BlockId,
        /// Store-supplied reason.
        reason: String,
    },

    /// Writing the block failed.
    #[error("Write of block {block:#06x} failed: {reason}")]
    WriteFailed {
        /// Block id.
        block: BlockId,
        /// Store-supplied reason.
        reason: String,
    },
}

impl StoreError {
    /// Create a read failure.
    #[must_use]
    pub fn read_failed(block: BlockId, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            block,
            reason: reason.into(),
        }
    }

    /// Create a write failure.
    #[must_use]
    pub fn write_failed(block: BlockId, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            block,
            reason: reason.into(),
        }
    }
}

/// Result alias for store calls.
pub type StoreResult<T> = Result<T, StoreError>;
