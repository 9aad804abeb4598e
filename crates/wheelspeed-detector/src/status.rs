//! Per-wheel malfunction status and detection counters.

use core::time::Duration;
use serde::{Deserialize, Serialize};

use wheelspeed_types::{MalfunctionKind, Severity};

/// Malfunction status of one wheel.
///
/// `kind`, `severity` and `deviation` describe the most recent detection and
/// survive until an explicit clear; `active` and `confirmed` track whether
/// the condition is present right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MalfunctionStatus {
    /// Kind of the most recent detection.
    pub kind: MalfunctionKind,
    /// Severity of the most recent detection.
    pub severity: Severity,
    /// Condition detected in the latest cycle.
    pub active: bool,
    /// Condition has persisted for at least the debounce window.
    pub confirmed: bool,
    /// Magnitude that triggered the most recent detection.
    pub deviation: f32,
    /// Number of cycles in which a malfunction was detected since the last clear.
    pub occurrence_count: u32,
}

impl MalfunctionStatus {
    /// A status with no malfunction recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirmed with at least the given severity.
    pub fn is_confirmed_at_least(&self, severity: Severity) -> bool {
        self.confirmed && self.severity >= severity
    }
}

/// Internal counters behind a wheel's status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionCounters {
    /// Time the current condition has been continuously active.
    pub debounce_elapsed: Duration,
    /// Consecutive cycles with a detection, saturating at the configured cap.
    pub consecutive_errors: u8,
}

impl DetectionCounters {
    /// Record a detection, saturating at `cap`.
    pub fn record_error(&mut self, cap: u8) {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1).min(cap);
    }

    /// Reset the consecutive-error count.
    pub fn clear_consecutive(&mut self) {
        self.consecutive_errors = 0;
    }

    /// Reset everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
