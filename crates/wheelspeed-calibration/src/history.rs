//! Bounded per-wheel calibration history.

use heapless::Deque;
use serde::{Deserialize, Serialize};

use crate::{CalibrationMethod, SessionResult};

/// Entries kept per wheel.
pub const HISTORY_CAPACITY: usize = 10;

/// One recorded calibration change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationHistoryEntry {
    /// Tick of the change (ms).
    pub timestamp_ms: u32,
    /// How the calibration was obtained.
    pub method: CalibrationMethod,
    /// Outcome.
    pub result: SessionResult,
    /// Factor before the change.
    pub old_correction_factor: f32,
    /// Factor after the change.
    pub new_correction_factor: f32,
    /// Accuracy reported with the change (%).
    pub accuracy_percent: f32,
}

/// Oldest-first ring of history entries. The oldest entry is dropped on overflow.
#[derive(Debug, Clone, Default)]
pub struct CalibrationHistory {
    entries: Deque<CalibrationHistoryEntry, HISTORY_CAPACITY>,
}

impl CalibrationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest one when full.
    pub fn record(&mut self, entry: CalibrationHistoryEntry) {
        let mut pending = entry;
        while let Err(rejected) = self.entries.push_back(pending) {
            if self.entries.pop_front().is_none() {
                break;
            }
            pending = rejected;
        }
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &CalibrationHistoryEntry> {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&CalibrationHistoryEntry> {
        self.entries.back()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
