//! Diagnostic trouble code registry.
//!
//! A fixed-capacity table of DTC slots. Slots are created on the first
//! active report of a code and are never removed: clearing resets the status
//! bits and keeps the slot with its metadata.
//!
//! # Status byte
//!
//! | bit | flag                              |
//! |-----|-----------------------------------|
//! | 0   | test failed                       |
//! | 1   | test failed this operation cycle  |
//! | 2   | pending                           |
//! | 3   | confirmed                         |
//! | 4   | test not completed since clear    |
//! | 5   | test failed since clear           |
//! | 6   | test not completed this cycle     |
//! | 7   | warning indicator requested       |

use core::time::Duration;
use serde::{Deserialize, Serialize};
use wheelspeed_types::{FaultReporter, MalfunctionKind, Severity, WheelPosition, millis_u32};

/// Maximum number of DTC slots.
pub const DTC_CAPACITY: usize = 32;

/// Reports since the last clear after which a DTC is confirmed.
pub const CONFIRMATION_THRESHOLD: u16 = 3;

/// DTC status as named flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DtcStatus {
    /// Bit 0.
    pub test_failed: bool,
    /// Bit 1.
    pub test_failed_this_cycle: bool,
    /// Bit 2.
    pub pending: bool,
    /// Bit 3.
    pub confirmed: bool,
    /// Bit 4.
    pub not_completed_since_clear: bool,
    /// Bit 5.
    pub failed_since_clear: bool,
    /// Bit 6.
    pub not_completed_this_cycle: bool,
    /// Bit 7.
    pub warning_indicator: bool,
}

impl DtcStatus {
    /// Status right after a clear.
    pub const fn cleared() -> Self {
        Self {
            test_failed: false,
            test_failed_this_cycle: false,
            pending: false,
            confirmed: false,
            not_completed_since_clear: true,
            failed_since_clear: false,
            not_completed_this_cycle: false,
            warning_indicator: false,
        }
    }

    /// Encode as the wire status byte.
    pub const fn to_byte(self) -> u8 {
        (self.test_failed as u8)
            | (self.test_failed_this_cycle as u8) << 1
            | (self.pending as u8) << 2
            | (self.confirmed as u8) << 3
            | (self.not_completed_since_clear as u8) << 4
            | (self.failed_since_clear as u8) << 5
            | (self.not_completed_this_cycle as u8) << 6
            | (self.warning_indicator as u8) << 7
    }

    /// Decode a wire status byte.
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            test_failed: byte & 0x01 != 0,
            test_failed_this_cycle: byte & 0x02 != 0,
            pending: byte & 0x04 != 0,
            confirmed: byte & 0x08 != 0,
            not_completed_since_clear: byte & 0x10 != 0,
            failed_since_clear: byte & 0x20 != 0,
            not_completed_this_cycle: byte & 0x40 != 0,
            warning_indicator: byte & 0x80 != 0,
        }
    }

    /// Whether any bit of `mask` is set.
    pub const fn matches(self, mask: u8) -> bool {
        self.to_byte() & mask != 0
    }

    fn assert_failed(&mut self) {
        self.test_failed = true;
        self.test_failed_this_cycle = true;
        self.pending = true;
        self.not_completed_since_clear = false;
    }
}

/// Context attached to the report that created or last touched a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultContext {
    /// Wheel the fault was attributed to.
    pub wheel: Option<WheelPosition>,
    /// Malfunction behind the fault.
    pub kind: MalfunctionKind,
    /// Severity at the time of the report.
    pub severity: Severity,
}

/// One DTC slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtcRecord {
    /// 24-bit DTC number.
    pub code: u32,
    /// Status flags.
    pub status: DtcStatus,
    /// Context of the most recent report.
    pub context: FaultContext,
    /// Active reports over the slot's lifetime. Survives clears.
    pub occurrence_count: u16,
    /// Active reports since the last clear. Drives confirmation.
    pub reports_since_clear: u16,
    /// Tick of the first active report (ms).
    pub first_seen_ms: u32,
    /// Tick of the latest active report (ms).
    pub last_seen_ms: u32,
}

impl DtcRecord {
    /// Low three bytes of the code, big-endian.
    pub fn code_bytes(&self) -> [u8; 3] {
        let [_, high, mid, low] = self.code.to_be_bytes();
        [high, mid, low]
    }
}

/// Fixed-capacity DTC table.
///
/// Implements [`FaultReporter`] so the detector monitor and the calibration
/// manager report into it directly. Timestamps come from the tick set with
/// [`set_time`](Self::set_time).
#[derive(Debug, Clone, Default)]
pub struct DtcRegistry {
    records: heapless::Vec<DtcRecord, DTC_CAPACITY>,
    now: Duration,
    dropped: u32,
}

impl DtcRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick used to stamp reports.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Report a fault with context.
    ///
    /// An active report creates the slot if needed, re-asserts the failed
    /// bits and counts the occurrence. An inactive report clears
    /// `test_failed` on an existing slot; unknown codes are ignored.
    pub fn report(&mut self, code: u32, active: bool, context: FaultContext) {
        let now_ms = millis_u32(self.now);
        tracing::debug!(dtc = format_args!("{code:06X}"), active, "DTC report");

        if let Some(record) = self.records.iter_mut().find(|r| r.code == code) {
            if !active {
                record.status.test_failed = false;
                return;
            }
            record.status.assert_failed();
            record.occurrence_count = record.occurrence_count.saturating_add(1);
            record.reports_since_clear = record.reports_since_clear.saturating_add(1);
            record.last_seen_ms = now_ms;
            record.context = context;
            if record.reports_since_clear >= CONFIRMATION_THRESHOLD && !record.status.confirmed {
                record.status.confirmed = true;
                tracing::warn!(dtc = format_args!("{code:06X}"), "DTC confirmed");
            }
            return;
        }

        if !active {
            return;
        }

        let mut status = DtcStatus::default();
        status.assert_failed();
        let record = DtcRecord {
            code,
            status,
            context,
            occurrence_count: 1,
            reports_since_clear: 1,
            first_seen_ms: now_ms,
            last_seen_ms: now_ms,
        };
        if self.records.push(record).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            tracing::warn!(
                dtc = format_args!("{code:06X}"),
                capacity = DTC_CAPACITY,
                "DTC registry full, report dropped"
            );
        } else {
            tracing::info!(dtc = format_args!("{code:06X}"), wheel = ?context.wheel, "DTC stored");
        }
    }

    /// Clear one code. Returns `false` if the code has no slot.
    pub fn clear(&mut self, code: u32) -> bool {
        match self.records.iter_mut().find(|r| r.code == code) {
            Some(record) => {
                clear_record(record);
                tracing::info!(dtc = format_args!("{code:06X}"), "DTC cleared");
                true
            }
            None => false,
        }
    }

    /// Clear every slot.
    pub fn clear_all(&mut self) {
        self.records.iter_mut().for_each(clear_record);
        tracing::info!(slots = self.records.len(), "All DTCs cleared");
    }

    /// Slot for a code.
    pub fn get(&self, code: u32) -> Option<&DtcRecord> {
        self.records.iter().find(|r| r.code == code)
    }

    /// All slots, oldest first.
    pub fn records(&self) -> &[DtcRecord] {
        &self.records
    }

    /// Slots whose status intersects `mask`.
    pub fn matching(&self, mask: u8) -> impl Iterator<Item = &DtcRecord> {
        self.records.iter().filter(move |r| r.status.matches(mask))
    }

    /// Number of slots with `test_failed` set.
    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.test_failed).count()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no DTC has ever been stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// New codes dropped because the registry was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

fn clear_record(record: &mut DtcRecord) {
    record.status = DtcStatus::cleared();
    record.reports_since_clear = 0;
}

impl FaultReporter for DtcRegistry {
    fn report_fault(&mut self, code: u32, active: bool) {
        self.report(code, active, FaultContext::default());
    }
}
