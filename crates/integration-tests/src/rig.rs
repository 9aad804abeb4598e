//! Test rig: a subsystem plus wire-level helpers.

use anyhow::{Result, bail};
use tracing::info;
use wheelspeed_subsystem::{SubsystemConfig, WheelSpeedSubsystem};
use wheelspeed_test_helpers::prelude::{MemoryStore, MockSensorBus};

use crate::{MAX_RESPONSE_LEN, TestSubsystem};

/// Owns a subsystem and talks to it the way a tester would.
#[derive(Debug)]
pub struct Rig {
    pub subsystem: TestSubsystem,
    pub cycles: u32,
}

impl Rig {
    /// Default configuration, cruising bus, blank store.
    pub fn new() -> Result<Self> {
        Self::with(SubsystemConfig::default(), MockSensorBus::default(), MemoryStore::new())
    }

    pub fn with(config: SubsystemConfig, bus: MockSensorBus, store: MemoryStore) -> Result<Self> {
        Ok(Self {
            subsystem: WheelSpeedSubsystem::new(config, bus, store)?,
            cycles: 0,
        })
    }

    /// Power-cycle: rebuild the subsystem over the same store and bus.
    pub fn power_cycle(self) -> Result<Self> {
        let config = *self.subsystem.config();
        let bus = self.subsystem.provider().clone();
        let store = self.subsystem.store().clone();
        info!(cycles = self.cycles, "Power cycle");
        Self::with(config, bus, store)
    }

    pub fn run(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.subsystem.run_cycle(false);
            self.cycles = self.cycles.saturating_add(1);
        }
    }

    /// Send a frame and return the raw response.
    pub fn send(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        Ok(self
            .subsystem
            .handle_bytes(frame, MAX_RESPONSE_LEN)?
            .into_bytes())
    }

    /// Send a frame that must be answered positively.
    pub fn expect_positive(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        let response = self.send(frame)?;
        match (frame.first(), response.first()) {
            (Some(&sid), Some(&first)) if first == sid.wrapping_add(0x40) => Ok(response),
            _ => bail!("request {frame:02X?} answered with {response:02X?}"),
        }
    }

    /// Enter the extended diagnostic session.
    pub fn enter_extended(&mut self) -> Result<()> {
        self.expect_positive(&[0x10, 0x03]).map(drop)
    }
}

/// Render bytes as spaced upper-case hex.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Big-endian u16 at `offset`.
pub fn be_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    match bytes.get(offset..offset.saturating_add(2)) {
        Some(&[hi, lo]) => Ok(u16::from_be_bytes([hi, lo])),
        _ => bail!("no u16 at offset {offset} in {bytes:02X?}"),
    }
}
