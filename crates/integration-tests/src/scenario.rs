//! Scripted fault-injection scenarios.
//!
//! A [`Scenario`] is a cruise of fixed length with faults switched on at
//! given cycles. Scenarios deserialize from JSON so new timelines can be
//! added as data.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;
use wheelspeed_types::{SensorCalibration, SpeedData, SystemState, WheelMap, WheelPosition};

use crate::Rig;

/// What gets injected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Injection {
    /// Force the live correction factor.
    CorrectionFactor(f32),
    /// Replace the wheel's reading with a valid one at this speed.
    Speed(f32),
    /// Make the wheel's reading invalid.
    InvalidReading,
    /// Make the wheel unavailable at the provider.
    Dropout,
}

/// One injection on one wheel, applied just before `at_cycle` runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultInjection {
    pub wheel: WheelPosition,
    pub at_cycle: u32,
    pub injection: Injection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub cycles: u32,
    #[serde(default = "default_cruise")]
    pub cruise_kmh: f32,
    #[serde(default)]
    pub injections: Vec<FaultInjection>,
}

fn default_cruise() -> f32 {
    60.0
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub cycles_run: u32,
    pub final_state: SystemState,
    /// Cycle (1-based) at which each wheel was first seen confirmed.
    pub first_confirmed: WheelMap<Option<u32>>,
    /// `(code, status byte)` of every stored DTC, oldest first.
    pub dtcs: Vec<(u32, u8)>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Run on a fresh rig.
    pub fn run(&self) -> Result<ScenarioReport> {
        let mut rig = Rig::new()?;
        rig.subsystem.provider_mut().set_all_speeds(self.cruise_kmh);
        self.run_on(&mut rig)
    }

    pub fn run_on(&self, rig: &mut Rig) -> Result<ScenarioReport> {
        info!(name = %self.name, cycles = self.cycles, "Running scenario");
        let mut first_confirmed = WheelMap::<Option<u32>>::default();
        let mut final_state = SystemState::Inactive;

        for cycle in 1..=self.cycles {
            for fault in self.injections.iter().filter(|f| f.at_cycle == cycle) {
                inject(rig, fault);
            }
            final_state = rig.subsystem.run_cycle(false);
            rig.cycles = rig.cycles.saturating_add(1);

            for (wheel, first) in first_confirmed.iter_mut() {
                if first.is_none() && rig.subsystem.detector().status(wheel).confirmed {
                    *first = Some(cycle);
                }
            }
        }

        let dtcs = rig
            .subsystem
            .diagnostics()
            .registry()
            .records()
            .iter()
            .map(|r| (r.code, r.status.to_byte()))
            .collect();

        Ok(ScenarioReport {
            name: self.name.clone(),
            cycles_run: self.cycles,
            final_state,
            first_confirmed,
            dtcs,
        })
    }
}

fn inject(rig: &mut Rig, fault: &FaultInjection) {
    info!(wheel = %fault.wheel, at = fault.at_cycle, injection = ?fault.injection, "Injecting fault");
    let bus = rig.subsystem.provider_mut();
    match fault.injection {
        Injection::CorrectionFactor(factor) => bus.force_calibration(
            fault.wheel,
            SensorCalibration {
                correction_factor: factor,
                ..SensorCalibration::factory()
            },
        ),
        Injection::Speed(kmh) => bus.set_reading(fault.wheel, SpeedData::valid(kmh)),
        Injection::InvalidReading => bus.set_reading(fault.wheel, SpeedData::invalid()),
        Injection::Dropout => bus.unavailable[fault.wheel] = true,
    }
}
