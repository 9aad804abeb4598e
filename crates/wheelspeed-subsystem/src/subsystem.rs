//! The subsystem context.

use core::time::Duration;
use wheelspeed_calibration::{
    CalibrationContext, CalibrationManager, CalibrationRequest, LoadOutcome,
};
use wheelspeed_detector::{MalfunctionDetector, SystemHealth, median_valid_speed};
use wheelspeed_types::{
    CalibrationStore, SensorCalibration, SpeedData, SpeedDataProvider, SystemState, VehicleData,
    WheelMap, WheelPosition,
};
use wheelspeed_uds::{DiagnosticContext, DiagnosticRequest, DiagnosticResponse, DiagnosticServer};

use crate::{SubsystemConfig, SubsystemResult};

/// Detector, calibration manager and diagnostic server driven by one tick.
///
/// The subsystem owns its collaborators. Each call to
/// [`run_cycle`](Self::run_cycle) advances the monotonic clock by the
/// configured cycle period and then runs, in order:
///
/// 1. the vehicle snapshot from the provider,
/// 2. the malfunction detector,
/// 3. the calibration sessions and the automatic calibration sweep,
/// 4. the DTC monitor and the diagnostic session timeout.
///
/// Diagnostic requests are answered between cycles with
/// [`process_request`](Self::process_request) and see the state left by the
/// last cycle.
#[derive(Debug)]
pub struct WheelSpeedSubsystem<P, S> {
    config: SubsystemConfig,
    detector: MalfunctionDetector,
    calibration: CalibrationManager,
    diagnostics: DiagnosticServer,
    provider: P,
    store: S,
    now: Duration,
    load_outcomes: WheelMap<LoadOutcome>,
}

impl<P, S> WheelSpeedSubsystem<P, S>
where
    P: SpeedDataProvider,
    S: CalibrationStore,
{
    /// Build the subsystem and load every wheel's calibration from the store.
    ///
    /// Load faults are recorded in the DTC registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the provider
    /// rejects a loaded calibration.
    pub fn new(config: SubsystemConfig, mut provider: P, mut store: S) -> SubsystemResult<Self> {
        config.validate()?;
        let detector = MalfunctionDetector::with_parameters(config.detection)?;
        let mut calibration = CalibrationManager::new(config.calibration)?;
        let mut diagnostics = DiagnosticServer::new(config.diagnostics)?;

        let load_outcomes = calibration.init(&mut CalibrationContext {
            provider: &mut provider,
            store: &mut store,
            faults: diagnostics.registry_mut(),
            now: Duration::ZERO,
        })?;

        tracing::info!(
            cycle_ms = config.cycle_period_ms,
            restored = load_outcomes
                .values()
                .filter(|o| matches!(o, LoadOutcome::Restored(_)))
                .count(),
            "Wheel-speed subsystem initialized"
        );

        Ok(Self {
            config,
            detector,
            calibration,
            diagnostics,
            provider,
            store,
            now: Duration::ZERO,
            load_outcomes,
        })
    }

    /// Run one cycle and return the aggregated system state.
    pub fn run_cycle(&mut self, brake_pedal_pressed: bool) -> SystemState {
        let period = self.config.cycle_period();
        self.now = self.now.saturating_add(period);

        let wheels = WheelMap::from_fn(|wheel| match self.provider.speed_data(wheel) {
            Ok(reading) => reading,
            Err(e) => {
                tracing::debug!(wheel = %wheel, error = %e, "No speed reading this cycle");
                SpeedData::invalid()
            }
        });
        let vehicle = VehicleData {
            reference_speed_kmh: median_valid_speed(&wheels),
            brake_pedal_pressed,
            ..VehicleData::from_wheels(wheels)
        };
        self.detector.update_vehicle_data(vehicle);
        let state = self.detector.run_cycle(period, &self.provider);

        let registry = self.diagnostics.registry_mut();
        registry.set_time(self.now);
        self.calibration.process(&self.provider, registry, self.now);
        let scheduled = self.calibration.auto_calibration_check(&self.provider, self.now);
        if scheduled > 0 {
            tracing::debug!(scheduled, "Automatic calibration sweep");
        }

        self.diagnostics.run_cycle(&self.detector, self.now);
        state
    }

    /// Answer one diagnostic request.
    ///
    /// A positive ECU reset reloads every calibration from the store and
    /// clears the detector once the response has been built.
    pub fn process_request(&mut self, request: &DiagnosticRequest) -> DiagnosticResponse {
        let mut ctx = DiagnosticContext {
            detector: &mut self.detector,
            calibration: &mut self.calibration,
            provider: &mut self.provider,
            store: &mut self.store,
            now: self.now,
        };
        let response = self.diagnostics.process(request, &mut ctx);
        if self.diagnostics.take_pending_reset() {
            self.restart();
        }
        response
    }

    /// Parse a raw frame and answer it.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosticError::EmptyRequest`](wheelspeed_uds::DiagnosticError::EmptyRequest)
    /// for an empty frame. Every non-empty frame gets a response.
    pub fn handle_bytes(
        &mut self,
        frame: &[u8],
        max_response_len: usize,
    ) -> SubsystemResult<DiagnosticResponse> {
        let request = DiagnosticRequest::from_bytes(frame, max_response_len)?;
        Ok(self.process_request(&request))
    }

    /// Start a calibration session directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is malformed or the wheel is busy.
    pub fn start_calibration(&mut self, request: CalibrationRequest) -> SubsystemResult<()> {
        Ok(self.calibration.start(request, self.now)?)
    }

    /// Write a completed session's result into the sensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has no usable result, the sensor
    /// rejects it, or persisting fails.
    pub fn apply_calibration(
        &mut self,
        wheel: WheelPosition,
        persist: bool,
    ) -> SubsystemResult<SensorCalibration> {
        let mut ctx = CalibrationContext {
            provider: &mut self.provider,
            store: &mut self.store,
            faults: self.diagnostics.registry_mut(),
            now: self.now,
        };
        Ok(self.calibration.apply(wheel, persist, &mut ctx)?)
    }

    /// Health snapshot from the last cycle.
    pub fn health(&self) -> SystemHealth {
        self.detector.check_system_health()
    }

    /// The malfunction detector.
    pub fn detector(&self) -> &MalfunctionDetector {
        &self.detector
    }

    /// The calibration manager.
    pub fn calibration(&self) -> &CalibrationManager {
        &self.calibration
    }

    /// The diagnostic server.
    pub fn diagnostics(&self) -> &DiagnosticServer {
        &self.diagnostics
    }

    /// The speed data provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Mutable access to the provider, for feeding readings in tests and
    /// simulations.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// The calibration store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Time since start.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Active configuration.
    pub fn config(&self) -> &SubsystemConfig {
        &self.config
    }

    /// How each wheel's calibration was obtained at the last (re)start.
    pub fn load_outcomes(&self) -> &WheelMap<LoadOutcome> {
        &self.load_outcomes
    }

    fn restart(&mut self) {
        for wheel in WheelPosition::ALL {
            if self.calibration.session(wheel).is_active()
                && let Err(e) = self.calibration.cancel(wheel, self.now)
            {
                tracing::warn!(wheel = %wheel, error = %e, "Could not cancel calibration on reset");
            }
        }

        let reloaded = self.calibration.init(&mut CalibrationContext {
            provider: &mut self.provider,
            store: &mut self.store,
            faults: self.diagnostics.registry_mut(),
            now: self.now,
        });
        match reloaded {
            Ok(outcomes) => self.load_outcomes = outcomes,
            Err(e) => tracing::error!(error = %e, "Calibration reload after reset failed"),
        }

        self.detector.clear_all();
        tracing::info!(now_ms = self.now.as_millis(), "Subsystem restarted by ECU reset");
    }
}
