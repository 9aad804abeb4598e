//! Calibration manager.

use core::time::Duration;
use serde::{Deserialize, Serialize};
use wheelspeed_types::{
    CalibrationStore, FaultReporter, SensorCalibration, SpeedDataProvider, StoreError, WheelMap,
    WheelPosition, millis_u32,
};

use crate::fault_codes::{CALIBRATION_FAILED, CALIBRATION_OUT_OF_RANGE, NVM_ERROR};
use crate::{
    CalibrationConfig, CalibrationError, CalibrationEstimate, CalibrationHistory,
    CalibrationHistoryEntry, CalibrationMethod, CalibrationRequest, CalibrationResult,
    CalibrationSample, CalibrationSession, CalibrationState, CalibrationValidation,
    MAX_SAMPLE_CAPACITY, SessionResult, block_id, decode_calibration, encode_calibration,
};

/// Accuracy below which the automatic sweep schedules a new session (%).
const AUTO_CALIBRATION_MIN_ACCURACY: f32 = 90.0;

type SampleBuffer = heapless::Vec<CalibrationSample, MAX_SAMPLE_CAPACITY>;

/// Collaborators borrowed for one manager call.
pub struct CalibrationContext<'a> {
    /// Sensor layer holding the live calibration.
    pub provider: &'a mut dyn SpeedDataProvider,
    /// Non-volatile storage.
    pub store: &'a mut dyn CalibrationStore,
    /// Fault code sink.
    pub faults: &'a mut dyn FaultReporter,
    /// Current monotonic tick.
    pub now: Duration,
}

impl core::fmt::Debug for CalibrationContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CalibrationContext")
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// Why a wheel fell back to factory calibration on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    /// The store has no block for the wheel.
    Blank,
    /// The block could not be read or decoded.
    Unreadable,
    /// The stored calibration failed validation.
    Invalid,
}

/// Result of loading one wheel's calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LoadOutcome {
    /// The stored calibration was applied.
    Restored(SensorCalibration),
    /// Factory defaults were applied.
    FactoryDefaults {
        /// Why the stored value was not used.
        reason: FallbackReason,
        /// Whether the defaults were written back to the store.
        persisted: bool,
    },
}

/// Calibration parameters written by a technician.
///
/// Fields left `None` keep the sensor's current value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationUpdate {
    /// New correction factor.
    pub correction_factor: f32,
    /// New offset.
    pub offset: Option<f32>,
    /// New pulses per revolution.
    pub pulses_per_revolution: Option<u16>,
    /// New wheel circumference (m).
    pub wheel_circumference_m: Option<f32>,
}

impl CalibrationUpdate {
    /// Update only the correction factor.
    pub const fn factor(correction_factor: f32) -> Self {
        Self {
            correction_factor,
            offset: None,
            pulses_per_revolution: None,
            wheel_circumference_m: None,
        }
    }
}

/// Owns every wheel's calibration session, samples and history.
#[derive(Debug, Clone)]
pub struct CalibrationManager {
    config: CalibrationConfig,
    sessions: WheelMap<CalibrationSession>,
    samples: WheelMap<SampleBuffer>,
    history: WheelMap<CalibrationHistory>,
    last_auto_check: Duration,
}

impl Default for CalibrationManager {
    fn default() -> Self {
        Self::with_valid_config(CalibrationConfig::default())
    }
}

impl CalibrationManager {
    /// Create a manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: CalibrationConfig) -> CalibrationResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: CalibrationConfig) -> Self {
        Self {
            config,
            sessions: WheelMap::from_fn(CalibrationSession::idle),
            samples: WheelMap::default(),
            history: WheelMap::default(),
            last_auto_check: Duration::ZERO,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid. The current
    /// configuration is kept in that case.
    pub fn set_config(&mut self, config: CalibrationConfig) -> CalibrationResult<()> {
        config.validate()?;
        self.config = config;
        tracing::debug!(?config, "Calibration configuration updated");
        Ok(())
    }

    /// Load every wheel's calibration from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor layer rejects a calibration.
    pub fn init(
        &mut self,
        ctx: &mut CalibrationContext<'_>,
    ) -> CalibrationResult<WheelMap<LoadOutcome>> {
        let front_left = self.load(WheelPosition::FrontLeft, ctx)?;
        let front_right = self.load(WheelPosition::FrontRight, ctx)?;
        let rear_left = self.load(WheelPosition::RearLeft, ctx)?;
        let rear_right = self.load(WheelPosition::RearRight, ctx)?;
        Ok(WheelMap::new(front_left, front_right, rear_left, rear_right))
    }

    /// Start a calibration session.
    ///
    /// A running session is only replaced when the request is forced.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::InvalidParameter`] for a malformed
    /// request and [`CalibrationError::InProgress`] when the wheel already
    /// has an active session.
    pub fn start(&mut self, request: CalibrationRequest, now: Duration) -> CalibrationResult<()> {
        request.validate()?;
        let wheel = request.wheel;

        if self.sessions[wheel].is_active() {
            if !request.force {
                return Err(CalibrationError::InProgress(wheel));
            }
            self.cancel(wheel, now)?;
            tracing::info!(wheel = %wheel, "Running calibration pre-empted by forced request");
        }

        self.samples[wheel].clear();
        self.sessions[wheel] = CalibrationSession::requested(request, now);
        tracing::debug!(
            wheel = %wheel,
            method = ?request.method,
            reference_kmh = request.reference_speed_kmh,
            "Calibration requested"
        );
        Ok(())
    }

    /// Cancel the wheel's active session.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::NotActive`] if no session is running.
    pub fn cancel(&mut self, wheel: WheelPosition, now: Duration) -> CalibrationResult<()> {
        let session = &mut self.sessions[wheel];
        if !session.is_active() {
            return Err(CalibrationError::NotActive(wheel));
        }
        session.finish(CalibrationState::Cancelled, SessionResult::NotOk);
        session.ended_at = Some(now);
        tracing::debug!(wheel = %wheel, "Calibration cancelled");
        Ok(())
    }

    /// Session record for a wheel.
    pub fn session(&self, wheel: WheelPosition) -> &CalibrationSession {
        &self.sessions[wheel]
    }

    /// Session records for all wheels.
    pub fn sessions(&self) -> &WheelMap<CalibrationSession> {
        &self.sessions
    }

    /// Samples collected by the wheel's current session.
    pub fn samples(&self, wheel: WheelPosition) -> &[CalibrationSample] {
        &self.samples[wheel]
    }

    /// Whether any wheel has an active session.
    pub fn any_active(&self) -> bool {
        self.sessions.values().any(CalibrationSession::is_active)
    }

    /// Advance every wheel's session by one tick.
    pub fn process(
        &mut self,
        provider: &dyn SpeedDataProvider,
        faults: &mut dyn FaultReporter,
        now: Duration,
    ) {
        for wheel in WheelPosition::ALL {
            advance_session(
                &self.config,
                &mut self.sessions[wheel],
                &mut self.samples[wheel],
                provider,
                faults,
                now,
            );
        }
    }

    /// Write a completed session's estimate into the sensor.
    ///
    /// The history entry is recorded even when persisting fails.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::NotApplicable`] unless the session
    /// completed with an `Ok` result, a provider error if the sensor
    /// rejects the values, or a store error if persisting fails.
    pub fn apply(
        &mut self,
        wheel: WheelPosition,
        persist: bool,
        ctx: &mut CalibrationContext<'_>,
    ) -> CalibrationResult<SensorCalibration> {
        let session = self.sessions[wheel];
        if !session.is_applicable() {
            return Err(CalibrationError::NotApplicable {
                wheel,
                state: session.state,
                result: session.result,
            });
        }

        let current = ctx.provider.calibration(wheel)?;
        let updated = SensorCalibration {
            correction_factor: session.correction_factor,
            offset: session.offset,
            valid: true,
            timestamp_ms: millis_u32(session.ended_at.unwrap_or(ctx.now)),
            ..current
        };
        self.set_sensor_calibration(wheel, updated, ctx)?;

        let persisted = if persist { self.save(wheel, ctx) } else { Ok(()) };
        self.history[wheel].record(CalibrationHistoryEntry {
            timestamp_ms: updated.timestamp_ms,
            method: session.request.method,
            result: outcome_of(&persisted),
            old_correction_factor: current.correction_factor,
            new_correction_factor: updated.correction_factor,
            accuracy_percent: session.accuracy_percent,
        });

        tracing::info!(
            wheel = %wheel,
            old_factor = current.correction_factor,
            new_factor = updated.correction_factor,
            persisted = persist && persisted.is_ok(),
            "Calibration applied"
        );
        persisted.map(|()| updated)
    }

    /// Check the wheel's live calibration against the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the calibration cannot be read.
    pub fn validate_calibration(
        &self,
        wheel: WheelPosition,
        provider: &dyn SpeedDataProvider,
    ) -> CalibrationResult<CalibrationValidation> {
        let cal = provider.calibration(wheel)?;
        Ok(CalibrationValidation {
            valid: self.is_acceptable(&cal),
            accuracy_percent: ((1.0 - (cal.correction_factor - 1.0).abs()) * 100.0).max(0.0),
        })
    }

    /// Restore factory calibration for a wheel and persist it.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the sensor rejects the defaults, or a
    /// store error if persisting fails. The defaults stay applied in the
    /// second case.
    pub fn reset_to_factory(
        &mut self,
        wheel: WheelPosition,
        ctx: &mut CalibrationContext<'_>,
    ) -> CalibrationResult<()> {
        let old_factor = ctx
            .provider
            .calibration(wheel)
            .map_or(1.0, |c| c.correction_factor);
        let factory = SensorCalibration {
            timestamp_ms: millis_u32(ctx.now),
            ..SensorCalibration::factory()
        };
        self.set_sensor_calibration(wheel, factory, ctx)?;

        let persisted = self.save(wheel, ctx);
        self.history[wheel].record(CalibrationHistoryEntry {
            timestamp_ms: factory.timestamp_ms,
            method: CalibrationMethod::FactoryReset,
            result: outcome_of(&persisted),
            old_correction_factor: old_factor,
            new_correction_factor: factory.correction_factor,
            accuracy_percent: 100.0,
        });
        tracing::info!(wheel = %wheel, old_factor, "Calibration reset to factory defaults");
        persisted
    }

    /// Load a wheel's calibration, falling back to factory defaults.
    ///
    /// A blank store is not a fault. An unreadable block raises the NVM
    /// fault code. A fallback that cannot be written back is reported
    /// through [`LoadOutcome::FactoryDefaults`] rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the sensor rejects the calibration.
    pub fn load(
        &mut self,
        wheel: WheelPosition,
        ctx: &mut CalibrationContext<'_>,
    ) -> CalibrationResult<LoadOutcome> {
        let stored = match ctx.store.read_block(block_id(wheel)) {
            Ok(bytes) => decode_calibration(wheel, &bytes).map_err(|e| {
                tracing::warn!(wheel = %wheel, error = %e, "Stored calibration is corrupt");
                FallbackReason::Unreadable
            }),
            Err(StoreError::BlockNotFound(_)) => Err(FallbackReason::Blank),
            Err(e) => {
                tracing::warn!(wheel = %wheel, error = %e, "Calibration read failed");
                Err(FallbackReason::Unreadable)
            }
        };

        let reason = match stored {
            Ok(cal) if self.is_acceptable(&cal) => {
                self.set_sensor_calibration(wheel, cal, ctx)?;
                tracing::debug!(wheel = %wheel, factor = cal.correction_factor, "Calibration restored");
                return Ok(LoadOutcome::Restored(cal));
            }
            Ok(cal) => {
                tracing::warn!(
                    wheel = %wheel,
                    factor = cal.correction_factor,
                    valid = cal.valid,
                    "Stored calibration rejected"
                );
                FallbackReason::Invalid
            }
            Err(reason) => reason,
        };

        if reason == FallbackReason::Unreadable {
            ctx.faults.report_fault(NVM_ERROR, true);
        }

        let persisted = match self.reset_to_factory(wheel, ctx) {
            Ok(()) => true,
            Err(CalibrationError::Store(_) | CalibrationError::Encoding { .. }) => false,
            Err(e) => return Err(e),
        };
        Ok(LoadOutcome::FactoryDefaults { reason, persisted })
    }

    /// Persist the wheel's live calibration.
    ///
    /// # Errors
    ///
    /// Returns a provider, encoding or store error. Encoding and store
    /// failures raise the NVM fault code.
    pub fn save(
        &mut self,
        wheel: WheelPosition,
        ctx: &mut CalibrationContext<'_>,
    ) -> CalibrationResult<()> {
        let cal = ctx.provider.calibration(wheel)?;
        let written = encode_calibration(wheel, &cal).and_then(|blob| {
            ctx.store
                .write_block(block_id(wheel), &blob)
                .map_err(CalibrationError::from)
        });
        if let Err(e) = written {
            tracing::warn!(wheel = %wheel, error = %e, "Calibration save failed");
            ctx.faults.report_fault(NVM_ERROR, true);
            return Err(e);
        }
        Ok(())
    }

    /// Write technician-supplied calibration values.
    ///
    /// Persisting is best effort: a store failure raises the NVM fault
    /// code but the new values stay applied and the call succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::OutOfRange`] (raising the out-of-range
    /// fault code) if the factor is outside the configured bounds,
    /// [`CalibrationError::InvalidParameter`] for non-positive geometry, or a
    /// provider error if the sensor rejects the values.
    pub fn write_calibration(
        &mut self,
        wheel: WheelPosition,
        update: CalibrationUpdate,
        ctx: &mut CalibrationContext<'_>,
    ) -> CalibrationResult<SensorCalibration> {
        if !self.config.factor_in_range(update.correction_factor) {
            tracing::warn!(
                wheel = %wheel,
                factor = update.correction_factor,
                "Calibration write rejected: factor out of range"
            );
            ctx.faults.report_fault(CALIBRATION_OUT_OF_RANGE, true);
            return Err(CalibrationError::OutOfRange {
                factor: update.correction_factor,
                min: self.config.min_correction_factor,
                max: self.config.max_correction_factor,
            });
        }
        if update.pulses_per_revolution == Some(0) {
            return Err(CalibrationError::invalid_parameter(
                "pulses_per_revolution",
                "must be greater than 0",
            ));
        }
        if let Some(c) = update.wheel_circumference_m
            && !(c.is_finite() && c > 0.0)
        {
            return Err(CalibrationError::invalid_parameter(
                "wheel_circumference_m",
                "must be a positive finite number",
            ));
        }

        let current = ctx.provider.calibration(wheel)?;
        let updated = SensorCalibration {
            correction_factor: update.correction_factor,
            offset: update.offset.unwrap_or(current.offset),
            pulses_per_revolution: update
                .pulses_per_revolution
                .unwrap_or(current.pulses_per_revolution),
            wheel_circumference_m: update
                .wheel_circumference_m
                .unwrap_or(current.wheel_circumference_m),
            valid: true,
            timestamp_ms: millis_u32(ctx.now),
        };
        self.set_sensor_calibration(wheel, updated, ctx)?;

        let persisted = self.save(wheel, ctx);
        self.history[wheel].record(CalibrationHistoryEntry {
            timestamp_ms: updated.timestamp_ms,
            method: CalibrationMethod::Manual,
            result: outcome_of(&persisted),
            old_correction_factor: current.correction_factor,
            new_correction_factor: updated.correction_factor,
            accuracy_percent: ((1.0 - (updated.correction_factor - 1.0).abs()) * 100.0).max(0.0),
        });
        tracing::info!(wheel = %wheel, factor = updated.correction_factor, "Calibration written");
        Ok(updated)
    }

    /// Calibration history of a wheel, oldest first.
    pub fn history(&self, wheel: WheelPosition) -> &CalibrationHistory {
        &self.history[wheel]
    }

    /// Drop a wheel's history.
    pub fn clear_history(&mut self, wheel: WheelPosition) {
        self.history[wheel].clear();
    }

    /// Run the periodic sweep if its interval has elapsed.
    ///
    /// Wheels whose calibration is invalid or whose accuracy is below 90 %
    /// get an automatic session. Wheels already calibrating are skipped.
    /// Returns the number of sessions started.
    pub fn auto_calibration_check(
        &mut self,
        provider: &dyn SpeedDataProvider,
        now: Duration,
    ) -> usize {
        if !self.config.enable_auto_calibration
            || now.saturating_sub(self.last_auto_check) < self.config.auto_check_interval()
        {
            return 0;
        }
        self.last_auto_check = now;

        let mut started = 0usize;
        for wheel in WheelPosition::ALL {
            let Ok(validation) = self.validate_calibration(wheel, provider) else {
                continue;
            };
            if validation.valid && validation.accuracy_percent >= AUTO_CALIBRATION_MIN_ACCURACY {
                continue;
            }
            let request =
                CalibrationRequest::automatic(wheel, self.config.default_tolerance_percent);
            match self.start(request, now) {
                Ok(()) => {
                    started = started.saturating_add(1);
                    tracing::info!(
                        wheel = %wheel,
                        accuracy = validation.accuracy_percent,
                        "Automatic calibration scheduled"
                    );
                }
                Err(e) => tracing::debug!(wheel = %wheel, error = %e, "Automatic calibration skipped"),
            }
        }
        started
    }

    fn is_acceptable(&self, cal: &SensorCalibration) -> bool {
        cal.valid && self.config.factor_in_range(cal.correction_factor)
    }

    fn set_sensor_calibration(
        &self,
        wheel: WheelPosition,
        cal: SensorCalibration,
        ctx: &mut CalibrationContext<'_>,
    ) -> CalibrationResult<()> {
        ctx.provider.set_calibration(wheel, cal).map_err(|e| {
            tracing::warn!(wheel = %wheel, error = %e, "Sensor rejected calibration");
            CalibrationError::from(e)
        })
    }
}

fn outcome_of(persisted: &CalibrationResult<()>) -> SessionResult {
    match persisted {
        Ok(()) => SessionResult::Ok,
        Err(e) => e.session_result(),
    }
}

fn advance_session(
    config: &CalibrationConfig,
    session: &mut CalibrationSession,
    samples: &mut SampleBuffer,
    provider: &dyn SpeedDataProvider,
    faults: &mut dyn FaultReporter,
    now: Duration,
) {
    let wheel = session.wheel();
    match session.state {
        CalibrationState::Idle => {}
        CalibrationState::Requested => {
            session.state = CalibrationState::InProgress;
        }
        CalibrationState::InProgress => {
            if let Ok(reading) = provider.speed_data(wheel)
                && reading.valid
                && samples.len() < usize::from(config.max_samples)
                && samples
                    .push(CalibrationSample::new(
                        reading.speed_kmh,
                        session.request.reference_speed_kmh,
                    ))
                    .is_ok()
            {
                session.samples_collected = u16::try_from(samples.len()).unwrap_or(u16::MAX);
            }

            let elapsed = session.elapsed(now);
            let window = Duration::from_millis(u64::from(session.request.duration_ms));
            if session.samples_collected >= config.min_samples && elapsed >= window {
                conclude(config, session, samples, faults);
            }

            if session.state == CalibrationState::InProgress && elapsed >= config.session_timeout()
            {
                session.finish(CalibrationState::Failed, SessionResult::NotOk);
                faults.report_fault(CALIBRATION_FAILED, true);
                tracing::warn!(
                    wheel = %wheel,
                    samples = session.samples_collected,
                    "Calibration timed out"
                );
            }
        }
        CalibrationState::Completed | CalibrationState::Failed | CalibrationState::Cancelled => {
            if session.ended_at.is_none() {
                session.ended_at = Some(now);
            }
        }
    }
}

fn conclude(
    config: &CalibrationConfig,
    session: &mut CalibrationSession,
    samples: &SampleBuffer,
    faults: &mut dyn FaultReporter,
) {
    let wheel = session.wheel();
    let estimate = CalibrationEstimate::from_samples(samples)
        .filter(|est| est.usable_samples >= usize::from(config.min_samples));
    if let Some(est) = estimate {
        session.correction_factor = est.correction_factor;
        session.offset = est.offset;
        session.accuracy_percent = est.accuracy_percent;
    } else {
        tracing::debug!(wheel = %wheel, "Too few usable samples for an estimate");
    }

    let accepted =
        estimate.is_some_and(|est| est.is_acceptable(config, session.request.tolerance_percent));

    if accepted {
        session.finish(CalibrationState::Completed, SessionResult::Ok);
        faults.report_fault(CALIBRATION_FAILED, false);
        tracing::info!(
            wheel = %wheel,
            factor = session.correction_factor,
            accuracy = session.accuracy_percent,
            samples = session.samples_collected,
            "Calibration completed"
        );
    } else {
        session.finish(CalibrationState::Failed, SessionResult::ValidationFailed);
        faults.report_fault(CALIBRATION_FAILED, true);
        tracing::warn!(
            wheel = %wheel,
            factor = session.correction_factor,
            accuracy = session.accuracy_percent,
            "Calibration failed validation"
        );
    }
}
