//! Diagnostic server: session state, service dispatch and the S3 timer.

use core::time::Duration;

use wheelspeed_calibration::{CalibrationContext, CalibrationError, CalibrationManager};
use wheelspeed_detector::MalfunctionDetector;
use wheelspeed_types::{CalibrationStore, SpeedDataProvider, WheelPosition};

use crate::did::{
    DataIdentifier, decode_calibration_write, encode_calibration, encode_malfunction_counters,
    encode_speed_data, encode_system_status, scale_u8,
};
use crate::dtc::DtcRegistry;
use crate::ids::{dtc, dtc_sub_function, reset_type, routine_sub_function, service_id, timing};
use crate::routine::{RoutineId, start_calibration_request};
use crate::{
    DiagnosticConfig, DiagnosticRequest, DiagnosticResponse, DiagnosticResult, DiagnosticSession,
    NegativeResponseCode, monitor,
};

type Nrc = NegativeResponseCode;

/// Positive response data (after the response service id) or a reason code.
type ServiceOutcome = Result<Vec<u8>, Nrc>;

/// Services known to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// 0x10
    SessionControl,
    /// 0x11
    EcuReset,
    /// 0x14
    ClearDiagnosticInformation,
    /// 0x19
    ReadDtcInformation,
    /// 0x22
    ReadDataByIdentifier,
    /// 0x2E
    WriteDataByIdentifier,
    /// 0x2F, always rejected.
    IoControlByIdentifier,
    /// 0x31
    RoutineControl,
}

impl ServiceKind {
    /// Route a service id.
    pub fn from_service_id(sid: u8) -> Option<Self> {
        match sid {
            service_id::DIAGNOSTIC_SESSION_CONTROL => Some(Self::SessionControl),
            service_id::ECU_RESET => Some(Self::EcuReset),
            service_id::CLEAR_DIAGNOSTIC_INFORMATION => Some(Self::ClearDiagnosticInformation),
            service_id::READ_DTC_INFORMATION => Some(Self::ReadDtcInformation),
            service_id::READ_DATA_BY_IDENTIFIER => Some(Self::ReadDataByIdentifier),
            service_id::WRITE_DATA_BY_IDENTIFIER => Some(Self::WriteDataByIdentifier),
            service_id::IO_CONTROL_BY_IDENTIFIER => Some(Self::IoControlByIdentifier),
            service_id::ROUTINE_CONTROL => Some(Self::RoutineControl),
            _ => None,
        }
    }
}

/// Subsystem state a request may read or mutate.
pub struct DiagnosticContext<'a> {
    /// Malfunction detector.
    pub detector: &'a mut MalfunctionDetector,
    /// Calibration manager.
    pub calibration: &'a mut CalibrationManager,
    /// Sensor layer.
    pub provider: &'a mut dyn SpeedDataProvider,
    /// Non-volatile storage.
    pub store: &'a mut dyn CalibrationStore,
    /// Current monotonic tick.
    pub now: Duration,
}

impl core::fmt::Debug for DiagnosticContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DiagnosticContext")
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// UDS server for the wheel-speed subsystem.
///
/// Owns the diagnostic session and the DTC registry. Every request gets
/// exactly one response; protocol failures never surface as Rust errors.
#[derive(Debug, Clone)]
pub struct DiagnosticServer {
    config: DiagnosticConfig,
    session: DiagnosticSession,
    registry: DtcRegistry,
    last_request: Duration,
    pending_reset: bool,
}

impl Default for DiagnosticServer {
    fn default() -> Self {
        Self {
            config: DiagnosticConfig::default(),
            session: DiagnosticSession::Default,
            registry: DtcRegistry::new(),
            last_request: Duration::ZERO,
            pending_reset: false,
        }
    }
}

impl DiagnosticServer {
    /// Create a server in the default session.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: DiagnosticConfig) -> DiagnosticResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Configuration.
    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    /// Active diagnostic session.
    pub fn session(&self) -> DiagnosticSession {
        self.session
    }

    /// DTC registry.
    pub fn registry(&self) -> &DtcRegistry {
        &self.registry
    }

    /// DTC registry, for collaborators that report faults.
    pub fn registry_mut(&mut self) -> &mut DtcRegistry {
        &mut self.registry
    }

    /// Whether a hard reset was accepted and not yet carried out.
    pub fn reset_pending(&self) -> bool {
        self.pending_reset
    }

    /// Take the pending hard reset, if any.
    pub fn take_pending_reset(&mut self) -> bool {
        core::mem::take(&mut self.pending_reset)
    }

    /// Cyclic step: stamp the registry clock, mirror confirmed malfunctions
    /// into DTCs and run the S3 timer.
    pub fn run_cycle(&mut self, detector: &MalfunctionDetector, now: Duration) {
        self.registry.set_time(now);
        monitor::report_confirmed(detector, &mut self.registry);

        if self.session != DiagnosticSession::Default
            && now.saturating_sub(self.last_request) >= self.config.session_timeout()
        {
            tracing::info!(
                session = %self.session,
                idle_ms = now.saturating_sub(self.last_request).as_millis(),
                "Diagnostic session timed out"
            );
            self.session = DiagnosticSession::Default;
        }
    }

    /// Answer one request.
    pub fn process(
        &mut self,
        request: &DiagnosticRequest,
        ctx: &mut DiagnosticContext<'_>,
    ) -> DiagnosticResponse {
        let sid = request.service_id();
        self.last_request = ctx.now;
        self.registry.set_time(ctx.now);

        let outcome = match ServiceKind::from_service_id(sid) {
            Some(kind) => self.dispatch(kind, request, ctx),
            None => Err(Nrc::ServiceNotSupported),
        };

        let response = match outcome {
            Ok(data) if data.len() < request.max_response_len() => {
                DiagnosticResponse::positive(sid, &data)
            }
            Ok(data) => {
                tracing::debug!(
                    sid = format_args!("{sid:02X}"),
                    needed = data.len().saturating_add(1),
                    max = request.max_response_len(),
                    "Response buffer too small"
                );
                DiagnosticResponse::negative(sid, Nrc::IncorrectMessageLength)
            }
            Err(code) => DiagnosticResponse::negative(sid, code),
        };

        if let Some(code) = response.negative_code() {
            tracing::debug!(sid = format_args!("{sid:02X}"), nrc = %code, "Negative response");
        }
        response
    }

    fn dispatch(
        &mut self,
        kind: ServiceKind,
        request: &DiagnosticRequest,
        ctx: &mut DiagnosticContext<'_>,
    ) -> ServiceOutcome {
        let payload = request.payload();
        match kind {
            ServiceKind::SessionControl => self.session_control(payload),
            ServiceKind::EcuReset => self.ecu_reset(payload),
            ServiceKind::ClearDiagnosticInformation => {
                self.clear_diagnostic_information(payload, ctx)
            }
            ServiceKind::ReadDtcInformation => {
                self.read_dtc_information(payload, request.max_response_len())
            }
            ServiceKind::ReadDataByIdentifier => self.read_data_by_identifier(payload, ctx),
            ServiceKind::WriteDataByIdentifier => self.write_data_by_identifier(payload, ctx),
            ServiceKind::IoControlByIdentifier => Err(Nrc::ServiceNotSupported),
            ServiceKind::RoutineControl => self.routine_control(payload, ctx),
        }
    }

    fn session_control(&mut self, payload: &[u8]) -> ServiceOutcome {
        let &[requested, ..] = payload else {
            return Err(Nrc::IncorrectMessageLength);
        };
        let session = DiagnosticSession::from_code(requested).ok_or(Nrc::SubFunctionNotSupported)?;
        if session != self.session {
            tracing::info!(from = %self.session, to = %session, "Diagnostic session changed");
        }
        self.session = session;

        let [p2_hi, p2_lo] = timing::P2_SERVER_MAX_MS.to_be_bytes();
        let [p2s_hi, p2s_lo] = timing::P2_STAR_SERVER_MAX_MS.to_be_bytes();
        Ok(vec![session.code(), p2_hi, p2_lo, p2s_hi, p2s_lo])
    }

    fn ecu_reset(&mut self, payload: &[u8]) -> ServiceOutcome {
        let &[reset, ..] = payload else {
            return Err(Nrc::IncorrectMessageLength);
        };
        if reset != reset_type::HARD_RESET || self.session != DiagnosticSession::Programming {
            return Err(Nrc::ConditionsNotCorrect);
        }
        tracing::info!("Hard reset accepted");
        self.pending_reset = true;
        self.session = DiagnosticSession::Default;
        Ok(vec![reset])
    }

    fn clear_diagnostic_information(
        &mut self,
        payload: &[u8],
        ctx: &mut DiagnosticContext<'_>,
    ) -> ServiceOutcome {
        let &[g0, g1, g2, ..] = payload else {
            return Err(Nrc::IncorrectMessageLength);
        };
        let group = u32::from_be_bytes([0, g0, g1, g2]);
        if group == dtc::GROUP_ALL {
            self.registry.clear_all();
            ctx.detector.clear_all();
        } else if !self.registry.clear(group) {
            return Err(Nrc::RequestOutOfRange);
        }
        Ok(Vec::new())
    }

    fn read_dtc_information(&self, payload: &[u8], max_response_len: usize) -> ServiceOutcome {
        let &[sub_function, ref rest @ ..] = payload else {
            return Err(Nrc::IncorrectMessageLength);
        };
        // Response data excludes the service id byte.
        let budget = max_response_len.saturating_sub(1);

        match sub_function {
            dtc_sub_function::REPORT_DTC_BY_STATUS_MASK => {
                let &[mask, ..] = rest else {
                    return Err(Nrc::IncorrectMessageLength);
                };
                let mut data = vec![sub_function, mask];
                for record in self.registry.matching(mask) {
                    if data.len().saturating_add(4) > budget {
                        break;
                    }
                    data.extend_from_slice(&record.code_bytes());
                    data.push(record.status.to_byte());
                }
                Ok(data)
            }
            dtc_sub_function::REPORT_SUPPORTED_DTC => {
                let mut data = vec![sub_function];
                for record in self.registry.records() {
                    if data.len().saturating_add(3) > budget {
                        break;
                    }
                    data.extend_from_slice(&record.code_bytes());
                }
                Ok(data)
            }
            _ => Err(Nrc::SubFunctionNotSupported),
        }
    }

    fn read_data_by_identifier(
        &self,
        payload: &[u8],
        ctx: &mut DiagnosticContext<'_>,
    ) -> ServiceOutcome {
        let &[hi, lo, ..] = payload else {
            return Err(Nrc::IncorrectMessageLength);
        };
        let identifier = DataIdentifier::from_id(u16::from_be_bytes([hi, lo]))
            .ok_or(Nrc::RequestOutOfRange)?;

        let mut data = vec![hi, lo];
        match identifier {
            DataIdentifier::SpeedData(wheel) => {
                let reading = ctx.provider.speed_data(wheel).map_err(|e| {
                    tracing::warn!(wheel = %wheel, error = %e, "Speed data unavailable");
                    Nrc::ConditionsNotCorrect
                })?;
                data.extend_from_slice(&encode_speed_data(&reading));
            }
            DataIdentifier::Calibration(wheel) => {
                let cal = ctx.provider.calibration(wheel).map_err(|e| {
                    tracing::warn!(wheel = %wheel, error = %e, "Calibration unavailable");
                    Nrc::ConditionsNotCorrect
                })?;
                data.extend_from_slice(&encode_calibration(&cal));
            }
            DataIdentifier::SystemStatus => {
                data.extend_from_slice(&encode_system_status(
                    ctx.detector.check_system_health(),
                    ctx.detector.statuses(),
                    self.registry.active_count(),
                ));
            }
            DataIdentifier::MalfunctionCounter => {
                data.extend_from_slice(&encode_malfunction_counters(ctx.detector.statuses()));
            }
            DataIdentifier::ActiveSession => data.push(self.session.code()),
        }
        Ok(data)
    }

    fn write_data_by_identifier(
        &mut self,
        payload: &[u8],
        ctx: &mut DiagnosticContext<'_>,
    ) -> ServiceOutcome {
        let &[hi, lo, ref record @ ..] = payload else {
            return Err(Nrc::IncorrectMessageLength);
        };
        if record.is_empty() {
            return Err(Nrc::IncorrectMessageLength);
        }
        if self.session != DiagnosticSession::Extended {
            return Err(Nrc::ConditionsNotCorrect);
        }
        let Some(DataIdentifier::Calibration(wheel)) =
            DataIdentifier::from_id(u16::from_be_bytes([hi, lo]))
        else {
            return Err(Nrc::RequestOutOfRange);
        };
        let update = decode_calibration_write(record).ok_or(Nrc::IncorrectMessageLength)?;

        let mut cal_ctx = CalibrationContext {
            provider: &mut *ctx.provider,
            store: &mut *ctx.store,
            faults: &mut self.registry,
            now: ctx.now,
        };
        ctx.calibration
            .write_calibration(wheel, update, &mut cal_ctx)
            .map_err(|e| calibration_nrc(&e))?;
        Ok(vec![hi, lo])
    }

    fn routine_control(
        &mut self,
        payload: &[u8],
        ctx: &mut DiagnosticContext<'_>,
    ) -> ServiceOutcome {
        let &[sub_function, hi, lo, ref record @ ..] = payload else {
            return Err(Nrc::IncorrectMessageLength);
        };
        if self.session != DiagnosticSession::Extended {
            return Err(Nrc::ConditionsNotCorrect);
        }
        if sub_function != routine_sub_function::START_ROUTINE {
            return Err(Nrc::SubFunctionNotSupported);
        }
        let routine = RoutineId::from_id(u16::from_be_bytes([hi, lo])).ok_or(Nrc::RequestOutOfRange)?;

        let status = match routine {
            RoutineId::StartCalibration(wheel) => self.start_calibration(wheel, record, ctx)?,
            RoutineId::ValidateCalibration => validate_calibration(record, ctx)?,
            RoutineId::ResetCalibrationAll => self.reset_calibration_all(ctx)?,
            RoutineId::SelfTest => self_test(ctx),
        };

        let mut data = vec![sub_function, hi, lo];
        data.extend_from_slice(&status);
        Ok(data)
    }

    fn start_calibration(
        &mut self,
        wheel: WheelPosition,
        record: &[u8],
        ctx: &mut DiagnosticContext<'_>,
    ) -> ServiceOutcome {
        let request = start_calibration_request(wheel, record).ok_or(Nrc::IncorrectMessageLength)?;
        ctx.calibration
            .start(request, ctx.now)
            .map_err(|e| calibration_nrc(&e))?;
        tracing::info!(wheel = %wheel, "Calibration routine started");
        Ok(vec![0x00])
    }

    fn reset_calibration_all(&mut self, ctx: &mut DiagnosticContext<'_>) -> ServiceOutcome {
        let mut persisted = true;
        let mut cal_ctx = CalibrationContext {
            provider: &mut *ctx.provider,
            store: &mut *ctx.store,
            faults: &mut self.registry,
            now: ctx.now,
        };
        for wheel in WheelPosition::ALL {
            match ctx.calibration.reset_to_factory(wheel, &mut cal_ctx) {
                Ok(()) => {}
                Err(CalibrationError::Store(_) | CalibrationError::Encoding { .. }) => {
                    persisted = false;
                }
                Err(e) => {
                    tracing::warn!(wheel = %wheel, error = %e, "Factory reset rejected");
                    return Err(Nrc::ConditionsNotCorrect);
                }
            }
        }
        Ok(vec![u8::from(!persisted)])
    }
}

fn validate_calibration(record: &[u8], ctx: &DiagnosticContext<'_>) -> ServiceOutcome {
    match *record {
        [] => validation_bytes(&WheelPosition::ALL, ctx),
        [index] => {
            let wheel = WheelPosition::from_index(index).ok_or(Nrc::RequestOutOfRange)?;
            validation_bytes(&[wheel], ctx)
        }
        _ => Err(Nrc::IncorrectMessageLength),
    }
}

fn validation_bytes(wheels: &[WheelPosition], ctx: &DiagnosticContext<'_>) -> ServiceOutcome {
    let mut data = Vec::with_capacity(wheels.len().saturating_mul(2));
    for &wheel in wheels {
        let validation = ctx
            .calibration
            .validate_calibration(wheel, &*ctx.provider)
            .map_err(|e| calibration_nrc(&e))?;
        data.push(u8::from(validation.valid));
        data.push(scale_u8(validation.accuracy_percent));
    }
    Ok(data)
}

fn self_test(ctx: &DiagnosticContext<'_>) -> Vec<u8> {
    let mut failing = 0u8;
    for wheel in WheelPosition::ALL {
        let reading_ok = ctx.provider.speed_data(wheel).is_ok_and(|r| r.valid);
        let calibration_ok = ctx.provider.calibration(wheel).is_ok_and(|c| c.valid);
        let confirmed = ctx.detector.status(wheel).confirmed;
        if !(reading_ok && calibration_ok) || confirmed {
            failing |= 1 << wheel.index();
        }
    }
    if failing != 0 {
        tracing::warn!(mask = format_args!("{failing:04b}"), "Self-test failed");
    }
    vec![u8::from(failing != 0), failing]
}

fn calibration_nrc(error: &CalibrationError) -> Nrc {
    match error {
        CalibrationError::InProgress(_) => Nrc::RequestSequenceError,
        CalibrationError::OutOfRange { .. }
        | CalibrationError::InvalidParameter { .. }
        | CalibrationError::InvalidConfiguration(_) => Nrc::RequestOutOfRange,
        CalibrationError::NotActive(_)
        | CalibrationError::NotApplicable { .. }
        | CalibrationError::Encoding { .. }
        | CalibrationError::Provider(_)
        | CalibrationError::Store(_) => Nrc::ConditionsNotCorrect,
    }
}
