//! Per-wheel calibration session record.

use core::time::Duration;
use serde::{Deserialize, Serialize};
use wheelspeed_types::WheelPosition;

use crate::{CalibrationMethod, CalibrationRequest, CalibrationState, SessionResult};

/// State of one wheel's calibration attempt.
///
/// Exactly one session exists per wheel. Starting a new attempt overwrites
/// the previous record in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSession {
    /// Request the session was started with.
    pub request: CalibrationRequest,
    /// Lifecycle state.
    pub state: CalibrationState,
    /// Result code.
    pub result: SessionResult,
    /// Samples collected so far.
    pub samples_collected: u16,
    /// Estimated correction factor.
    pub correction_factor: f32,
    /// Estimated offset.
    pub offset: f32,
    /// Estimated accuracy (%).
    pub accuracy_percent: f32,
    /// Tick at which the session was started.
    pub started_at: Duration,
    /// Tick at which the session was retired.
    pub ended_at: Option<Duration>,
}

impl CalibrationSession {
    /// Idle session placeholder for `wheel`.
    pub fn idle(wheel: WheelPosition) -> Self {
        Self {
            request: CalibrationRequest::new(wheel, CalibrationMethod::Manual, 0.0),
            state: CalibrationState::Idle,
            result: SessionResult::Ok,
            samples_collected: 0,
            correction_factor: 1.0,
            offset: 0.0,
            accuracy_percent: 0.0,
            started_at: Duration::ZERO,
            ended_at: None,
        }
    }

    /// Fresh session in the `Requested` state.
    pub(crate) fn requested(request: CalibrationRequest, now: Duration) -> Self {
        Self {
            request,
            state: CalibrationState::Requested,
            result: SessionResult::InProgress,
            started_at: now,
            ..Self::idle(request.wheel)
        }
    }

    /// Wheel this session belongs to.
    pub fn wheel(&self) -> WheelPosition {
        self.request.wheel
    }

    /// True iff the state is `Requested` or `InProgress`.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Whether the session can be applied to the sensor.
    pub fn is_applicable(&self) -> bool {
        self.state == CalibrationState::Completed && self.result == SessionResult::Ok
    }

    /// Time since the session started.
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    pub(crate) fn finish(&mut self, state: CalibrationState, result: SessionResult) {
        self.state = state;
        self.result = result;
    }
}
