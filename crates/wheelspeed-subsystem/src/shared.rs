//! Thread-shared handle.

use std::sync::Arc;

use parking_lot::Mutex;
use wheelspeed_types::{CalibrationStore, SpeedDataProvider, SystemState};
use wheelspeed_uds::DiagnosticResponse;

use crate::{SubsystemResult, WheelSpeedSubsystem};

/// Clonable handle that serialises cycles and diagnostic requests.
///
/// The cyclic task and a diagnostic transport can each hold a clone. Every
/// operation takes the lock for its whole duration, so a request never
/// observes a half-finished cycle.
#[derive(Debug)]
pub struct SharedSubsystem<P, S> {
    inner: Arc<Mutex<WheelSpeedSubsystem<P, S>>>,
}

impl<P, S> Clone for SharedSubsystem<P, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, S> SharedSubsystem<P, S>
where
    P: SpeedDataProvider,
    S: CalibrationStore,
{
    /// Wrap a subsystem.
    pub fn new(subsystem: WheelSpeedSubsystem<P, S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(subsystem)),
        }
    }

    /// Run one cycle under the lock.
    pub fn run_cycle(&self, brake_pedal_pressed: bool) -> SystemState {
        self.inner.lock().run_cycle(brake_pedal_pressed)
    }

    /// Answer a raw diagnostic frame under the lock.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty frame.
    pub fn handle_bytes(
        &self,
        frame: &[u8],
        max_response_len: usize,
    ) -> SubsystemResult<DiagnosticResponse> {
        self.inner.lock().handle_bytes(frame, max_response_len)
    }

    /// Run `f` with exclusive access.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut WheelSpeedSubsystem<P, S>) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}
