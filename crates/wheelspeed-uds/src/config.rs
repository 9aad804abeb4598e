//! Diagnostic server configuration.

use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::{DiagnosticError, DiagnosticResult};

/// Tunables for the diagnostic server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// S3 timer: a non-default session falls back to default after this long
    /// without a request (ms).
    pub session_timeout_ms: u32,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            session_timeout_ms: 5_000,
        }
    }
}

impl DiagnosticConfig {
    /// S3 timeout as a duration.
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.session_timeout_ms))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the session timeout is zero.
    pub fn validate(&self) -> DiagnosticResult<()> {
        if self.session_timeout_ms == 0 {
            return Err(DiagnosticError::invalid_configuration(
                "session_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}
