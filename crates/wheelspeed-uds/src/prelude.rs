//! Prelude for convenient imports.
//!
//! ```rust
//! use wheelspeed_uds::prelude::*;
//! ```

pub use crate::{
    DiagnosticConfig, DiagnosticContext, DiagnosticError, DiagnosticRequest, DiagnosticResponse,
    DiagnosticResult, DiagnosticServer, DiagnosticSession, DtcRegistry, DtcStatus,
    NegativeResponseCode,
};
