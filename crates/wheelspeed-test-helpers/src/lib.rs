//! Shared test utilities for the wheel-speed monitor.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with `#[track_caller]`
//! - [`mock`] - In-memory sensor bus, calibration store and fault recorder
//! - [`logging`] - One-shot `tracing` subscriber for test output
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! wheelspeed-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use wheelspeed_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod must;
pub mod prelude;

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "logging")]
pub mod logging;

pub use must::{must, must_some};
