//! Boot-time SRTP round-trip self-test.
//!
//! The controller installs the log adapter, initializes the engine, builds
//! the reference policy, runs the protect/unprotect validation against a
//! known vector, shuts the engine down and reports one verdict line.

pub mod controller;
pub mod error;
pub mod log_adapter;
pub mod policy;
pub mod session;
pub mod validator;
pub mod vectors;

#[cfg(test)]
pub mod testing;

pub use controller::{run_self_test, Verdict};
pub use error::SelfTestError;

/// Log target every self-test line is emitted under.
pub const APP_TAG: &str = "ESPSRTP";
