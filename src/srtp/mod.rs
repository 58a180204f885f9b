//! SRTP engine: the capability the self-test drives.
//!
//! `SrtpEngine` is the whole contract the harness relies on. `NativeEngine`
//! implements it with AES-CM + HMAC-SHA1 (RFC 3711, RFC 6188).

pub mod error;
pub mod kdf;
pub mod native;
pub mod policy;
pub mod replay;
pub mod rtp;

use std::sync::Arc;

pub use error::SrtpError;
pub use native::NativeEngine;
pub use policy::{CryptoPolicy, CryptoSuite, SsrcScope};

/// Severity passed to the log callback.
///
/// Raw codes outside the known range survive as `Unknown` so that a
/// handler can still report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
    Unknown(i32),
}

impl From<i32> for LogLevel {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Error,
            1 => Self::Warning,
            2 => Self::Info,
            3 => Self::Debug,
            other => Self::Unknown(other),
        }
    }
}

/// Log callback installed into an engine. Any context the handler needs is
/// captured by the closure.
pub type LogHandler = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Lifecycle and packet operations of an SRTP engine.
///
/// `protect`/`unprotect` work in place: `len` is the current packet length
/// within `buf`, the returned value is the new length.
pub trait SrtpEngine {
    type Session;

    /// Install (or with `None`, remove) the log callback.
    fn install_log_handler(&self, handler: Option<LogHandler>) -> Result<(), SrtpError>;

    fn init(&self) -> Result<(), SrtpError>;

    fn shutdown(&self) -> Result<(), SrtpError>;

    fn create_session(&self, policy: &CryptoPolicy) -> Result<Self::Session, SrtpError>;

    /// Encrypt and authenticate an RTP packet. `buf` must have room for the
    /// authentication tag past `len`.
    fn protect(
        &self,
        session: &mut Self::Session,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize, SrtpError>;

    /// Verify and decrypt an SRTP packet.
    fn unprotect(
        &self,
        session: &mut Self::Session,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize, SrtpError>;

    fn destroy_session(&self, session: Self::Session) -> Result<(), SrtpError>;
}
