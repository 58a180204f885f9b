//! Status domain of the SRTP engine.
//!
//! Every engine call either succeeds or returns one of these. The numeric
//! codes are stable and are what gets logged as "failed with a code of N".

use thiserror::Error;

/// Non-ok engine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SrtpError {
    #[error("unspecified failure")]
    #[allow(dead_code)]
    Fail,
    #[error("bad parameter")]
    BadParam,
    #[error("allocation failed")]
    #[allow(dead_code)]
    AllocFail,
    #[error("deallocation failed")]
    DeallocFail,
    #[error("engine not initialized")]
    InitFail,
    #[error("authentication failed")]
    AuthFail,
    #[error("cipher failure")]
    CipherFail,
    #[error("replayed packet")]
    ReplayFail,
    #[error("packet too old for replay window")]
    ReplayOld,
    #[error("session key expired")]
    KeyExpired,
    #[error("unsupported operation")]
    NoSuchOp,
    #[error("no crypto context for stream")]
    NoContext,
    #[error("malformed packet")]
    ParseError,
}

impl SrtpError {
    /// Numeric status code (0 is reserved for ok).
    pub fn code(self) -> i32 {
        match self {
            Self::Fail => 1,
            Self::BadParam => 2,
            Self::AllocFail => 3,
            Self::DeallocFail => 4,
            Self::InitFail => 5,
            Self::AuthFail => 7,
            Self::CipherFail => 8,
            Self::ReplayFail => 9,
            Self::ReplayOld => 10,
            Self::NoSuchOp => 12,
            Self::NoContext => 13,
            Self::KeyExpired => 15,
            Self::ParseError => 21,
        }
    }
}
