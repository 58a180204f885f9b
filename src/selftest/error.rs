//! Failure taxonomy of a self-test run.

use thiserror::Error;

use crate::srtp::SrtpError;

/// Which half of the round trip produced the wrong bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Protect,
    Unprotect,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Protect => write!(f, "protect"),
            Stage::Unprotect => write!(f, "unprotect"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SelfTestError {
    /// Log handler install, engine init or shutdown failed.
    #[error("{step} failed with a code of {}.", .source.code())]
    Lifecycle {
        step: &'static str,
        source: SrtpError,
    },

    /// Session create or destroy failed.
    #[error("{step} failed with a code of {}.", .source.code())]
    Session {
        step: &'static str,
        source: SrtpError,
    },

    /// The engine rejected a protect/unprotect call.
    #[error("{op} failed with a code of {}.", .source.code())]
    CryptoOperation {
        op: &'static str,
        source: SrtpError,
    },

    /// The engine reported success but produced the wrong length.
    #[error("{op} returned {actual} bytes with a code of 0, expected {expected}.")]
    UnexpectedLength {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The engine reported success but produced the wrong bytes.
    #[error("Packet validation failed ({stage}).")]
    Mismatch { stage: Stage },

    #[error("task creation failed: {0}")]
    Scheduling(#[source] std::io::Error),
}

impl SelfTestError {
    /// Engine status behind this failure, if the engine reported one.
    #[cfg(test)]
    pub fn status(&self) -> Option<SrtpError> {
        match self {
            Self::Lifecycle { source, .. }
            | Self::Session { source, .. }
            | Self::CryptoOperation { source, .. } => Some(*source),
            _ => None,
        }
    }
}
