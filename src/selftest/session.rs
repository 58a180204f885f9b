//! Scoped engine sessions: a session is destroyed exactly once, on every
//! exit path.

use super::{SelfTestError, APP_TAG};
use crate::srtp::{CryptoPolicy, SrtpEngine, SrtpError};

/// Direction a session is used for. Only affects log labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Send,
    Recv,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Send => "send",
            Role::Recv => "recv",
        }
    }

    fn create_step(self) -> &'static str {
        match self {
            Role::Send => "send srtp_create",
            Role::Recv => "recv srtp_create",
        }
    }
}

/// Owns one engine session and destroys it when dropped.
///
/// Destroy failures on drop are logged and otherwise ignored.
pub struct ScopedSession<'e, E: SrtpEngine> {
    engine: &'e E,
    role: Role,
    session: Option<E::Session>,
}

impl<'e, E: SrtpEngine> ScopedSession<'e, E> {
    pub fn create(engine: &'e E, policy: &CryptoPolicy, role: Role) -> Result<Self, SelfTestError> {
        let session = engine
            .create_session(policy)
            .map_err(|source| SelfTestError::Session {
                step: role.create_step(),
                source,
            })?;
        tracing::debug!(target: APP_TAG, "{} session created", role.label());
        Ok(Self {
            engine,
            role,
            session: Some(session),
        })
    }

    #[cfg(test)]
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn protect(&mut self, buf: &mut [u8], len: usize) -> Result<usize, SrtpError> {
        let session = self.session.as_mut().ok_or(SrtpError::NoContext)?;
        self.engine.protect(session, buf, len)
    }

    pub fn unprotect(&mut self, buf: &mut [u8], len: usize) -> Result<usize, SrtpError> {
        let session = self.session.as_mut().ok_or(SrtpError::NoContext)?;
        self.engine.unprotect(session, buf, len)
    }

    /// Destroy now and hand back the engine's status instead of logging it.
    #[cfg(test)]
    pub fn close(mut self) -> Result<(), SrtpError> {
        match self.session.take() {
            Some(session) => self.engine.destroy_session(session),
            None => Ok(()),
        }
    }
}

impl<E: SrtpEngine> std::fmt::Debug for ScopedSession<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedSession")
            .field("role", &self.role)
            .field("live", &self.session.is_some())
            .finish()
    }
}

impl<E: SrtpEngine> Drop for ScopedSession<'_, E> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            match self.engine.destroy_session(session) {
                Ok(()) => tracing::debug!(target: APP_TAG, "{} session destroyed", self.role.label()),
                Err(e) => tracing::error!(
                    target: APP_TAG,
                    "{} srtp_dealloc failed with a code of {}.",
                    self.role.label(),
                    e.code()
                ),
            }
        }
    }
}
