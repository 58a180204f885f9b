//! Scriptable engine double for exercising failure paths.
//!
//! Wraps a `NativeEngine` so unscripted calls behave like the real thing,
//! records every call and lets a test inject a status at any step.

use std::cell::{Cell, RefCell};

use crate::srtp::native::NativeSession;
use crate::srtp::{CryptoPolicy, LogHandler, NativeEngine, SrtpEngine, SrtpError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    InstallLogHandler,
    Init,
    Shutdown,
    Create,
    Protect,
    Unprotect,
    Destroy,
}

/// Session handed out by `ScriptedEngine`; `id` is the creation ordinal.
#[derive(Debug)]
pub struct ScriptedSession {
    id: usize,
    inner: NativeSession,
}

#[derive(Default)]
pub struct ScriptedEngine {
    inner: NativeEngine,
    calls: RefCell<Vec<Call>>,
    destroyed: RefCell<Vec<usize>>,
    created: Cell<usize>,
    install_err: Cell<Option<SrtpError>>,
    init_err: Cell<Option<SrtpError>>,
    shutdown_err: Cell<Option<SrtpError>>,
    create_err: Cell<Option<(usize, SrtpError)>>,
    protect_err: Cell<Option<SrtpError>>,
    unprotect_err: Cell<Option<SrtpError>>,
    destroy_err: Cell<Option<SrtpError>>,
    protect_len: Cell<Option<usize>>,
    corrupt_protect: Cell<bool>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine already initialized, for tests that start at session level.
    pub fn ready() -> Self {
        let engine = Self::new();
        engine.inner.init().unwrap();
        engine
    }

    pub fn fail_install(&self, err: SrtpError) {
        self.install_err.set(Some(err));
    }

    pub fn fail_init(&self, err: SrtpError) {
        self.init_err.set(Some(err));
    }

    pub fn fail_shutdown(&self, err: SrtpError) {
        self.shutdown_err.set(Some(err));
    }

    /// Fail the `nth` (1-based) create call.
    pub fn fail_create(&self, nth: usize, err: SrtpError) {
        self.create_err.set(Some((nth, err)));
    }

    pub fn fail_protect(&self, err: SrtpError) {
        self.protect_err.set(Some(err));
    }

    pub fn fail_unprotect(&self, err: SrtpError) {
        self.unprotect_err.set(Some(err));
    }

    /// The session is still released; only the reported status changes.
    pub fn fail_destroy(&self, err: SrtpError) {
        self.destroy_err.set(Some(err));
    }

    /// Report ok from protect but with this length.
    pub fn override_protect_len(&self, len: usize) {
        self.protect_len.set(Some(len));
    }

    /// Report ok from protect but flip a ciphertext byte.
    pub fn corrupt_protect_output(&self) {
        self.corrupt_protect.set(true);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.borrow().iter().filter(|&&c| c == call).count()
    }

    /// Creation ordinals (0-based) of sessions in the order destroyed.
    pub fn destroyed_ids(&self) -> Vec<usize> {
        self.destroyed.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl SrtpEngine for ScriptedEngine {
    type Session = ScriptedSession;

    fn install_log_handler(&self, handler: Option<LogHandler>) -> Result<(), SrtpError> {
        self.record(Call::InstallLogHandler);
        if let Some(err) = self.install_err.get() {
            return Err(err);
        }
        self.inner.install_log_handler(handler)
    }

    fn init(&self) -> Result<(), SrtpError> {
        self.record(Call::Init);
        if let Some(err) = self.init_err.get() {
            return Err(err);
        }
        self.inner.init()
    }

    fn shutdown(&self) -> Result<(), SrtpError> {
        self.record(Call::Shutdown);
        if let Some(err) = self.shutdown_err.get() {
            return Err(err);
        }
        self.inner.shutdown()
    }

    fn create_session(&self, policy: &CryptoPolicy) -> Result<ScriptedSession, SrtpError> {
        self.record(Call::Create);
        let attempt = self.created.get() + 1;
        self.created.set(attempt);
        if let Some((nth, err)) = self.create_err.get() {
            if nth == attempt {
                return Err(err);
            }
        }
        let inner = self.inner.create_session(policy)?;
        Ok(ScriptedSession {
            id: attempt - 1,
            inner,
        })
    }

    fn protect(
        &self,
        session: &mut ScriptedSession,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize, SrtpError> {
        self.record(Call::Protect);
        if let Some(err) = self.protect_err.get() {
            return Err(err);
        }
        let out = self.inner.protect(&mut session.inner, buf, len)?;
        if self.corrupt_protect.get() {
            buf[len - 1] ^= 0xff;
        }
        Ok(self.protect_len.get().unwrap_or(out))
    }

    fn unprotect(
        &self,
        session: &mut ScriptedSession,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize, SrtpError> {
        self.record(Call::Unprotect);
        if let Some(err) = self.unprotect_err.get() {
            return Err(err);
        }
        self.inner.unprotect(&mut session.inner, buf, len)
    }

    fn destroy_session(&self, session: ScriptedSession) -> Result<(), SrtpError> {
        self.record(Call::Destroy);
        self.destroyed.borrow_mut().push(session.id);
        let status = self.inner.destroy_session(session.inner);
        match self.destroy_err.get() {
            Some(err) => Err(err),
            None => status,
        }
    }
}
