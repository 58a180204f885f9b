//! Pure-Rust SRTP engine (AES-CM 128/256 with HMAC-SHA1-80/32).
//!
//! Packet layout after protection:
//! - SRTP: `rtp_header || encrypted_payload || auth_tag`
//! - SRTCP: `rtcp_header(8) || encrypted_payload || E||index(4) || auth_tag`

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::error::SrtpError;
use super::kdf::{self, KeyUsage, SessionKeys};
use super::policy::{CryptoPolicy, SsrcScope, DEFAULT_WINDOW_SIZE};
use super::replay::ReplayWindow;
use super::rtp;
use super::{LogHandler, LogLevel, SrtpEngine};

/// Length of the SRTCP E-flag plus 31-bit index trailer.
pub const SRTCP_INDEX_LEN: usize = 4;

/// Largest SRTCP index before the session key must be replaced.
const SRTCP_INDEX_MAX: u32 = 0x7FFF_FFFF;

/// Accepted replay window sizes.
const MIN_WINDOW_SIZE: usize = 64;
const MAX_WINDOW_SIZE: usize = 0x7FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outbound,
    Inbound,
}

#[derive(Default)]
struct EngineState {
    initialized: bool,
    /// Bumped on every shutdown so sessions from an earlier init are stale.
    generation: u64,
    live_sessions: usize,
    log_handler: Option<LogHandler>,
}

/// Keys shared by every stream a session instantiates.
#[derive(Debug, Clone)]
struct StreamTemplate {
    rtp_keys: SessionKeys,
    rtcp_keys: SessionKeys,
    window_size: usize,
}

#[derive(Debug)]
struct StreamState {
    rtp_keys: SessionKeys,
    rtcp_keys: SessionKeys,
    rtp_window: ReplayWindow,
    rtcp_window: ReplayWindow,
    /// Last SRTCP index sent.
    rtcp_index: u32,
}

impl StreamTemplate {
    fn instantiate(&self) -> StreamState {
        StreamState {
            rtp_keys: self.rtp_keys.clone(),
            rtcp_keys: self.rtcp_keys.clone(),
            rtp_window: ReplayWindow::new(self.window_size),
            rtcp_window: ReplayWindow::new(DEFAULT_WINDOW_SIZE),
            rtcp_index: 0,
        }
    }
}

/// Session created by `NativeEngine::create_session`.
#[derive(Debug)]
pub struct NativeSession {
    policy: CryptoPolicy,
    generation: u64,
    template: StreamTemplate,
    streams: HashMap<u32, StreamState>,
}

impl NativeSession {
    /// Stream for `ssrc`, created from the template when the scope allows it.
    fn stream_for(
        &mut self,
        ssrc: u32,
        direction: Direction,
    ) -> Result<&mut StreamState, SrtpError> {
        if !self.streams.contains_key(&ssrc) {
            let permitted = matches!(
                (self.policy.ssrc, direction),
                (SsrcScope::AnyOutbound, Direction::Outbound)
                    | (SsrcScope::AnyInbound, Direction::Inbound)
            );
            if !permitted {
                return Err(SrtpError::NoContext);
            }
            self.streams.insert(ssrc, self.template.instantiate());
        }
        self.streams.get_mut(&ssrc).ok_or(SrtpError::NoContext)
    }

    /// Number of streams the session currently holds.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }
}

/// In-process SRTP engine.
pub struct NativeEngine {
    state: Mutex<EngineState>,
}

impl NativeEngine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EngineState::default()),
        }
    }

    /// If the mutex is poisoned we recover the inner state; a panicking log
    /// handler must not wedge the engine.
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Invoke the installed handler outside the state lock.
    fn log(&self, level: LogLevel, message: &str) {
        let handler = self.lock().log_handler.clone();
        if let Some(handler) = handler {
            handler(level, message);
        }
    }

    fn ensure_live(&self, session: &NativeSession) -> Result<(), SrtpError> {
        let state = self.lock();
        if state.initialized && state.generation == session.generation {
            Ok(())
        } else {
            Err(SrtpError::InitFail)
        }
    }

    fn fail(&self, what: &str, err: SrtpError) -> SrtpError {
        let level = match err {
            SrtpError::ReplayFail | SrtpError::ReplayOld => LogLevel::Warning,
            _ => LogLevel::Error,
        };
        self.log(level, &format!("srtp: {}: {}", what, err));
        err
    }

    /// Encrypt and authenticate an RTCP packet in place.
    #[allow(dead_code)]
    pub fn protect_rtcp(
        &self,
        session: &mut NativeSession,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize, SrtpError> {
        self.ensure_live(session)?;
        if len > buf.len() {
            return Err(self.fail("protect_rtcp", SrtpError::BadParam));
        }
        if len < rtp::RTCP_HEADER_SIZE {
            return Err(self.fail("protect_rtcp", SrtpError::ParseError));
        }
        let tag_len = session.policy.rtcp.auth_tag_len();
        if buf.len() < len + SRTCP_INDEX_LEN + tag_len {
            return Err(self.fail("protect_rtcp: no room for trailer", SrtpError::BadParam));
        }

        let ssrc = rtp::rtcp_ssrc(buf);
        let stream = session
            .stream_for(ssrc, Direction::Outbound)
            .map_err(|e| self.fail("protect_rtcp", e))?;

        if stream.rtcp_index >= SRTCP_INDEX_MAX {
            return Err(self.fail("protect_rtcp", SrtpError::KeyExpired));
        }
        stream.rtcp_index += 1;
        let index = stream.rtcp_index;

        let keys = &stream.rtcp_keys;
        let iv = kdf::build_iv(&keys.salt, ssrc, u64::from(index));
        kdf::apply_keystream(&keys.cipher_key, &iv, &mut buf[rtp::RTCP_HEADER_SIZE..len])?;

        // E flag (1) | srtcp_index (31 bits)
        let e_index = 0x8000_0000 | index;
        let index_end = len + SRTCP_INDEX_LEN;
        buf[len..index_end].copy_from_slice(&e_index.to_be_bytes());

        let tag = kdf::compute_auth_tag(&keys.auth_key, &[&buf[..index_end]], tag_len)?;
        buf[index_end..index_end + tag_len].copy_from_slice(&tag);

        self.log(
            LogLevel::Debug,
            &format!("srtp: protected rtcp ssrc=0x{:08x} index={}", ssrc, index),
        );
        Ok(index_end + tag_len)
    }

    /// Verify and decrypt an SRTCP packet in place.
    #[allow(dead_code)]
    pub fn unprotect_rtcp(
        &self,
        session: &mut NativeSession,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize, SrtpError> {
        self.ensure_live(session)?;
        if len > buf.len() {
            return Err(self.fail("unprotect_rtcp", SrtpError::BadParam));
        }
        let tag_len = session.policy.rtcp.auth_tag_len();
        if len < rtp::RTCP_HEADER_SIZE + SRTCP_INDEX_LEN + tag_len {
            return Err(self.fail("unprotect_rtcp", SrtpError::ParseError));
        }

        let tag_start = len - tag_len;
        let index_start = tag_start - SRTCP_INDEX_LEN;
        let ssrc = rtp::rtcp_ssrc(buf);
        let e_index = u32::from_be_bytes([
            buf[index_start],
            buf[index_start + 1],
            buf[index_start + 2],
            buf[index_start + 3],
        ]);
        let encrypted = e_index & 0x8000_0000 != 0;
        let index = e_index & SRTCP_INDEX_MAX;

        let stream = session
            .stream_for(ssrc, Direction::Inbound)
            .map_err(|e| self.fail("unprotect_rtcp", e))?;

        stream
            .rtcp_window
            .check(u64::from(index))
            .map_err(|e| self.fail("unprotect_rtcp", e))?;

        let keys = &stream.rtcp_keys;
        kdf::verify_auth_tag(&keys.auth_key, &[&buf[..tag_start]], &buf[tag_start..len])
            .map_err(|e| self.fail("unprotect_rtcp", e))?;

        if encrypted {
            let iv = kdf::build_iv(&keys.salt, ssrc, u64::from(index));
            kdf::apply_keystream(
                &keys.cipher_key,
                &iv,
                &mut buf[rtp::RTCP_HEADER_SIZE..index_start],
            )?;
        }
        stream.rtcp_window.add(u64::from(index));

        Ok(index_start)
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SrtpEngine for NativeEngine {
    type Session = NativeSession;

    fn install_log_handler(&self, handler: Option<LogHandler>) -> Result<(), SrtpError> {
        self.lock().log_handler = handler;
        Ok(())
    }

    fn init(&self) -> Result<(), SrtpError> {
        let already = {
            let mut state = self.lock();
            std::mem::replace(&mut state.initialized, true)
        };
        if already {
            self.log(LogLevel::Debug, "srtp: init called while already initialized");
        } else {
            self.log(LogLevel::Info, "srtp: crypto kernel initialized");
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<(), SrtpError> {
        let leaked = {
            let mut state = self.lock();
            if !state.initialized {
                drop(state);
                return Err(self.fail("shutdown", SrtpError::InitFail));
            }
            state.initialized = false;
            state.generation += 1;
            std::mem::take(&mut state.live_sessions)
        };
        if leaked > 0 {
            self.log(
                LogLevel::Warning,
                &format!("srtp: shutdown with {} live session(s)", leaked),
            );
        }
        self.log(LogLevel::Info, "srtp: crypto kernel shut down");
        Ok(())
    }

    fn create_session(&self, policy: &CryptoPolicy) -> Result<NativeSession, SrtpError> {
        let generation = {
            let state = self.lock();
            if !state.initialized {
                drop(state);
                return Err(self.fail("create", SrtpError::InitFail));
            }
            state.generation
        };

        if policy.ekt.is_some() {
            return Err(self.fail("create: EKT is not supported", SrtpError::NoSuchOp));
        }
        if !policy.key_len_matches() {
            self.log(
                LogLevel::Error,
                &format!(
                    "srtp: create: key is {} bytes, {} requires {}",
                    policy.key.len(),
                    policy.rtp.name(),
                    policy.rtp.key_material_len()
                ),
            );
            return Err(SrtpError::BadParam);
        }
        let window_size = policy.effective_window_size();
        if !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&window_size) {
            return Err(self.fail("create: bad replay window size", SrtpError::BadParam));
        }

        let template = StreamTemplate {
            rtp_keys: kdf::derive_session_keys(&policy.key, KeyUsage::Rtp)?,
            rtcp_keys: kdf::derive_session_keys(&policy.key, KeyUsage::Rtcp)?,
            window_size,
        };
        let mut streams = HashMap::new();
        if let SsrcScope::Specific(ssrc) = policy.ssrc {
            streams.insert(ssrc, template.instantiate());
        }

        self.lock().live_sessions += 1;
        self.log(
            LogLevel::Debug,
            &format!("srtp: created session ({}, {:?})", policy.rtp.name(), policy.ssrc),
        );

        Ok(NativeSession {
            policy: policy.clone(),
            generation,
            template,
            streams,
        })
    }

    fn protect(
        &self,
        session: &mut NativeSession,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize, SrtpError> {
        self.ensure_live(session)?;
        if len > buf.len() {
            return Err(self.fail("protect", SrtpError::BadParam));
        }
        let header_len = rtp::full_header_len(&buf[..len])
            .ok_or_else(|| self.fail("protect", SrtpError::ParseError))?;
        let tag_len = session.policy.rtp.auth_tag_len();
        if buf.len() < len + tag_len {
            return Err(self.fail("protect: no room for auth tag", SrtpError::BadParam));
        }

        let ssrc = rtp::ssrc(buf);
        let seq = rtp::sequence_number(buf);
        let allow_repeat_tx = session.policy.allow_repeat_tx;
        let stream = session
            .stream_for(ssrc, Direction::Outbound)
            .map_err(|e| self.fail("protect", e))?;

        let index = stream.rtp_window.estimate_index(seq);
        match stream.rtp_window.check(index) {
            Ok(()) => {}
            Err(SrtpError::ReplayFail) if allow_repeat_tx => {}
            Err(e) => return Err(self.fail("protect", e)),
        }
        stream.rtp_window.add(index);

        let keys = &stream.rtp_keys;
        let iv = kdf::build_iv(&keys.salt, ssrc, index);
        kdf::apply_keystream(&keys.cipher_key, &iv, &mut buf[header_len..len])?;

        // Auth tag over header || encrypted payload || ROC
        let roc = ((index >> 16) as u32).to_be_bytes();
        let tag = kdf::compute_auth_tag(&keys.auth_key, &[&buf[..len], &roc], tag_len)?;
        buf[len..len + tag_len].copy_from_slice(&tag);

        self.log(
            LogLevel::Debug,
            &format!("srtp: protected ssrc=0x{:08x} seq={} index={}", ssrc, seq, index),
        );
        Ok(len + tag_len)
    }

    fn unprotect(
        &self,
        session: &mut NativeSession,
        buf: &mut [u8],
        len: usize,
    ) -> Result<usize, SrtpError> {
        self.ensure_live(session)?;
        if len > buf.len() {
            return Err(self.fail("unprotect", SrtpError::BadParam));
        }
        let tag_len = session.policy.rtp.auth_tag_len();
        if len < rtp::RTP_HEADER_SIZE + tag_len {
            return Err(self.fail("unprotect", SrtpError::ParseError));
        }
        let tag_start = len - tag_len;
        let header_len = rtp::full_header_len(&buf[..tag_start])
            .ok_or_else(|| self.fail("unprotect", SrtpError::ParseError))?;

        let ssrc = rtp::ssrc(buf);
        let seq = rtp::sequence_number(buf);
        let stream = session
            .stream_for(ssrc, Direction::Inbound)
            .map_err(|e| self.fail("unprotect", e))?;

        let index = stream.rtp_window.estimate_index(seq);
        stream
            .rtp_window
            .check(index)
            .map_err(|e| self.fail("unprotect", e))?;

        let keys = &stream.rtp_keys;
        let roc = ((index >> 16) as u32).to_be_bytes();
        kdf::verify_auth_tag(&keys.auth_key, &[&buf[..tag_start], &roc], &buf[tag_start..len])
            .map_err(|e| self.fail("unprotect", e))?;

        let iv = kdf::build_iv(&keys.salt, ssrc, index);
        kdf::apply_keystream(&keys.cipher_key, &iv, &mut buf[header_len..tag_start])?;
        stream.rtp_window.add(index);

        self.log(
            LogLevel::Debug,
            &format!("srtp: unprotected ssrc=0x{:08x} seq={} index={}", ssrc, seq, index),
        );
        Ok(tag_start)
    }

    fn destroy_session(&self, session: NativeSession) -> Result<(), SrtpError> {
        {
            let mut state = self.lock();
            if !state.initialized || state.generation != session.generation {
                drop(state);
                return Err(self.fail("dealloc: session outlived engine", SrtpError::DeallocFail));
            }
            state.live_sessions = state.live_sessions.saturating_sub(1);
        }
        self.log(
            LogLevel::Debug,
            &format!("srtp: destroyed session with {} stream(s)", session.stream_count()),
        );
        Ok(())
    }
}
