//! Crypto policy types consumed by `SrtpEngine::create_session`.

/// Master salt length for every AES-CM suite (RFC 3711).
pub const MASTER_SALT_LEN: usize = 14;

/// Session authentication key length for HMAC-SHA1 (160 bits).
pub const AUTH_KEY_LEN: usize = 20;

/// Default replay window size when a policy leaves it at 0.
pub const DEFAULT_WINDOW_SIZE: usize = 128;

/// Cipher suite applied to one sub-stream (RTP or RTCP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoSuite {
    #[allow(dead_code)]
    AesCm128HmacSha1_80,
    #[allow(dead_code)]
    AesCm128HmacSha1_32,
    AesCm256HmacSha1_80,
    #[allow(dead_code)]
    AesCm256HmacSha1_32,
}

impl CryptoSuite {
    /// Master (and session) cipher key length.
    pub fn cipher_key_len(self) -> usize {
        match self {
            Self::AesCm128HmacSha1_80 | Self::AesCm128HmacSha1_32 => 16,
            Self::AesCm256HmacSha1_80 | Self::AesCm256HmacSha1_32 => 32,
        }
    }

    /// Required length of the policy key: master key followed by master salt.
    pub fn key_material_len(self) -> usize {
        self.cipher_key_len() + MASTER_SALT_LEN
    }

    /// Authentication tag appended by protect.
    pub fn auth_tag_len(self) -> usize {
        match self {
            Self::AesCm128HmacSha1_80 | Self::AesCm256HmacSha1_80 => 10,
            Self::AesCm128HmacSha1_32 | Self::AesCm256HmacSha1_32 => 4,
        }
    }

    /// SDP name of the suite (RFC 4568 / RFC 6188).
    pub fn name(self) -> &'static str {
        match self {
            Self::AesCm128HmacSha1_80 => "AES_CM_128_HMAC_SHA1_80",
            Self::AesCm128HmacSha1_32 => "AES_CM_128_HMAC_SHA1_32",
            Self::AesCm256HmacSha1_80 => "AES_256_CM_HMAC_SHA1_80",
            Self::AesCm256HmacSha1_32 => "AES_256_CM_HMAC_SHA1_32",
        }
    }
}

/// Which streams a session applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsrcScope {
    /// Exactly one stream.
    Specific(u32),
    /// Any stream seen on protect.
    #[allow(dead_code)]
    AnyOutbound,
    /// Any stream seen on unprotect.
    #[allow(dead_code)]
    AnyInbound,
}

/// Encrypted key transport parameters. No engine here implements EKT; a
/// policy carrying one is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct EktPolicy {
    pub spi: u16,
    pub key: Vec<u8>,
}

/// Immutable configuration a session is created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoPolicy {
    pub rtp: CryptoSuite,
    pub rtcp: CryptoSuite,
    pub ssrc: SsrcScope,
    /// Master key followed by master salt.
    pub key: Vec<u8>,
    pub ekt: Option<EktPolicy>,
    /// Trailing sequence indices tracked for anti-replay (0 = default).
    pub window_size: usize,
    /// Whether protect may reuse a sequence index already sent.
    pub allow_repeat_tx: bool,
}

impl CryptoPolicy {
    /// Window size with the 0 = default convention resolved.
    pub fn effective_window_size(&self) -> usize {
        if self.window_size == 0 {
            DEFAULT_WINDOW_SIZE
        } else {
            self.window_size
        }
    }

    /// Whether the key length satisfies both sub-stream suites.
    pub fn key_len_matches(&self) -> bool {
        self.key.len() == self.rtp.key_material_len()
            && self.key.len() == self.rtcp.key_material_len()
    }
}
