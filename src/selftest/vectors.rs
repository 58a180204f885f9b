//! Reference vectors the round trip is checked against.

use crate::srtp::CryptoSuite;

/// A known plaintext/ciphertext pair under a fixed key and stream.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceVector {
    pub name: &'static str,
    pub suite: CryptoSuite,
    /// Master key followed by master salt.
    pub key: &'static [u8],
    pub ssrc: u32,
    /// RTP header + payload.
    pub plaintext: &'static [u8],
    /// `plaintext` after protection, auth tag included.
    pub ciphertext: &'static [u8],
}

impl ReferenceVector {
    /// Plaintext copied into a buffer sized for the protected packet.
    pub fn working_buffer(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.ciphertext.len()];
        buf[..self.plaintext.len()].copy_from_slice(self.plaintext);
        buf
    }

    /// Bytes protection adds to the plaintext.
    pub fn auth_tag_len(&self) -> usize {
        self.suite.auth_tag_len()
    }
}

const AES_256_TEST_KEY: [u8; 46] = [
    0xf0, 0xf0, 0x49, 0x14, 0xb5, 0x13, 0xf2, 0x76, 0x3a, 0x1b, 0x1f, 0xa1, 0x30, 0xf1, 0x0e, 0x29,
    0x98, 0xf6, 0xf6, 0xe4, 0x3e, 0x43, 0x09, 0xd1, 0xe6, 0x22, 0xa0, 0xe3, 0x32, 0xb9, 0xf1, 0xb6,
    // salt
    0x3b, 0x04, 0x80, 0x3d, 0xe5, 0x1e, 0xe7, 0xc9, 0x64, 0x23, 0xab, 0x5b, 0x78, 0xd2,
];

const SRTP_PLAINTEXT: [u8; 28] = [
    0x80, 0x0f, 0x12, 0x34, 0xde, 0xca, 0xfb, 0xad, 0xca, 0xfe, 0xba, 0xbe, 0xab, 0xab, 0xab, 0xab,
    0xab, 0xab, 0xab, 0xab, 0xab, 0xab, 0xab, 0xab, 0xab, 0xab, 0xab, 0xab,
];

const SRTP_AES_256_CIPHERTEXT: [u8; 38] = [
    0x80, 0x0f, 0x12, 0x34, 0xde, 0xca, 0xfb, 0xad, 0xca, 0xfe, 0xba, 0xbe, 0xf1, 0xd9, 0xde, 0x17,
    0xff, 0x25, 0x1f, 0xf1, 0xaa, 0x00, 0x77, 0x74, 0xb0, 0xb4, 0xb4, 0x0d, 0xa0, 0x8d, 0x9d, 0x9a,
    0x5b, 0x3a, 0x55, 0xd8, 0x87, 0x3b,
];

/// AES-256-CM / HMAC-SHA1-80 reference packet on SSRC 0xcafebabe.
pub const AES_256_REFERENCE: ReferenceVector = ReferenceVector {
    name: "Cisco SRTP AES-256 Reference Packet Validation Test.",
    suite: CryptoSuite::AesCm256HmacSha1_80,
    key: &AES_256_TEST_KEY,
    ssrc: 0xcafebabe,
    plaintext: &SRTP_PLAINTEXT,
    ciphertext: &SRTP_AES_256_CIPHERTEXT,
};
