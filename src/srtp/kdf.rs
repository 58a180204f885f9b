//! AES-CM keystream and session key derivation (RFC 3711 §4.3, RFC 6188).

use aes::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::error::SrtpError;
use super::policy::{AUTH_KEY_LEN, MASTER_SALT_LEN};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;
type HmacSha1 = Hmac<Sha1>;

/// SRTP key derivation labels (RFC 3711, section 4.3.1).
const LABEL_CIPHER_KEY: u8 = 0x00;
const LABEL_AUTH_KEY: u8 = 0x01;
const LABEL_SALT: u8 = 0x02;

/// SRTCP key derivation labels (RFC 3711, section 3.4).
const LABEL_SRTCP_CIPHER_KEY: u8 = 0x03;
const LABEL_SRTCP_AUTH_KEY: u8 = 0x04;
const LABEL_SRTCP_SALT: u8 = 0x05;

/// Derived keys for one direction of one sub-stream.
#[derive(Clone)]
pub struct SessionKeys {
    pub cipher_key: Vec<u8>,
    pub auth_key: [u8; AUTH_KEY_LEN],
    pub salt: [u8; MASTER_SALT_LEN],
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("cipher_key_len", &self.cipher_key.len())
            .finish_non_exhaustive()
    }
}

/// Which sub-stream a key set is derived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    Rtp,
    Rtcp,
}

/// XOR the AES-CM keystream for `key`/`iv` into `buf`.
///
/// The key length selects AES-128 or AES-256.
pub fn apply_keystream(key: &[u8], iv: &[u8; 16], buf: &mut [u8]) -> Result<(), SrtpError> {
    match key.len() {
        16 => {
            let mut cipher =
                Aes128Ctr::new_from_slices(key, iv).map_err(|_| SrtpError::CipherFail)?;
            cipher.apply_keystream(buf);
        }
        32 => {
            let mut cipher =
                Aes256Ctr::new_from_slices(key, iv).map_err(|_| SrtpError::CipherFail)?;
            cipher.apply_keystream(buf);
        }
        _ => return Err(SrtpError::BadParam),
    }
    Ok(())
}

/// Derive the session keys for `usage` from `master_key || master_salt`.
pub fn derive_session_keys(key_material: &[u8], usage: KeyUsage) -> Result<SessionKeys, SrtpError> {
    if key_material.len() <= MASTER_SALT_LEN {
        return Err(SrtpError::BadParam);
    }
    let (master_key, salt_bytes) = key_material.split_at(key_material.len() - MASTER_SALT_LEN);
    let mut master_salt = [0u8; MASTER_SALT_LEN];
    master_salt.copy_from_slice(salt_bytes);

    let (cipher_label, auth_label, salt_label) = match usage {
        KeyUsage::Rtp => (LABEL_CIPHER_KEY, LABEL_AUTH_KEY, LABEL_SALT),
        KeyUsage::Rtcp => (
            LABEL_SRTCP_CIPHER_KEY,
            LABEL_SRTCP_AUTH_KEY,
            LABEL_SRTCP_SALT,
        ),
    };

    let mut cipher_key = vec![0u8; master_key.len()];
    prf_derive(master_key, &master_salt, cipher_label, &mut cipher_key)?;
    let mut auth_key = [0u8; AUTH_KEY_LEN];
    prf_derive(master_key, &master_salt, auth_label, &mut auth_key)?;
    let mut salt = [0u8; MASTER_SALT_LEN];
    prf_derive(master_key, &master_salt, salt_label, &mut salt)?;

    Ok(SessionKeys {
        cipher_key,
        auth_key,
        salt,
    })
}

/// PRF for key derivation: AES-CM with label and index=0 (RFC 3711, 4.3.1).
fn prf_derive(
    master_key: &[u8],
    master_salt: &[u8; MASTER_SALT_LEN],
    label: u8,
    output: &mut [u8],
) -> Result<(), SrtpError> {
    // x = label || r (r = 0 with key_derivation_rate 0), right-aligned in 14 bytes
    // IV = (master_salt XOR x) || 0x0000
    let mut iv = [0u8; 16];
    iv[..MASTER_SALT_LEN].copy_from_slice(master_salt);
    iv[7] ^= label;

    output.fill(0);
    apply_keystream(master_key, &iv, output)
}

/// Build the AES-CM IV (RFC 3711, 4.1.1).
///
/// IV = (session_salt << 16) XOR (SSRC << 64) XOR (index << 16), where
/// `index` is the 48-bit packet index for SRTP or the 31-bit SRTCP index.
pub fn build_iv(salt: &[u8; MASTER_SALT_LEN], ssrc: u32, index: u64) -> [u8; 16] {
    let mut iv = [0u8; 16];
    iv[4..8].copy_from_slice(&ssrc.to_be_bytes());
    // 48-bit index at bytes 8..14
    iv[8..14].copy_from_slice(&index.to_be_bytes()[2..]);
    for (b, s) in iv.iter_mut().zip(salt.iter()) {
        *b ^= s;
    }
    iv
}

/// HMAC-SHA1 over every part in order, truncated to `tag_len`.
pub fn compute_auth_tag(
    auth_key: &[u8; AUTH_KEY_LEN],
    parts: &[&[u8]],
    tag_len: usize,
) -> Result<Vec<u8>, SrtpError> {
    let result = keyed_mac(auth_key, parts)?.finalize().into_bytes();
    result
        .get(..tag_len)
        .map(<[u8]>::to_vec)
        .ok_or(SrtpError::BadParam)
}

/// Constant-time check of a truncated HMAC-SHA1 tag.
pub fn verify_auth_tag(
    auth_key: &[u8; AUTH_KEY_LEN],
    parts: &[&[u8]],
    tag: &[u8],
) -> Result<(), SrtpError> {
    keyed_mac(auth_key, parts)?
        .verify_truncated_left(tag)
        .map_err(|_| SrtpError::AuthFail)
}

fn keyed_mac(auth_key: &[u8; AUTH_KEY_LEN], parts: &[&[u8]]) -> Result<HmacSha1, SrtpError> {
    let mut mac = HmacSha1::new_from_slice(auth_key).map_err(|_| SrtpError::CipherFail)?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac)
}
