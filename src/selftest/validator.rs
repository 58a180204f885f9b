//! Round-trip validation: protect the reference plaintext on a sender
//! session, unprotect the reference ciphertext on a fresh receiver session,
//! and compare both against the literal vectors.

use super::error::Stage;
use super::session::{Role, ScopedSession};
use super::vectors::ReferenceVector;
use super::{SelfTestError, APP_TAG};
use crate::srtp::{CryptoPolicy, SrtpEngine};

const PROTECT_OP: &str = "srtp_protect";
const UNPROTECT_OP: &str = "srtp_unprotect";

/// Run the full chain. The first failure ends it; sessions created so far
/// are destroyed on the way out (receiver first, then sender).
pub fn run<E: SrtpEngine>(
    engine: &E,
    policy: &CryptoPolicy,
    vector: &ReferenceVector,
) -> Result<(), SelfTestError> {
    tracing::info!(target: APP_TAG, "{}", vector.name);

    let mut sender = ScopedSession::create(engine, policy, Role::Send)?;
    protect_step(&mut sender, vector)?;

    let mut receiver = ScopedSession::create(engine, policy, Role::Recv)?;
    unprotect_step(&mut receiver, vector)?;

    Ok(())
}

/// Protect the plaintext in a buffer with room for the tag. Status and
/// length are checked independently of each other.
pub fn protect_step<E: SrtpEngine>(
    sender: &mut ScopedSession<'_, E>,
    vector: &ReferenceVector,
) -> Result<(), SelfTestError> {
    let mut buf = vector.working_buffer();
    let plain_len = vector.plaintext.len();

    let len = sender
        .protect(&mut buf, plain_len)
        .map_err(|source| SelfTestError::CryptoOperation {
            op: PROTECT_OP,
            source,
        })?;

    let expected = plain_len + vector.auth_tag_len();
    if len != expected {
        return Err(SelfTestError::UnexpectedLength {
            op: PROTECT_OP,
            expected,
            actual: len,
        });
    }

    if buf[..len] != *vector.ciphertext {
        return Err(SelfTestError::Mismatch {
            stage: Stage::Protect,
        });
    }

    tracing::debug!(target: APP_TAG, "protect matched reference ciphertext ({} bytes)", len);
    Ok(())
}

/// Unprotect the literal ciphertext; any non-ok status is a failure.
pub fn unprotect_step<E: SrtpEngine>(
    receiver: &mut ScopedSession<'_, E>,
    vector: &ReferenceVector,
) -> Result<(), SelfTestError> {
    let mut buf = vector.ciphertext.to_vec();
    let cipher_len = buf.len();

    let len = receiver
        .unprotect(&mut buf, cipher_len)
        .map_err(|source| SelfTestError::CryptoOperation {
            op: UNPROTECT_OP,
            source,
        })?;

    if buf.get(..len) != Some(vector.plaintext) {
        return Err(SelfTestError::Mismatch {
            stage: Stage::Unprotect,
        });
    }

    tracing::debug!(target: APP_TAG, "unprotect matched reference plaintext ({} bytes)", len);
    Ok(())
}
