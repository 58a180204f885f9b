//! Builds the crypto policy the round trip runs under.

use super::vectors::ReferenceVector;
use crate::srtp::{CryptoPolicy, CryptoSuite, SsrcScope};

/// Replay window configured on the policy. The round trip never replays a
/// packet on one session, so this is configured but not exercised.
pub const REPLAY_WINDOW_SIZE: usize = 128;

/// One suite for both RTP and RTCP, scoped to a single stream, no EKT,
/// no reuse of sent sequence numbers.
pub fn build_policy(suite: CryptoSuite, key: &[u8], ssrc: u32) -> CryptoPolicy {
    CryptoPolicy {
        rtp: suite,
        rtcp: suite,
        ssrc: SsrcScope::Specific(ssrc),
        key: key.to_vec(),
        ekt: None,
        window_size: REPLAY_WINDOW_SIZE,
        allow_repeat_tx: false,
    }
}

/// Policy matching a reference vector's suite, key and stream.
pub fn reference_policy(vector: &ReferenceVector) -> CryptoPolicy {
    build_policy(vector.suite, vector.key, vector.ssrc)
}
