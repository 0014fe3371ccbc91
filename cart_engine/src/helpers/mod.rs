//! Identifier generation.
use rand::{thread_rng, RngCore};

use crate::db_types::{OrderToken, SessionId};

/// Returns `n` random bytes, hex-encoded.
pub fn random_hex(n: usize) -> String {
    let mut bytes = vec![0u8; n];
    thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A fresh order token (20 hex characters).
pub fn new_order_token() -> OrderToken {
    OrderToken(random_hex(10))
}

/// A fresh session key (32 hex characters).
pub fn new_session_id() -> SessionId {
    SessionId(random_hex(16))
}
