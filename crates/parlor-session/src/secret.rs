//! Player secrets: generation, digesting, verification.
//!
//! A player's key is their only proof of identity across reconnects, so it
//! gets the full treatment: 32 bytes of entropy at issue time, only the
//! SHA-256 digest in the store, and a constant-time comparison at check
//! time so the comparison itself leaks nothing about the stored hash.

use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Bytes of entropy in a freshly issued key.
const KEY_BYTES: usize = 32;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Issues a new player key: 32 random bytes as 64 hex characters.
pub fn generate_key() -> String {
    let bytes: [u8; KEY_BYTES] = rand::rng().random();
    hex(&bytes)
}

/// The digest of a key, as stored in a player document.
pub fn digest_key(key: &str) -> String {
    hex(Sha256::digest(key.as_bytes()).as_slice())
}

/// Whether `key` digests to `hashed_key`.
pub fn verify_key(key: &str, hashed_key: &str) -> bool {
    digest_key(key)
        .as_bytes()
        .ct_eq(hashed_key.as_bytes())
        .into()
}
