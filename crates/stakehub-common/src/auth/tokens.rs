//! Random identifiers and token digests

use rand::Rng;
use sha2::{Digest, Sha256};

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill(buf.as_mut_slice());
    hex::encode(buf)
}

/// 256-bit random token, hex encoded (verification links and the like)
pub fn generate_random_token() -> String {
    random_hex(32)
}

/// 256-bit random session identifier, hex encoded
pub fn generate_session_id() -> String {
    random_hex(32)
}

/// SHA-256 of a bearer token, hex encoded. This is what sessions store.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cosmetic referral code: first three letters of the username followed
/// by six random hex characters, uppercased. Not collision safe.
pub fn generate_referral_code(username: &str) -> String {
    let prefix: String = username.chars().filter(|c| c.is_alphabetic()).take(3).collect();
    format!("{prefix}{}", random_hex(3)).to_uppercase()
}
