//! Password hashing.
//!
//! The UTF-8 password is first reduced to its 32-byte SHA-256 digest and the
//! digest is what bcrypt sees. This sidesteps bcrypt's 72-byte input limit,
//! so long passwords that share a prefix still hash differently.

use sha2::{Digest, Sha256};

fn digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

/// Hash a password with a fresh random salt.
///
/// Blocking: call from `spawn_blocking`.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(digest(password), cost)
}

/// Check a password against a stored hash. A malformed stored hash counts
/// as a mismatch.
///
/// Blocking: call from `spawn_blocking`.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(digest(password), stored_hash).unwrap_or(false)
}
