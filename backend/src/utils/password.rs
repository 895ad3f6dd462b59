//! Password hashing with bcrypt.
//!
//! Every hash embeds its own random salt, so hashing the same plaintext twice
//! yields two different strings that both verify.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! refused instead of silently truncated.

use crate::errors::PasswordError;
use bcrypt::{non_truncating_hash, non_truncating_verify};

/// Longest password bcrypt can hash without truncation, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// bcrypt hasher with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Creates a hasher with the given bcrypt cost (4..=31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password before storing it.
    ///
    /// # Errors
    /// Returns `PasswordError::Hashing` if bcrypt rejects the cost or the
    /// password is longer than [`MAX_PASSWORD_BYTES`]
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(non_truncating_hash(password, self.cost)?)
    }

    /// Checks `password` against a stored hash.
    ///
    /// A malformed hash or an over-long password is reported as a mismatch
    /// rather than an error.
    pub fn verify(&self, password_hash: &str, password: &str) -> bool {
        match non_truncating_verify(password, password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!("Password verification failed: {}", e);
                false
            }
        }
    }
}
