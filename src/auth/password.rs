//! Password Hashing
//! Mission: One-way salted bcrypt digests and tolerant verification

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash with a fresh random salt; the same input never yields the same digest twice.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        hash(plaintext, self.cost).context("Failed to hash password")
    }

    /// A malformed digest counts as a mismatch.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match verify(plaintext, digest) {
            Ok(valid) => valid,
            Err(e) => {
                debug!("Rejecting unparseable password digest: {}", e);
                false
            }
        }
    }
}
