//! Password hashing utilities

use std::sync::OnceLock;

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::domain::InfraError;

const DUMMY_PASSWORD: &str = "identity-api-dummy-password";

/// bcrypt hasher with a configurable work factor
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Hash verified for unknown accounts, built at `cost` on first use so
    /// unknown emails take as long as wrong passwords.
    dummy_hash: OnceLock<String>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Hash a password using bcrypt
    pub fn hash(&self, password: &str) -> Result<String, InfraError> {
        Ok(hash(password, self.cost)?)
    }

    /// Verify a password against a hash
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool, InfraError> {
        Ok(verify(password, password_hash)?)
    }

    fn dummy_hash(&self) -> &str {
        // An invalid cost fails here exactly like it fails for real hashes.
        self.dummy_hash
            .get_or_init(|| hash(DUMMY_PASSWORD, self.cost).unwrap_or_default())
    }

    /// Burn one verification for an unknown account. The result is ignored.
    pub fn verify_dummy(&self, password: &str) {
        let _ = verify(password, self.dummy_hash());
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
