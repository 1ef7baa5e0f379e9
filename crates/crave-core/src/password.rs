// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing.
//!
//! Argon2id with the crate defaults, PHC-string encoded. Verification failure
//! and malformed stored hashes are collapsed into a boolean mismatch so the
//! login path cannot leak which of the two happened.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use thiserror::Error;

/// Failure to produce a password hash.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The hashing primitive rejected the input.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hashes a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string.
///
/// Returns `false` for wrong passwords and for unparseable stored hashes
/// alike; the caller only learns "not a match".
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
            false
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("kimchi-fried-rice").unwrap();
        assert!(verify_password("kimchi-fried-rice", &hash));
        assert!(!verify_password("bulgogi", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_hash_is_mismatch() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
