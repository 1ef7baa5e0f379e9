// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User record projection.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Numeric user identifier.
pub type UserId = i64;

/// The projection of a user record the auth core works with.
///
/// The full user entity (orders, restaurants, payment methods) lives in the
/// persistence layer; the auth core only needs identity, the credential
/// columns, and the currently stored refresh token. The refresh token column
/// is the single source of truth for rotation: whichever value was written
/// last (login or rotation) is the only refresh token that verifies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Numeric id.
    pub id: UserId,
    /// Login email, unique across the platform.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Argon2 PHC-string hash of the password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// The currently valid refresh token, if the user has an open session.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// Whether the account's email has been verified.
    pub verified: bool,
}

impl UserRecord {
    /// Creates a new record with no open session.
    pub fn new(id: UserId, email: impl Into<String>, role: Role, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            role,
            password_hash: password_hash.into(),
            refresh_token: None,
            verified: false,
        }
    }

    /// Marks the account as email-verified.
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Sets the stored refresh token.
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_session() {
        let user = UserRecord::new(1, "a@b.com", Role::Client, "$argon2id$...");
        assert!(user.refresh_token.is_none());
        assert!(!user.verified);
    }

    #[test]
    fn test_builder_helpers() {
        let user = UserRecord::new(7, "o@b.com", Role::Owner, "h")
            .verified()
            .with_refresh_token("R-abc");
        assert!(user.verified);
        assert_eq!(user.refresh_token.as_deref(), Some("R-abc"));
    }
}
