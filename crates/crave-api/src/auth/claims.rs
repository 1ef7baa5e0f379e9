// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crave_core::UserId;

/// Claims embedded in both access and refresh tokens.
///
/// Both token kinds carry the user id, so the refresh path never has to read
/// a stale access token to figure out whose stored refresh token to compare
/// against. Validity is the only thing that differs between the two kinds,
/// and it lives in `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the numeric user id.
    pub sub: UserId,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
    /// Token id, unique per issued token.
    pub jti: String,
}

impl Claims {
    /// Creates claims for a user, expiring `expires_in_secs` from now.
    pub fn new(user_id: UserId, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            iat: now,
            exp: now + expires_in_secs,
            jti: Uuid::now_v7().to_string(),
        }
    }

    /// Returns the user id.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns `true` if the claims are past their expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Expiration as a DateTime, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, 3600);
        assert_eq!(claims.user_id(), 7);
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_claims() {
        let claims = Claims::new(7, -120);
        assert!(claims.is_expired());
    }

    #[test]
    fn test_jti_unique_per_token() {
        let a = Claims::new(1, 60);
        let b = Claims::new(1, 60);
        assert_ne!(a.jti, b.jti);
    }
}
