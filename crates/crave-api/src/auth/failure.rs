// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The auth failure taxonomy.

use thiserror::Error;

/// Why a credential or an authorization check did not pass.
///
/// Every failure in the auth subsystem is resolved to one of these kinds and
/// then to a local allow/deny or attached/unattached decision. None of them
/// propagate to the transport layer as a fault; the distinction between kinds
/// exists so callers can pick different recoveries (a `RefreshMismatch`
/// means "re-login", an `Expired` access token means "try the refresh path").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// The token could not be parsed at all.
    #[error("token is malformed")]
    Malformed,

    /// The token parsed but its signature does not match the configured secret.
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// The token is structurally valid but past its validity window.
    #[error("token has expired")]
    Expired,

    /// The refresh token verifies cryptographically but is not the value
    /// currently stored for the user: it was superseded by a later login or
    /// rotation.
    #[error("refresh token does not match the stored session")]
    RefreshMismatch,

    /// The token verifies but references a user that no longer resolves.
    #[error("token subject no longer exists")]
    IdentityNotFound,

    /// The user directory could not answer the lookup.
    #[error("user directory unavailable")]
    DirectoryUnavailable,

    /// Identity resolved, but its role is not in the operation's allow-list.
    #[error("role is not permitted for this operation")]
    RoleDenied,
}

impl AuthFailure {
    /// Maps a `jsonwebtoken` verification error to the taxonomy.
    pub(crate) fn from_jwt(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthFailure::Expired,
            ErrorKind::InvalidSignature => AuthFailure::SignatureInvalid,
            _ => AuthFailure::Malformed,
        }
    }

    /// Returns `true` for failures where the caller holds no usable identity
    /// at all (as opposed to holding one with an insufficient role).
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, AuthFailure::RoleDenied)
    }

    /// Stable machine-readable code for this failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::Malformed => "TOKEN_MALFORMED",
            AuthFailure::SignatureInvalid => "TOKEN_SIGNATURE_INVALID",
            AuthFailure::Expired => "TOKEN_EXPIRED",
            AuthFailure::RefreshMismatch => "REFRESH_MISMATCH",
            AuthFailure::IdentityNotFound => "IDENTITY_NOT_FOUND",
            AuthFailure::DirectoryUnavailable => "DIRECTORY_UNAVAILABLE",
            AuthFailure::RoleDenied => "ROLE_DENIED",
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
    fn test_role_denied_is_authenticated() {
        assert!(!AuthFailure::RoleDenied.is_unauthenticated());
        assert!(AuthFailure::Expired.is_unauthenticated());
        assert!(AuthFailure::RefreshMismatch.is_unauthenticated());
    }

    #[test]
    fn test_codes_are_distinct() {
        let all = [
            AuthFailure::Malformed,
            AuthFailure::SignatureInvalid,
            AuthFailure::Expired,
            AuthFailure::RefreshMismatch,
            AuthFailure::IdentityNotFound,
            AuthFailure::DirectoryUnavailable,
            AuthFailure::RoleDenied,
        ];
        let mut codes: Vec<_> = all.iter().map(|f| f.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
