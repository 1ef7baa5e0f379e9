// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The shared identity resolution algorithm.
//!
//! Both identity entry points, the credential middleware (header pair) and
//! the role gate (single token field), resolve tokens through this one type,
//! parameterized only by where the token came from. What differs between them
//! is how they *react* to a failure, not how they resolve.

use std::sync::Arc;

use crave_core::UserDirectory;

use super::codec::TokenCodec;
use super::context::Identity;
use super::failure::AuthFailure;

/// Resolves a presented token to an [`Identity`].
#[derive(Clone)]
pub struct IdentityResolver {
    codec: Arc<TokenCodec>,
    directory: Arc<dyn UserDirectory>,
}

impl IdentityResolver {
    /// Creates a resolver over the given codec and directory.
    pub fn new(codec: Arc<TokenCodec>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { codec, directory }
    }

    /// Resolves an access token: verify, then look the subject up.
    ///
    /// A token that verifies but whose subject no longer exists is invalid
    /// (`IdentityNotFound`); a directory fault is reported distinctly so the
    /// caller can apply its own open/closed policy.
    pub async fn resolve_access(&self, token: &str) -> Result<Identity, AuthFailure> {
        let claims = self.codec.verify(token)?;
        self.lookup_identity(claims.user_id()).await
    }

    /// Resolves a refresh token: verify, store-match, then look the subject up.
    pub async fn resolve_refresh(&self, token: &str) -> Result<Identity, AuthFailure> {
        // The refresh token carries its own subject, so no access-token
        // claims are needed to locate the stored session.
        let claims = self.codec.verify(token)?;
        self.codec
            .verify_refresh(token, claims.user_id(), self.directory.as_ref())
            .await?;
        self.lookup_identity(claims.user_id()).await
    }

    async fn lookup_identity(&self, user_id: crave_core::UserId) -> Result<Identity, AuthFailure> {
        let user = self
            .directory
            .lookup_by_id(user_id)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, user_id, "directory lookup failed during identity resolution");
                AuthFailure::DirectoryUnavailable
            })?
            .ok_or(AuthFailure::IdentityNotFound)?;

        Ok(Identity::from(&user))
    }

    /// Returns the codec backing this resolver.
    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// Returns the directory backing this resolver.
    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("codec", &self.codec)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenConfig;
    use crave_core::{InMemoryUserDirectory, Role, UserRecord};

    fn resolver_with(dir: InMemoryUserDirectory) -> IdentityResolver {
        let codec = Arc::new(
            TokenCodec::new(TokenConfig::new(
                "test-secret-key-that-is-long-enough-for-testing",
            ))
            .unwrap(),
        );
        IdentityResolver::new(codec, Arc::new(dir))
    }

    #[tokio::test]
    async fn test_resolve_access() {
        let dir = InMemoryUserDirectory::with_users([UserRecord::new(
            7,
            "owner@crave.io",
            Role::Owner,
            "hash",
        )]);
        let resolver = resolver_with(dir);

        let token = resolver.codec().sign_access(7).unwrap();
        let identity = resolver.resolve_access(&token).await.unwrap();

        assert_eq!(identity.id, 7);
        assert_eq!(identity.role, Role::Owner);
    }

    #[tokio::test]
    async fn test_resolve_access_deleted_user() {
        let resolver = resolver_with(InMemoryUserDirectory::new());

        // Cryptographically valid, but the subject is gone.
        let token = resolver.codec().sign_access(7).unwrap();
        assert_eq!(
            resolver.resolve_access(&token).await,
            Err(AuthFailure::IdentityNotFound)
        );
    }

    #[tokio::test]
    async fn test_resolve_refresh_requires_store_match() {
        let dir = InMemoryUserDirectory::with_users([UserRecord::new(
            7,
            "owner@crave.io",
            Role::Owner,
            "hash",
        )]);
        let resolver = resolver_with(dir);

        let token = resolver.codec().issue_refresh(7).unwrap();
        // Not stored yet: mismatch.
        assert_eq!(
            resolver.resolve_refresh(&token).await,
            Err(AuthFailure::RefreshMismatch)
        );

        resolver
            .directory()
            .store_refresh_token(7, Some(token.clone()))
            .await
            .unwrap();
        let identity = resolver.resolve_refresh(&token).await.unwrap();
        assert_eq!(identity.id, 7);
    }
}
