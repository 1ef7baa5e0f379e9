// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access/refresh token signing and verification.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crave_core::{UserDirectory, UserId};

use super::claims::Claims;
use super::failure::AuthFailure;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// TokenConfig
// =============================================================================

/// Token signing configuration.
///
/// Constructed once at process start and threaded into the codec; nothing in
/// the auth subsystem reads configuration after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Access token validity in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token validity in seconds.
    pub refresh_ttl_secs: i64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            access_ttl_secs: 86400,             // 1 day
            refresh_ttl_secs: 86400 * 14,       // 14 days
            leeway_secs: 60,
        }
    }
}

impl TokenConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the access token validity.
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl_secs = ttl.as_secs() as i64;
        self
    }

    /// Sets the refresh token validity.
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl_secs = ttl.as_secs() as i64;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::internal("token secret is not configured"));
        }
        if self.secret.len() < 32 {
            tracing::warn!("token secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

// =============================================================================
// TokenCodec
// =============================================================================

/// Stateless signer/verifier for the access/refresh token pair.
///
/// HS256 over a shared secret. The codec holds nothing but the derived keys;
/// the refresh store-match check borrows the user directory per call instead
/// of owning it, so signature validity and store matching stay separable.
#[derive(Clone)]
pub struct TokenCodec {
    config: Arc<TokenConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenCodec {
    /// Creates a codec from the given configuration.
    pub fn new(config: TokenConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs an access token for a user.
    pub fn sign_access(&self, user_id: UserId) -> ApiResult<String> {
        self.sign(&Claims::new(user_id, self.config.access_ttl_secs))
    }

    /// Issues a refresh token for a user.
    ///
    /// The caller is responsible for persisting the returned value on the
    /// user record; only the stored value verifies afterwards.
    pub fn issue_refresh(&self, user_id: UserId) -> ApiResult<String> {
        self.sign(&Claims::new(user_id, self.config.refresh_ttl_secs))
    }

    fn sign(&self, claims: &Claims) -> ApiResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("failed to sign token: {}", e)))
    }

    /// Verifies a token's signature, structure, and expiry.
    ///
    /// Every verification failure comes back as a tagged [`AuthFailure`];
    /// nothing escapes this boundary as a fault.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthFailure> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthFailure::from_jwt(&e))
    }

    /// Verifies a refresh token against the stored session value.
    ///
    /// On top of signature/expiry, the presented token must equal, byte for
    /// byte, the refresh token currently stored for `expected_user_id`. A
    /// superseded-but-valid token yields [`AuthFailure::RefreshMismatch`],
    /// which is the signal that the user rotated sessions elsewhere and must
    /// re-authenticate.
    pub async fn verify_refresh(
        &self,
        token: &str,
        expected_user_id: UserId,
        directory: &dyn UserDirectory,
    ) -> Result<Claims, AuthFailure> {
        let claims = self.verify(token)?;

        let user = directory
            .lookup_by_id(expected_user_id)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, user_id = expected_user_id, "directory lookup failed during refresh verification");
                AuthFailure::DirectoryUnavailable
            })?
            .ok_or(AuthFailure::IdentityNotFound)?;

        match user.refresh_token.as_deref() {
            Some(stored) if stored == token => Ok(claims),
            _ => Err(AuthFailure::RefreshMismatch),
        }
    }

    /// Returns the access token validity in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl_secs
    }

    /// Returns the refresh token validity in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.config.refresh_ttl_secs
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .field("refresh_ttl_secs", &self.config.refresh_ttl_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
