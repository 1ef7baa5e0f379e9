// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built users, configurations and codecs for consistent testing.

use std::sync::Arc;

use crave_api::{ApiConfig, TokenCodec, TokenConfig};
use crave_core::{hash_password, InMemoryUserDirectory, Role, UserRecord};

/// Signing secret shared by all fixtures.
pub const TEST_SECRET: &str = "test-secret-key-for-signing-must-be-at-least-32-chars";

/// Password shared by all fixture users.
pub const TEST_PASSWORD: &str = "japchae-deluxe";

// =============================================================================
// User Fixtures
// =============================================================================

/// Fixture providing one user per role.
pub struct UserFixtures;

impl UserFixtures {
    /// A restaurant owner, id 7.
    pub fn owner() -> UserRecord {
        Self::user(7, "owner@crave.io", Role::Owner)
    }

    /// A client, id 3.
    pub fn client() -> UserRecord {
        Self::user(3, "client@crave.io", Role::Client)
    }

    /// A delivery rider, id 11.
    pub fn delivery() -> UserRecord {
        Self::user(11, "delivery@crave.io", Role::Delivery)
    }

    /// All three fixture users.
    pub fn all() -> Vec<UserRecord> {
        vec![Self::owner(), Self::client(), Self::delivery()]
    }

    fn user(id: i64, email: &str, role: Role) -> UserRecord {
        UserRecord::new(
            id,
            email,
            role,
            hash_password(TEST_PASSWORD).expect("fixture password hashes"),
        )
        .verified()
    }
}

// =============================================================================
// Config & Codec Fixtures
// =============================================================================

/// A token configuration with the fixture secret and default TTLs.
pub fn test_token_config() -> TokenConfig {
    TokenConfig::new(TEST_SECRET)
}

/// A token configuration whose access tokens are already expired.
pub fn expired_token_config() -> TokenConfig {
    TokenConfig {
        access_ttl_secs: -3600, // Past the verification leeway.
        ..TokenConfig::new(TEST_SECRET)
    }
}

/// A codec over the fixture secret.
pub fn test_codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(test_token_config()).expect("fixture codec builds"))
}

/// An API configuration with the fixture token config.
pub fn test_api_config() -> ApiConfig {
    ApiConfig::default().with_token(test_token_config())
}

/// A directory seeded with the three fixture users.
pub fn seeded_directory() -> Arc<InMemoryUserDirectory> {
    Arc::new(InMemoryUserDirectory::with_users(UserFixtures::all()))
}
