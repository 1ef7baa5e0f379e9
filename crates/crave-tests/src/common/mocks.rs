// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! A configurable `UserDirectory` mock for testing the auth core in
//! isolation.
//!
//! ## Design Principles
//!
//! - Configurable behavior for different test scenarios
//! - Recording of interactions for verification
//! - Thread-safe for concurrent testing
//! - Easy to set up error injection

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crave_core::{DirectoryError, DirectoryResult, UserDirectory, UserId, UserRecord};

// =============================================================================
// Mock User Directory
// =============================================================================

/// A user directory mock with error injection and call recording.
#[derive(Debug, Default)]
pub struct MockUserDirectory {
    /// Stored records keyed by id.
    users: Arc<RwLock<HashMap<UserId, UserRecord>>>,

    /// Force the next lookup to fail.
    fail_next_lookup: AtomicBool,

    /// Force all lookups to fail.
    fail_all_lookups: AtomicBool,

    /// Force all writes to fail.
    fail_all_writes: AtomicBool,

    /// Lookup count for verification.
    lookup_count: AtomicU64,

    /// Write count for verification.
    write_count: AtomicU64,
}

impl MockUserDirectory {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock seeded with the given records.
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let map = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Arc::new(RwLock::new(map)),
            ..Self::default()
        }
    }

    /// Forces the next lookup to fail with an unavailable error.
    pub fn fail_next_lookup(&self) {
        self.fail_next_lookup.store(true, Ordering::SeqCst);
    }

    /// Forces every lookup to fail until cleared.
    pub fn set_fail_all_lookups(&self, fail: bool) {
        self.fail_all_lookups.store(fail, Ordering::SeqCst);
    }

    /// Forces every write to fail until cleared.
    pub fn set_fail_all_writes(&self, fail: bool) {
        self.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of lookups performed.
    pub fn lookup_count(&self) -> u64 {
        self.lookup_count.load(Ordering::SeqCst)
    }

    /// Number of refresh-token writes performed.
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Returns the stored refresh token for a user.
    pub fn stored_refresh_token(&self, id: UserId) -> Option<String> {
        self.users
            .read()
            .get(&id)
            .and_then(|u| u.refresh_token.clone())
    }

    fn check_lookup_failure(&self) -> DirectoryResult<()> {
        if self.fail_next_lookup.swap(false, Ordering::SeqCst)
            || self.fail_all_lookups.load(Ordering::SeqCst)
        {
            return Err(DirectoryError::unavailable("injected lookup failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn lookup_by_id(&self, id: UserId) -> DirectoryResult<Option<UserRecord>> {
        self.lookup_count.fetch_add(1, Ordering::SeqCst);
        self.check_lookup_failure()?;
        Ok(self.users.read().get(&id).cloned())
    }

    async fn lookup_by_email(&self, email: &str) -> DirectoryResult<Option<UserRecord>> {
        self.lookup_count.fetch_add(1, Ordering::SeqCst);
        self.check_lookup_failure()?;
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn store_refresh_token(&self, id: UserId, token: Option<String>) -> DirectoryResult<()> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_all_writes.load(Ordering::SeqCst) {
            return Err(DirectoryError::unavailable("injected write failure"));
        }
        if let Some(user) = self.users.write().get_mut(&id) {
            user.refresh_token = token;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crave_core::Role;

    fn sample_user() -> UserRecord {
        UserRecord::new(1, "user@crave.io", Role::Client, "hash")
    }

    #[tokio::test]
    async fn test_mock_records_interactions() {
        let mock = MockUserDirectory::with_users([sample_user()]);

        mock.lookup_by_id(1).await.unwrap();
        mock.lookup_by_email("user@crave.io").await.unwrap();
        mock.store_refresh_token(1, Some("R-1".into())).await.unwrap();

        assert_eq!(mock.lookup_count(), 2);
        assert_eq!(mock.write_count(), 1);
        assert_eq!(mock.stored_refresh_token(1).as_deref(), Some("R-1"));
    }

    #[tokio::test]
    async fn test_fail_next_lookup_is_one_shot() {
        let mock = MockUserDirectory::with_users([sample_user()]);

        mock.fail_next_lookup();
        assert!(mock.lookup_by_id(1).await.is_err());
        assert!(mock.lookup_by_id(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_all_lookups_until_cleared() {
        let mock = MockUserDirectory::with_users([sample_user()]);

        mock.set_fail_all_lookups(true);
        assert!(mock.lookup_by_id(1).await.is_err());
        assert!(mock.lookup_by_email("user@crave.io").await.is_err());

        mock.set_fail_all_lookups(false);
        assert!(mock.lookup_by_id(1).await.is_ok());
    }
}
