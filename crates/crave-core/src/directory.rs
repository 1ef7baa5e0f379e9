// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The user directory contract.
//!
//! The auth core never owns user storage; it looks users up through this
//! trait and triggers refresh-token overwrites through it. Anything that can
//! answer `lookup_by_id` and persist a refresh-token column can back it: the
//! production Postgres repository, or the in-memory map below.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use crate::user::{UserId, UserRecord};

/// Result type alias for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

// =============================================================================
// DirectoryError
// =============================================================================

/// Failure of the directory itself, as opposed to a lookup miss.
///
/// A missing user is `Ok(None)`, not an error: the credential middleware
/// and the role gate react to the two cases differently.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backing store could not be reached or answered abnormally.
    #[error("user directory unavailable: {message}")]
    Unavailable {
        /// Description of the underlying fault.
        message: String,
    },
}

impl DirectoryError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

// =============================================================================
// UserDirectory
// =============================================================================

/// Lookup and session-write contract required of the user store.
///
/// `store_refresh_token` is the write path behind login, rotation and logout.
/// The store serializes writes to the refresh-token column; when two
/// rotations race for the same user the last write wins and the loser's next
/// refresh attempt fails the store-match check. That is the designed
/// single-session invalidation mechanism, not a conflict to resolve.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks a user up by id. `Ok(None)` means the user does not exist.
    async fn lookup_by_id(&self, id: UserId) -> DirectoryResult<Option<UserRecord>>;

    /// Looks a user up by email. Used only by the login path.
    async fn lookup_by_email(&self, email: &str) -> DirectoryResult<Option<UserRecord>>;

    /// Overwrites the stored refresh token for a user.
    ///
    /// `None` clears the session (logout). Writing a token supersedes any
    /// previously stored one immediately.
    async fn store_refresh_token(&self, id: UserId, token: Option<String>) -> DirectoryResult<()>;
}

// =============================================================================
// InMemoryUserDirectory
// =============================================================================

/// Reference directory backed by a process-local map.
///
/// Used by tests and the demo binary. The map lock is never held across an
/// await point.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, UserRecord>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with the given records.
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let map = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Arc::new(RwLock::new(map)),
        }
    }

    /// Inserts or replaces a user record.
    pub fn insert(&self, user: UserRecord) {
        self.users.write().insert(user.id, user);
    }

    /// Removes a user record.
    pub fn remove(&self, id: UserId) -> Option<UserRecord> {
        self.users.write().remove(&id)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Returns `true` if the directory holds no records.
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn lookup_by_id(&self, id: UserId) -> DirectoryResult<Option<UserRecord>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn lookup_by_email(&self, email: &str) -> DirectoryResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn store_refresh_token(&self, id: UserId, token: Option<String>) -> DirectoryResult<()> {
        match self.users.write().get_mut(&id) {
            Some(user) => {
                user.refresh_token = token;
                Ok(())
            }
            // Overwriting a vanished user is a no-op; the next lookup will
            // report the miss to the caller.
            None => Ok(()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    fn sample_user(id: UserId) -> UserRecord {
        UserRecord::new(id, format!("user{id}@crave.io"), Role::Client, "hash")
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let dir = InMemoryUserDirectory::with_users([sample_user(1), sample_user(2)]);

        let found = dir.lookup_by_id(1).await.unwrap();
        assert_eq!(found.unwrap().id, 1);

        let missing = dir.lookup_by_id(99).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_lookup_by_email() {
        let dir = InMemoryUserDirectory::with_users([sample_user(1)]);

        let found = dir.lookup_by_email("user1@crave.io").await.unwrap();
        assert_eq!(found.unwrap().id, 1);

        assert!(dir.lookup_by_email("nobody@crave.io").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_refresh_token_overwrites() {
        let dir = InMemoryUserDirectory::with_users([sample_user(1)]);

        dir.store_refresh_token(1, Some("R-1".into())).await.unwrap();
        dir.store_refresh_token(1, Some("R-2".into())).await.unwrap();

        let user = dir.lookup_by_id(1).await.unwrap().unwrap();
        assert_eq!(user.refresh_token.as_deref(), Some("R-2"));
    }

    #[tokio::test]
    async fn test_clear_refresh_token() {
        let dir = InMemoryUserDirectory::with_users([sample_user(1).with_refresh_token("R-1")]);

        dir.store_refresh_token(1, None).await.unwrap();

        let user = dir.lookup_by_id(1).await.unwrap().unwrap();
        assert!(user.refresh_token.is_none());
    }
}
