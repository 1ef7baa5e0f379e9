// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # crave-core
//!
//! Core domain types for the Crave food-ordering platform.
//!
//! This crate provides the types shared between the auth/session layer and
//! the rest of the backend:
//!
//! - **Role**: the three account roles (client, owner, delivery)
//! - **UserRecord**: the minimal user projection the auth core reads
//! - **UserDirectory**: the lookup/write contract the auth core depends on
//! - **Password**: argon2 password hashing helpers
//!
//! The directory is deliberately a trait: the auth core only ever *calls* it,
//! it does not own storage. `InMemoryUserDirectory` is the reference
//! implementation used by tests and the demo binary.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod directory;
pub mod password;
pub mod role;
pub mod user;

pub use directory::{DirectoryError, DirectoryResult, InMemoryUserDirectory, UserDirectory};
pub use password::{hash_password, verify_password, PasswordError};
pub use role::Role;
pub use user::{UserId, UserRecord};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
