// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # crave-api
//!
//! HTTP API server for the Crave food-ordering platform: token-based
//! authentication, silent session renewal, and operation-level role
//! authorization.
//!
//! The crate is built around three cooperating pieces:
//!
//! - [`auth::TokenCodec`] — stateless signing/verification of the
//!   access/refresh token pair
//! - [`middleware::CredentialLayer`] — per-request middleware that resolves
//!   the caller's identity from the credential headers (with silent renewal)
//!   and attaches it to the request
//! - [`auth::RoleGate`] — the per-operation allow/deny decision, driven by a
//!   role table built at startup
//!
//! User storage is behind the `crave_core::UserDirectory` trait; this crate
//! only reads identities through it and triggers refresh-token overwrites.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{
    AuthContext, AuthFailure, Claims, Identity, IdentityResolver, RoleGate, RoleRequirement,
    TokenCodec, TokenConfig,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, TokenPairResponse};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::AppState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
