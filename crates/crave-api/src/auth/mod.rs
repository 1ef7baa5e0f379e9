// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - Access/refresh token signing and verification
//! - The per-request identity resolution algorithm
//! - Role-based operation gating
//! - The authentication context attached to requests

mod claims;
mod codec;
mod context;
mod failure;
mod gate;
mod resolve;

pub use claims::Claims;
pub use codec::{TokenCodec, TokenConfig};
pub use context::{AuthContext, Identity};
pub use failure::AuthFailure;
pub use gate::{Decision, RoleGate, RoleGateBuilder, RoleRequirement};
pub use resolve::IdentityResolver;
