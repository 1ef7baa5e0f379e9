// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request middleware.
//!
//! - [`CredentialLayer`]: resolves the caller's identity from the credential
//!   header pair and attaches it to the request (never denies)
//! - [`RoleGateLayer`]: enforces a declared role requirement for one
//!   operation (denies before the handler runs)

mod credential;
mod gate;

pub use credential::{
    CredentialLayer, CredentialMiddleware, ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER,
    RENEWED_TOKEN_HEADER,
};
pub use gate::{RoleGateLayer, RoleGateMiddleware};
