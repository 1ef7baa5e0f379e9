// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crave_core::{Role, UserId, UserRecord};

// =============================================================================
// Identity
// =============================================================================

/// The minimal identity projection downstream resolvers consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric user id.
    pub id: UserId,
    /// Account role.
    pub role: Role,
}

impl From<&UserRecord> for Identity {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

// =============================================================================
// AuthContext
// =============================================================================

/// Per-request authentication context.
///
/// Attached to every request by the credential middleware, identity present
/// or not. An anonymous context is the normal state for public traffic, never
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// The resolved identity, if the caller presented a usable credential.
    pub identity: Option<Identity>,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl AuthContext {
    /// Creates a context for an authenticated caller.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Creates an anonymous context.
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns `true` if no identity is attached.
    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }

    /// Returns `true` if the attached identity has the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.identity.map(|i| i.role == role).unwrap_or(false)
    }

    /// Returns the attached user id, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.map(|i| i.id)
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

// =============================================================================
// Tests
// =============================================================================
