// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Operation-level role authorization.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crave_core::Role;

use super::context::Identity;
use super::failure::AuthFailure;
use super::resolve::IdentityResolver;

// =============================================================================
// RoleRequirement
// =============================================================================

/// The declared allow-list for one protected operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleRequirement {
    /// Any authenticated identity is allowed, role ignored.
    Any,
    /// Only identities whose role is in the set are allowed.
    OneOf(Vec<Role>),
}

impl RoleRequirement {
    /// Creates a requirement for a single role.
    pub fn role(role: Role) -> Self {
        Self::OneOf(vec![role])
    }

    /// Returns `true` if an identity with the given role satisfies this
    /// requirement.
    pub fn allows(&self, role: Role) -> bool {
        match self {
            RoleRequirement::Any => true,
            RoleRequirement::OneOf(roles) => roles.contains(&role),
        }
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The operation may proceed. Carries the resolved identity, if the gate
    /// had to resolve one (public operations allow without resolving).
    Allow(Option<Identity>),
    /// The operation is denied, with the failure kind that caused it.
    Deny(AuthFailure),
}

impl Decision {
    /// Returns `true` for an allow decision.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

// =============================================================================
// RoleGate
// =============================================================================

/// The operation-to-allow-list table, resolved at startup.
///
/// Operations absent from the table are public. The gate prefers an identity
/// already attached by the credential middleware and falls back to resolving
/// a single presented token, so both transport shapes (header pair, combined
/// token field) go through the same decision.
///
/// Where the credential middleware fails open on directory trouble, the gate
/// fails closed: attaching no identity is harmless, granting access on a
/// shaky lookup is not.
#[derive(Clone)]
pub struct RoleGate {
    requirements: Arc<HashMap<String, RoleRequirement>>,
    resolver: IdentityResolver,
}

impl RoleGate {
    /// Creates a gate builder.
    pub fn builder(resolver: IdentityResolver) -> RoleGateBuilder {
        RoleGateBuilder {
            requirements: HashMap::new(),
            resolver,
        }
    }

    /// Returns the declared requirement for an operation, if any.
    pub fn requirement(&self, operation: &str) -> Option<&RoleRequirement> {
        self.requirements.get(operation)
    }

    /// Decides whether the invoked operation may proceed.
    ///
    /// Deny short-circuits before the operation's business logic runs and has
    /// no side effects.
    pub async fn authorize(
        &self,
        operation: &str,
        attached: Option<Identity>,
        fallback_token: Option<&str>,
    ) -> Decision {
        let requirement = match self.requirements.get(operation) {
            // No declared requirement: public operation.
            None => return Decision::Allow(attached),
            Some(req) => req,
        };

        let identity = match attached {
            Some(identity) => identity,
            None => match fallback_token {
                None => return Decision::Deny(AuthFailure::IdentityNotFound),
                Some(token) => match self.resolver.resolve_access(token).await {
                    Ok(identity) => identity,
                    Err(failure) => {
                        tracing::debug!(
                            operation,
                            failure = failure.code(),
                            "token did not resolve to an identity"
                        );
                        return Decision::Deny(failure);
                    }
                },
            },
        };

        if requirement.allows(identity.role) {
            Decision::Allow(Some(identity))
        } else {
            tracing::warn!(
                operation,
                user_id = identity.id,
                role = %identity.role,
                "role not permitted for operation"
            );
            Decision::Deny(AuthFailure::RoleDenied)
        }
    }
}

impl std::fmt::Debug for RoleGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleGate")
            .field("operations", &self.requirements.len())
            .finish()
    }
}

// =============================================================================
// RoleGateBuilder
// =============================================================================

/// Builder for the operation table.
pub struct RoleGateBuilder {
    requirements: HashMap<String, RoleRequirement>,
    resolver: IdentityResolver,
}

impl RoleGateBuilder {
    /// Declares an operation open to any authenticated identity.
    pub fn allow_any(mut self, operation: impl Into<String>) -> Self {
        self.requirements
            .insert(operation.into(), RoleRequirement::Any);
        self
    }

    /// Declares an operation restricted to the given roles.
    pub fn require(mut self, operation: impl Into<String>, roles: impl Into<Vec<Role>>) -> Self {
        self.requirements
            .insert(operation.into(), RoleRequirement::OneOf(roles.into()));
        self
    }

    /// Builds the gate.
    pub fn build(self) -> RoleGate {
        RoleGate {
            requirements: Arc::new(self.requirements),
            resolver: self.resolver,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
