// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Account roles.

use serde::{Deserialize, Serialize};

/// The role attached to a user account.
///
/// Roles are fixed at account creation and drive operation-level
/// authorization. There is no role hierarchy: an owner is not a superset of a
/// client, the allow-list on each operation decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Orders food from restaurants.
    Client,
    /// Owns restaurants and manages their dishes and incoming orders.
    Owner,
    /// Picks up and delivers orders.
    Delivery,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Owner => "owner",
            Role::Delivery => "delivery",
        }
    }

    /// Parses a role from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "client" | "customer" => Some(Role::Client),
            "owner" | "restaurant_owner" => Some(Role::Owner),
            "delivery" | "rider" => Some(Role::Delivery),
            _ => None,
        }
    }

    /// All roles, in declaration order.
    pub fn all() -> [Role; 3] {
        [Role::Client, Role::Owner, Role::Delivery]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::all() {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_parse_aliases() {
        assert_eq!(Role::parse("Owner"), Some(Role::Owner));
        assert_eq!(Role::parse("rider"), Some(Role::Delivery));
        assert_eq!(Role::parse("customer"), Some(Role::Client));
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Owner.to_string(), "owner");
    }
}
