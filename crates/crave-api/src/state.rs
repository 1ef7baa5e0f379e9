// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use crave_core::{InMemoryUserDirectory, UserDirectory};

use crate::auth::{IdentityResolver, RoleGate, RoleGateBuilder, TokenCodec};
use crate::config::ApiConfig;
use crave_core::Role;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Built once at startup: the codec from the configured secret, the directory
/// from whatever store backs the deployment, and the role table. Handlers
/// receive it through Axum's state extraction.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token codec.
    pub codec: Arc<TokenCodec>,
    /// User directory.
    pub directory: Arc<dyn UserDirectory>,
    /// Role gate with the operation table.
    pub gate: Arc<RoleGate>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns the user directory.
    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// Returns the role gate.
    pub fn gate(&self) -> &Arc<RoleGate> {
        &self.gate
    }

    /// Returns an identity resolver over this state's codec and directory.
    pub fn resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.codec.clone(), self.directory.clone())
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    codec: Option<Arc<TokenCodec>>,
    directory: Option<Arc<dyn UserDirectory>>,
    requirements: Option<Box<dyn FnOnce(RoleGateBuilder) -> RoleGateBuilder + Send>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            codec: None,
            directory: None,
            requirements: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token codec.
    pub fn codec(mut self, codec: Arc<TokenCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Sets the user directory.
    pub fn directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Declares additional role requirements on top of the defaults.
    pub fn requirements(
        mut self,
        f: impl FnOnce(RoleGateBuilder) -> RoleGateBuilder + Send + 'static,
    ) -> Self {
        self.requirements = Some(Box::new(f));
        self
    }

    /// Builds the AppState.
    pub fn build(self) -> crate::error::ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let codec = match self.codec {
            Some(codec) => codec,
            None => Arc::new(TokenCodec::new(config.token.clone())?),
        };

        let directory = self
            .directory
            .unwrap_or_else(|| Arc::new(InMemoryUserDirectory::new()));

        let resolver = IdentityResolver::new(codec.clone(), directory.clone());
        let mut gate_builder = default_requirements(RoleGate::builder(resolver));
        if let Some(f) = self.requirements {
            gate_builder = f(gate_builder);
        }

        Ok(AppState {
            config: Arc::new(config),
            codec,
            directory,
            gate: Arc::new(gate_builder.build()),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The role table for the operations this crate serves itself.
///
/// Login and refresh stay undeclared (public); session introspection and
/// teardown require an authenticated identity of any role.
fn default_requirements(builder: RoleGateBuilder) -> RoleGateBuilder {
    builder
        .allow_any("me")
        .allow_any("logout")
        .require("editProfile", [Role::Client, Role::Owner, Role::Delivery])
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<TokenCodec> {
    fn from_ref(state: &AppState) -> Self {
        state.codec.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<RoleGate> {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
