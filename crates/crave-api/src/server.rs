// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crave_core::UserDirectory;

use crate::auth::TokenCodec;
use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::handlers;
use crate::middleware::{CredentialLayer, RoleGateLayer, RENEWED_TOKEN_HEADER};
use crate::state::{AppState, AppStateBuilder};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let cors = create_cors_layer(&self.config);
        let credentials = CredentialLayer::new(self.state.resolver());

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(cors)
            .layer(credentials);

        let gate = self.state.gate().clone();

        Router::new()
            // Health endpoint (public)
            .route("/health", get(handlers::health))
            // Session endpoints
            .route("/api/v1/auth/login", post(handlers::login))
            .route("/api/v1/auth/refresh", post(handlers::refresh_token))
            .route(
                "/api/v1/auth/logout",
                post(handlers::logout)
                    .layer(RoleGateLayer::for_operation(gate.clone(), "logout")),
            )
            .route(
                "/api/v1/auth/me",
                get(handlers::current_user)
                    .layer(RoleGateLayer::for_operation(gate, "me")),
            )
            // Apply middleware and state
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| crate::error::ApiError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| crate::error::ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// The credential headers must be allowed on requests, and the renewal header
/// exposed on responses, or browsers will never see a silently renewed token.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;
    let wildcard = cors.allowed_origins.contains(&"*".to_string());

    let mut layer = CorsLayer::new()
        .max_age(Duration::from_secs(cors.max_age))
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(crate::middleware::ACCESS_TOKEN_HEADER),
            HeaderName::from_static(crate::middleware::REFRESH_TOKEN_HEADER),
        ])
        .expose_headers([HeaderName::from_static(RENEWED_TOKEN_HEADER)]);

    if wildcard {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<axum::http::HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    // Credentials cannot be combined with a wildcard origin.
    if cors.allow_credentials && !wildcard {
        layer = layer.allow_credentials(true);
    }

    layer
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
pub struct ApiServerBuilder {
    state_builder: AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the token codec.
    pub fn codec(mut self, codec: Arc<TokenCodec>) -> Self {
        self.state_builder = self.state_builder.codec(codec);
        self
    }

    /// Sets the user directory.
    pub fn directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.state_builder = self.state_builder.directory(directory);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenConfig;

    fn test_config() -> ApiConfig {
        ApiConfig::default().with_token(TokenConfig::new(
            "test-secret-key-that-is-long-enough-for-testing",
        ))
    }

    #[test]
    fn test_server_builder() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();

        assert_eq!(server.addr().port(), 8080);
    }

    #[test]
    fn test_router_creation() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();

        let _router = server.router();
    }

    #[test]
    fn test_cors_layer() {
        let _layer = create_cors_layer(&test_config());
    }
}
