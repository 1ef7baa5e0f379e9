// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role gate middleware.
//!
//! Applies one operation's declared role requirement before the handler
//! runs. The gate prefers the identity attached by the credential
//! middleware and falls back to resolving a bearer token from the
//! `authorization` header, so routes stay protected even on transports that
//! carry a single combined token field instead of the header pair.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{AuthContext, Decision, RoleGate};
use crate::error::ApiError;

// =============================================================================
// RoleGateLayer
// =============================================================================

/// Layer enforcing the role requirement declared for one operation.
#[derive(Clone)]
pub struct RoleGateLayer {
    gate: Arc<RoleGate>,
    operation: Arc<str>,
}

impl RoleGateLayer {
    /// Creates a layer guarding the given operation.
    pub fn for_operation(gate: Arc<RoleGate>, operation: impl AsRef<str>) -> Self {
        Self {
            gate,
            operation: Arc::from(operation.as_ref()),
        }
    }
}

impl<S> Layer<S> for RoleGateLayer {
    type Service = RoleGateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleGateMiddleware {
            inner,
            gate: self.gate.clone(),
            operation: self.operation.clone(),
        }
    }
}

// =============================================================================
// RoleGateMiddleware
// =============================================================================

/// Middleware enforcing a role requirement.
#[derive(Clone)]
pub struct RoleGateMiddleware<S> {
    inner: S,
    gate: Arc<RoleGate>,
    operation: Arc<str>,
}

impl<S> Service<Request<Body>> for RoleGateMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let gate = self.gate.clone();
        let operation = self.operation.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let attached = req
                .extensions()
                .get::<AuthContext>()
                .and_then(|ctx| ctx.identity);
            let fallback = extract_bearer_token(&req);

            match gate
                .authorize(&operation, attached, fallback.as_deref())
                .await
            {
                Decision::Allow(_) => inner.call(req).await,
                Decision::Deny(failure) => Ok(ApiError::from(failure).into_response()),
            }
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer ").map(|s| s.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Identity, IdentityResolver, TokenCodec, TokenConfig};
    use axum::http::StatusCode;
    use crave_core::{InMemoryUserDirectory, Role, UserRecord};
    use std::convert::Infallible;
    use tower::ServiceExt;

    fn mock_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>(Response::new(Body::empty()))
        })
    }

    fn gate(users: Vec<UserRecord>) -> Arc<RoleGate> {
        let codec = Arc::new(
            TokenCodec::new(TokenConfig::new(
                "test-secret-key-that-is-long-enough-for-testing",
            ))
            .unwrap(),
        );
        let resolver =
            IdentityResolver::new(codec, Arc::new(InMemoryUserDirectory::with_users(users)));
        Arc::new(
            RoleGate::builder(resolver)
                .require("createRestaurant", [Role::Owner])
                .allow_any("me")
                .build(),
        )
    }

    fn request_with_identity(identity: Option<Identity>) -> Request<Body> {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let ctx = match identity {
            Some(identity) => AuthContext::authenticated(identity),
            None => AuthContext::anonymous(),
        };
        req.extensions_mut().insert(ctx);
        req
    }

    #[tokio::test]
    async fn test_allowed_role_passes() {
        let layer = RoleGateLayer::for_operation(gate(vec![]), "createRestaurant");
        let service = layer.layer(mock_service());

        let req = request_with_identity(Some(Identity {
            id: 7,
            role: Role::Owner,
        }));
        let response = service.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_role_is_forbidden() {
        let layer = RoleGateLayer::for_operation(gate(vec![]), "createRestaurant");
        let service = layer.layer(mock_service());

        let req = request_with_identity(Some(Identity {
            id: 2,
            role: Role::Client,
        }));
        let response = service.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthorized() {
        let layer = RoleGateLayer::for_operation(gate(vec![]), "me");
        let service = layer.layer(mock_service());

        let response = service
            .oneshot(request_with_identity(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_undeclared_operation_allows_anonymous() {
        let layer = RoleGateLayer::for_operation(gate(vec![]), "login");
        let service = layer.layer(mock_service());

        let response = service
            .oneshot(request_with_identity(None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bearer_fallback_resolution() {
        // No credential middleware ran; the gate resolves the single
        // bearer token itself.
        let users = vec![UserRecord::new(7, "owner@crave.io", Role::Owner, "hash")];
        let gate = gate(users);
        let codec = TokenCodec::new(TokenConfig::new(
            "test-secret-key-that-is-long-enough-for-testing",
        ))
        .unwrap();
        let token = codec.sign_access(7).unwrap();

        let layer = RoleGateLayer::for_operation(gate, "createRestaurant");
        let service = layer.layer(mock_service());

        let req = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = service.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_extract_bearer_token() {
        use axum::http::HeaderValue;

        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();

        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));
    }
}
