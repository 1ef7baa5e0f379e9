// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential resolution middleware.
//!
//! Reads the access/refresh credential header pair, resolves the caller's
//! identity, and attaches an [`AuthContext`] to the request. When the access
//! token is stale but the refresh token store-matches, a fresh access token
//! is minted and surfaced on the response so the caller can adopt it on its
//! next request.
//!
//! This middleware never denies: its only output is whether the attached
//! context carries an identity. Hard denial belongs to the role gate.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderValue, Request},
    response::Response,
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{AuthContext, AuthFailure, Identity, IdentityResolver};

/// Header carrying the access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-jwt";
/// Header carrying the refresh token.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
/// Response header carrying a silently renewed access token.
pub const RENEWED_TOKEN_HEADER: &str = "x-renewed-jwt";

// =============================================================================
// CredentialLayer
// =============================================================================

/// Layer attaching identity resolution to every request.
#[derive(Clone)]
pub struct CredentialLayer {
    resolver: IdentityResolver,
}

impl CredentialLayer {
    /// Creates a new credential layer.
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }
}

impl<S> Layer<S> for CredentialLayer {
    type Service = CredentialMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CredentialMiddleware {
            inner,
            resolver: self.resolver.clone(),
        }
    }
}

// =============================================================================
// CredentialMiddleware
// =============================================================================

/// Middleware resolving the credential header pair.
#[derive(Clone)]
pub struct CredentialMiddleware<S> {
    inner: S,
    resolver: IdentityResolver,
}

/// What the header pair resolved to.
enum Resolution {
    /// No usable identity; proceed anonymous.
    Anonymous,
    /// Access token was good.
    Attached(Identity),
    /// Access token was stale; refresh token store-matched. Carries the
    /// freshly minted access token to surface on the response.
    Renewed(Identity, String),
}

impl<S> Service<Request<Body>> for CredentialMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let resolver = self.resolver.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = Uuid::now_v7();

            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            let access = header_str(&req, ACCESS_TOKEN_HEADER);
            let refresh = header_str(&req, REFRESH_TOKEN_HEADER);

            let resolution = resolve(&resolver, access.as_deref(), refresh.as_deref()).await;

            let (identity, renewed) = match resolution {
                Resolution::Anonymous => (None, None),
                Resolution::Attached(identity) => (Some(identity), None),
                Resolution::Renewed(identity, token) => (Some(identity), Some(token)),
            };

            let mut auth_ctx = match identity {
                Some(identity) => AuthContext::authenticated(identity),
                None => AuthContext::anonymous(),
            }
            .with_request_id(request_id);
            if let Some(ip) = client_ip {
                auth_ctx = auth_ctx.with_client_ip(ip);
            }

            req.extensions_mut().insert(auth_ctx);

            let mut response = inner.call(req).await?;

            // Surface the renewed access token so the caller can adopt it on
            // subsequent requests; this request already ran with the refresh
            // identity.
            if let Some(token) = renewed {
                match HeaderValue::from_str(&token) {
                    Ok(value) => {
                        response.headers_mut().insert(RENEWED_TOKEN_HEADER, value);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "renewed access token is not a valid header value");
                    }
                }
            }

            Ok(response)
        })
    }
}

// =============================================================================
// Resolution State Machine
// =============================================================================

async fn resolve(
    resolver: &IdentityResolver,
    access: Option<&str>,
    refresh: Option<&str>,
) -> Resolution {
    if access.is_none() && refresh.is_none() {
        return Resolution::Anonymous;
    }

    if let Some(token) = access {
        match resolver.resolve_access(token).await {
            Ok(identity) => return Resolution::Attached(identity),
            // Token verified but the subject didn't resolve: swallow and
            // proceed unauthenticated. The role gate performs the hard deny.
            Err(AuthFailure::IdentityNotFound) | Err(AuthFailure::DirectoryUnavailable) => {
                tracing::debug!("access token verified but identity did not resolve");
                return Resolution::Anonymous;
            }
            // Stale or invalid token: fall through to the refresh path.
            Err(failure) => {
                tracing::debug!(failure = failure.code(), "access token did not verify");
            }
        }
    }

    let Some(token) = refresh else {
        return Resolution::Anonymous;
    };

    match resolver.resolve_refresh(token).await {
        Ok(identity) => match resolver.codec().sign_access(identity.id) {
            Ok(renewed) => Resolution::Renewed(identity, renewed),
            Err(e) => {
                // Renewal is best-effort; the identity is still attached for
                // this request.
                tracing::warn!(error = %e, "failed to mint renewed access token");
                Resolution::Attached(identity)
            }
        },
        Err(failure) => {
            tracing::debug!(failure = failure.code(), "refresh token did not verify");
            Resolution::Anonymous
        }
    }
}

fn header_str<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

// =============================================================================
// Tests
// =============================================================================
