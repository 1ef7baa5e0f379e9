// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{AuthContext, Identity};
use crate::error::ApiError;

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Extracts the resolved [`Identity`] from the request extensions. Returns
/// 401 if the caller is anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(identity): Auth) -> impl IntoResponse {
///     format!("Hello, user {}", identity.id)
/// }
/// ```
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.identity)
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// =============================================================================
// Optional Auth Extractor
// =============================================================================

/// Extractor for optionally authenticated requests.
///
/// Yields `None` for anonymous callers instead of rejecting.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.identity);
        Ok(OptionalAuth(identity))
    }
}

// =============================================================================
// Request ID Extractor
// =============================================================================

/// Extractor for the request ID.
pub struct RequestId(pub uuid::Uuid);

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| ctx.request_id)
            .unwrap_or_else(uuid::Uuid::now_v7);

        Ok(RequestId(id))
    }
}

// =============================================================================
// Client IP Extractor
// =============================================================================

/// Extractor for the client IP address.
pub struct ClientIp(pub Option<std::net::IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Try to get from X-Forwarded-For header
        let forwarded = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse().ok());

        if let Some(ip) = forwarded {
            return Ok(ClientIp(Some(ip)));
        }

        // Fall back to the resolved context
        let from_ctx = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.client_ip);

        Ok(ClientIp(from_ctx))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use crave_core::Role;

    fn parts_with_ctx(ctx: Option<AuthContext>) -> Parts {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    #[tokio::test]
    async fn test_auth_extractor_requires_identity() {
        let mut parts = parts_with_ctx(Some(AuthContext::anonymous()));
        assert!(Auth::from_request_parts(&mut parts, &()).await.is_err());

        let mut parts = parts_with_ctx(None);
        assert!(Auth::from_request_parts(&mut parts, &()).await.is_err());

        let identity = Identity {
            id: 7,
            role: Role::Owner,
        };
        let mut parts = parts_with_ctx(Some(AuthContext::authenticated(identity)));
        let Auth(extracted) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.id, 7);
    }

    #[tokio::test]
    async fn test_optional_auth_extractor() {
        let mut parts = parts_with_ctx(Some(AuthContext::anonymous()));
        let OptionalAuth(identity) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn test_client_ip_from_forwarded_header() {
        let req = Request::builder()
            .uri("/test")
            .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let mut parts = req.into_parts().0;

        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ip.unwrap().to_string(), "203.0.113.9");
    }
}
