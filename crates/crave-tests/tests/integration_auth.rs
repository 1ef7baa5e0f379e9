// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Auth Integration Tests
//!
//! End-to-end tests for the token/session/role core:
//!
//! - Token round-trip, expiry and tamper rejection
//! - Refresh rotation and single-session invalidation
//! - Silent renewal through the credential middleware
//! - Role gating and the fail-open/fail-closed asymmetry
//!
//! ## Test Categories
//!
//! - `test_token_*`: codec-level properties
//! - `test_session_*`: login/refresh/logout flows over the router
//! - `test_gate_*`: role authorization
//! - `test_resolution_*`: credential middleware behavior

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use crave_api::{
    middleware::{ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER, RENEWED_TOKEN_HEADER},
    ApiServerBuilder, TokenCodec,
};
use crave_core::{Role, UserDirectory};
use crave_tests::common::{
    expired_token_config, init_test_logging, seeded_directory, test_api_config, test_codec,
    MockUserDirectory, UserFixtures, TEST_PASSWORD,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn app(directory: Arc<dyn UserDirectory>) -> Router {
    init_test_logging();
    ApiServerBuilder::new()
        .config(test_api_config())
        .directory(directory)
        .build()
        .expect("server builds")
        .router()
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(router: &Router, email: &str) -> (String, String) {
    let response = router
        .clone()
        .oneshot(json_request(
            "/api/v1/auth/login",
            serde_json::json!({ "email": email, "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

// =============================================================================
// Token Properties
// =============================================================================

#[tokio::test]
async fn test_token_round_trip() {
    let codec = test_codec();
    let token = codec.sign_access(7).unwrap();
    assert_eq!(codec.verify(&token).unwrap().user_id(), 7);
}

#[tokio::test]
async fn test_token_expiry() {
    let expired = TokenCodec::new(expired_token_config()).unwrap();
    let token = expired.sign_access(7).unwrap();

    let err = test_codec().verify(&token).unwrap_err();
    assert_eq!(err.code(), "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_token_tamper_rejection() {
    let codec = test_codec();
    let token = codec.sign_access(7).unwrap();

    // Flipping any byte of the signature must yield a tagged failure, never
    // a crash.
    let mut bytes = token.into_bytes();
    let last = bytes.len() - 1;
    bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    assert!(codec.verify(&tampered).is_err());
}

// =============================================================================
// Session Flows
// =============================================================================

#[tokio::test]
async fn test_session_login_and_me() {
    let router = app(seeded_directory());
    let (access, _refresh) = login(&router, "owner@crave.io").await;

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header(ACCESS_TOKEN_HEADER, &access)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user_id"], 7);
    assert_eq!(body["role"], "owner");
}

#[tokio::test]
async fn test_session_login_wrong_password() {
    let router = app(seeded_directory());

    let response = router
        .oneshot(json_request(
            "/api/v1/auth/login",
            serde_json::json!({ "email": "owner@crave.io", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_rotation_invalidates_prior_refresh_token() {
    let router = app(seeded_directory());
    let (_, r1) = login(&router, "owner@crave.io").await;

    // Rotate: r1 is consumed, r2 becomes the stored session.
    let response = router
        .clone()
        .oneshot(json_request(
            "/api/v1/auth/refresh",
            serde_json::json!({ "refresh_token": r1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let r2 = json_body(response).await["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    // r1 still has a valid signature but no longer store-matches.
    let response = router
        .clone()
        .oneshot(json_request(
            "/api/v1/auth/refresh",
            serde_json::json!({ "refresh_token": r1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"]["code"], "REFRESH_MISMATCH");

    // r2 rotates fine.
    let response = router
        .clone()
        .oneshot(json_request(
            "/api/v1/auth/refresh",
            serde_json::json!({ "refresh_token": r2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_second_login_supersedes_first() {
    // User 7, stored refresh "R-abc"; a superseded token with a valid
    // signature must fail the store-match, not the signature check.
    let directory = seeded_directory();
    let router = app(directory.clone());

    let (_, r_old) = login(&router, "owner@crave.io").await;
    let (_, r_abc) = login(&router, "owner@crave.io").await;

    assert_eq!(
        directory
            .lookup_by_id(7)
            .await
            .unwrap()
            .unwrap()
            .refresh_token
            .as_deref(),
        Some(r_abc.as_str())
    );

    // The codec itself reports the distinction.
    let codec = test_codec();
    assert!(codec.verify(&r_old).is_ok());
    let err = codec
        .verify_refresh(&r_old, 7, directory.as_ref())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "REFRESH_MISMATCH");
    assert!(codec.verify_refresh(&r_abc, 7, directory.as_ref()).await.is_ok());
}

#[tokio::test]
async fn test_session_logout_closes_session() {
    let directory = seeded_directory();
    let router = app(directory.clone());
    let (access, refresh) = login(&router, "client@crave.io").await;

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .header(ACCESS_TOKEN_HEADER, &access)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The refresh token was cleared; rotation now fails.
    let response = router
        .oneshot(json_request(
            "/api/v1/auth/refresh",
            serde_json::json!({ "refresh_token": refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Silent Renewal
// =============================================================================

#[tokio::test]
async fn test_resolution_silent_renewal_surfaces_new_token() {
    let router = app(seeded_directory());
    let (_, refresh) = login(&router, "owner@crave.io").await;

    let stale_access = TokenCodec::new(expired_token_config())
        .unwrap()
        .sign_access(7)
        .unwrap();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header(ACCESS_TOKEN_HEADER, &stale_access)
                .header(REFRESH_TOKEN_HEADER, &refresh)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Identity was attached from the refresh token's claims.
    assert_eq!(response.status(), StatusCode::OK);

    // The renewed access token is surfaced for the caller to adopt.
    let renewed = response
        .headers()
        .get(RENEWED_TOKEN_HEADER)
        .expect("renewed token header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(test_codec().verify(&renewed).unwrap().user_id(), 7);

    let body = json_body(response).await;
    assert_eq!(body["user_id"], 7);
}

#[tokio::test]
async fn test_resolution_superseded_refresh_is_not_renewed() {
    let router = app(seeded_directory());
    let (_, r_old) = login(&router, "owner@crave.io").await;
    let (_, _r_new) = login(&router, "owner@crave.io").await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header(REFRESH_TOKEN_HEADER, &r_old)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // No identity attached, so the gated operation denies.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(RENEWED_TOKEN_HEADER).is_none());
}

// =============================================================================
// Fail-Open vs Fail-Closed
// =============================================================================

#[tokio::test]
async fn test_resolution_missing_user_fails_open_gate_fails_closed() {
    // Valid token for a user that does not exist.
    let router = app(Arc::new(MockUserDirectory::new()));
    let token = test_codec().sign_access(42).unwrap();

    // Credential middleware swallows the miss: a public route still works.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(ACCESS_TOKEN_HEADER, &token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The gate denies the same caller on a role-protected route.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header(ACCESS_TOKEN_HEADER, &token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resolution_directory_fault_keeps_requests_flowing() {
    let mock = Arc::new(MockUserDirectory::with_users(UserFixtures::all()));
    let router = app(mock.clone());
    let token = test_codec().sign_access(7).unwrap();

    mock.set_fail_all_lookups(true);

    // Fail-open: the public route is unaffected by the directory outage.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(ACCESS_TOKEN_HEADER, &token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Fail-closed: the protected route denies rather than guessing.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    mock.set_fail_all_lookups(false);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Role Gating
// =============================================================================

#[tokio::test]
async fn test_gate_role_matrix_over_bearer_tokens() {
    init_test_logging();
    let codec = test_codec();
    let server = ApiServerBuilder::new()
        .config(test_api_config())
        .directory(seeded_directory())
        .build()
        .unwrap();
    let router = server.router(); // default table: me/logout are Any

    // Every role passes an Any-gated operation.
    for (email, id) in [
        ("owner@crave.io", 7),
        ("client@crave.io", 3),
        ("delivery@crave.io", 11),
    ] {
        let token = codec.sign_access(id).unwrap();
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "role gate for {email}");
    }

    // Anonymous caller on a gated operation: denied.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Anonymous caller on an undeclared operation: allowed.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_gate_owner_only_table() {
    use crave_api::auth::Decision;

    // The table form of the matrix: {Owner} allows owners, denies the rest.
    let state = crave_api::AppState::builder()
        .config(test_api_config())
        .directory(seeded_directory())
        .requirements(|gate| gate.require("createRestaurant", [Role::Owner]))
        .build()
        .unwrap();
    let gate = state.gate();
    let codec = test_codec();

    let owner_token = codec.sign_access(7).unwrap();
    let decision = gate
        .authorize("createRestaurant", None, Some(&owner_token))
        .await;
    assert!(decision.is_allowed());

    for id in [3, 11] {
        let token = codec.sign_access(id).unwrap();
        let decision = gate.authorize("createRestaurant", None, Some(&token)).await;
        assert!(matches!(decision, Decision::Deny(_)), "user {id} denied");
    }
}
