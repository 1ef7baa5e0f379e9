// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session handlers: login, rotation, logout, introspection.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crave_core::verify_password;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ClientIp};
use crate::response::{CurrentUserResponse, TokenPairResponse};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Authenticates a user and opens a session: signs an access token, issues a
/// refresh token, and stores the refresh token on the user record. Storing it
/// supersedes whatever session the user had open before; the previous refresh
/// token stops verifying immediately.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("이메일과 비밀번호를 입력해주세요"));
    }

    let user = state
        .directory()
        .lookup_by_email(&request.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if !verify_password(&request.password, &user.password_hash) {
        tracing::debug!(user_id = user.id, "wrong password");
        return Err(ApiError::unauthorized("Wrong password"));
    }

    let access_token = state.codec().sign_access(user.id)?;
    let refresh_token = state.codec().issue_refresh(user.id)?;
    state
        .directory()
        .store_refresh_token(user.id, Some(refresh_token.clone()))
        .await?;

    tracing::info!(user_id = user.id, client_ip = ?client_ip, "user logged in");

    Ok(Json(TokenPairResponse::new(
        access_token,
        refresh_token,
        state.codec().access_ttl_secs(),
    )))
}

// =============================================================================
// Refresh Token
// =============================================================================

/// Refresh token request body.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// POST /api/v1/auth/refresh
///
/// Rotates the session. The presented refresh token must be the one currently
/// stored for its subject; on success both tokens are reissued and the new
/// refresh token replaces the stored one, so the presented token cannot be
/// replayed. A superseded token comes back as `REFRESH_MISMATCH`, telling the
/// client to re-login rather than retry.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state.codec().verify(&request.refresh_token)?;
    let user_id = claims.user_id();

    state
        .codec()
        .verify_refresh(&request.refresh_token, user_id, state.directory().as_ref())
        .await?;

    let access_token = state.codec().sign_access(user_id)?;
    let new_refresh_token = state.codec().issue_refresh(user_id)?;
    state
        .directory()
        .store_refresh_token(user_id, Some(new_refresh_token.clone()))
        .await?;

    tracing::debug!(user_id, "session rotated");

    Ok(Json(TokenPairResponse::new(
        access_token,
        new_refresh_token,
        state.codec().access_ttl_secs(),
    )))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/v1/auth/logout
///
/// Closes the session by clearing the stored refresh token.
pub async fn logout(
    State(state): State<AppState>,
    Auth(identity): Auth,
) -> ApiResult<impl IntoResponse> {
    state
        .directory()
        .store_refresh_token(identity.id, None)
        .await?;

    tracing::info!(user_id = identity.id, "user logged out");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /api/v1/auth/me
///
/// Returns the resolved identity of the caller.
pub async fn current_user(Auth(identity): Auth) -> ApiResult<impl IntoResponse> {
    Ok(Json(CurrentUserResponse::from(identity)))
}

// =============================================================================
// Tests
// =============================================================================
