// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handler.

use axum::Json;

use crate::response::HealthResponse;

/// GET /health
///
/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
