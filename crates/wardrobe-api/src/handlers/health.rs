// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// Returns 200 when the store answers a ping, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    let (healthy, message) = match store.ping().await {
        Ok(()) => (true, None),
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "Readiness probe failed");
            (false, Some(e.to_string()))
        }
    };

    let response = ReadinessResponse {
        ready: healthy,
        components: vec![ComponentStatus {
            name: format!("store:{}", store.name()),
            healthy,
            message,
        }],
    };

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
