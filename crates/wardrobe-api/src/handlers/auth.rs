// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::auth::{Credentials, Registration};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{Context, ValidatedJson};
use crate::response::AuthResponse;
use crate::state::AppState;

/// POST /register
///
/// Creates a `user` account and signs it in.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<Registration>,
) -> ApiResult<impl IntoResponse> {
    let token = state.sessions.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(token, state.jwt().expiration_secs())),
    ))
}

/// POST /login
///
/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<Credentials>,
) -> ApiResult<impl IntoResponse> {
    if request.login.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("login and password are required"));
    }

    let token = state.sessions.login(request).await?;
    Ok(Json(AuthResponse::new(token, state.jwt().expiration_secs())))
}

/// POST /logout
///
/// Revokes the presented token when revocation is enabled. Otherwise the
/// client simply discards it.
pub async fn logout(
    State(state): State<AppState>,
    Context(ctx): Context,
) -> ApiResult<StatusCode> {
    if let (Some(token_id), Some(expires_at)) = (&ctx.token_id, ctx.token_expires_at) {
        if !state.sessions.logout(token_id, expires_at) {
            tracing::debug!(request_id = %ctx.request_id, "Revocation disabled, logout is client-side");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
