// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Order handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use wardrobe_core::types::{Order, OrderFilter, OrderId, OrderStatus, UserId};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{CurrentUser, IdPath, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /orders
///
/// Commits the caller's basket.
pub async fn commit_basket(
    State(state): State<AppState>,
    CurrentUser(subject): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let order = state.baskets.commit(subject.id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/my
pub async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(subject): CurrentUser,
) -> ApiResult<ApiResponse<Vec<Order>>> {
    Ok(ApiResponse::list(
        state.orders.list_for_user(subject.id).await?,
    ))
}

/// Query parameters for the admin order listing.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// Restrict to one user.
    pub user_id: Option<i64>,
}

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<OrderQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<ApiResponse<Vec<Order>>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let filter = OrderFilter {
        user_id: query.user_id.map(UserId::new),
    };
    Ok(ApiResponse::list(state.orders.list(filter).await?))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    IdPath(id): IdPath<OrderId>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders.get(id).await?))
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    /// Target status.
    pub status: OrderStatus,
}

/// PATCH /orders/{id}
pub async fn update_order_status(
    State(state): State<AppState>,
    IdPath(id): IdPath<OrderId>,
    ValidatedJson(update): ValidatedJson<StatusUpdate>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders.update_status(id, update.status).await?))
}
