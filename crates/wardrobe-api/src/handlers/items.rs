// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Catalog handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use wardrobe_core::types::{Item, ItemId, NewItem};

use crate::error::ApiResult;
use crate::extractors::{IdPath, Pagination, ValidatedJson};
use crate::response::{ApiResponse, ResponseMeta};
use crate::state::AppState;

/// GET /items
pub async fn list_items(
    State(state): State<AppState>,
    Pagination(params): Pagination,
) -> ApiResult<ApiResponse<Vec<Item>>> {
    let items = state.catalog.items(params.page()).await?;
    let meta = ResponseMeta::pagination(items.len(), params.offset, params.limit);
    Ok(ApiResponse::success(items).with_meta(meta))
}

/// GET /items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    IdPath(id): IdPath<ItemId>,
) -> ApiResult<Json<Item>> {
    Ok(Json(state.catalog.item(id).await?))
}

/// PUT /items
pub async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(item): ValidatedJson<NewItem>,
) -> ApiResult<impl IntoResponse> {
    let item = state.catalog.create_item(item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Stock update request body.
#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    /// New stock count.
    pub stock: u32,
    /// `false` takes the item off sale regardless of stock.
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// PATCH /items/{id}/stock
pub async fn restock_item(
    State(state): State<AppState>,
    IdPath(id): IdPath<ItemId>,
    ValidatedJson(request): ValidatedJson<RestockRequest>,
) -> ApiResult<Json<Item>> {
    let pull_from_sale = request.is_available == Some(false);
    Ok(Json(
        state
            .catalog
            .restock(id, request.stock, pull_from_sale)
            .await?,
    ))
}
