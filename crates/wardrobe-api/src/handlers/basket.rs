// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Basket handlers. The basket always belongs to the caller.

use axum::{extract::State, Json};

use wardrobe_core::types::{Basket, ItemId};

use crate::error::ApiResult;
use crate::extractors::{CurrentUser, IdPath};
use crate::state::AppState;

/// GET /basket
pub async fn get_basket(
    State(state): State<AppState>,
    CurrentUser(subject): CurrentUser,
) -> ApiResult<Json<Basket>> {
    Ok(Json(state.baskets.get_basket(subject.id).await?))
}

/// POST /basket/{item_id}
///
/// Reserves one unit of the item.
pub async fn add_to_basket(
    State(state): State<AppState>,
    CurrentUser(subject): CurrentUser,
    IdPath(item_id): IdPath<ItemId>,
) -> ApiResult<Json<Basket>> {
    Ok(Json(state.baskets.add_item(subject.id, item_id).await?))
}

/// DELETE /basket/{item_id}
///
/// Returns one unit of the item to stock.
pub async fn remove_from_basket(
    State(state): State<AppState>,
    CurrentUser(subject): CurrentUser,
    IdPath(item_id): IdPath<ItemId>,
) -> ApiResult<Json<Basket>> {
    Ok(Json(state.baskets.dec_item(subject.id, item_id).await?))
}
