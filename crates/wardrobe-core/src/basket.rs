// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Basket/order lifecycle.
//!
//! A user owns at most one open basket (`Cart`). Items are reserved against
//! stock the moment they are added; committing only snapshots the basket
//! into an order and never re-checks stock.
//!
//! ```text
//! (none) --add_item--> Cart --add_item/dec_item--> Cart --commit--> Committed
//! ```
//!
//! Every mutation runs in one store transaction. The basket row is locked
//! before any stock row so concurrent calls acquire locks in the same order.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{ShopError, ShopResult};
use crate::store::{BasketLedger, Reservation, ShopStore, ShopTransaction, StockLedger};
use crate::types::{Basket, ItemId, Order, UserId};

/// Drives baskets through their lifecycle.
#[derive(Clone)]
pub struct BasketService {
    store: Arc<dyn ShopStore>,
}

impl BasketService {
    /// Creates a service over `store`.
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// Returns the open basket of `user_id` with its price recomputed.
    pub async fn get_basket(&self, user_id: UserId) -> ShopResult<Basket> {
        let mut tx = self.store.begin().await?;
        let mut basket = tx
            .find_basket(user_id)
            .await?
            .ok_or(ShopError::NoOpenBasket { user_id })?;
        basket.recompute_price();
        Ok(basket)
    }

    /// Reserves one unit of `item_id` and records it in the user's basket.
    ///
    /// Opens a basket if the user has none. On `ItemUnavailable`, or when the
    /// unit would overflow the basket total, nothing is persisted, not even the
    /// new basket.
    pub async fn add_item(&self, user_id: UserId, item_id: ItemId) -> ShopResult<Basket> {
        let mut tx = self.store.begin().await?;
        let mut basket = tx.open_basket(user_id).await?;

        let unit_price = match tx.reserve(item_id, 1).await? {
            Reservation::Reserved { unit_price } => unit_price,
            Reservation::Unavailable => {
                debug!(user_id = %user_id, item_id = %item_id, "Reservation refused");
                return Err(ShopError::ItemUnavailable { item_id });
            }
        };

        basket.add_unit(item_id, unit_price)?;
        tx.write_lines(&basket).await?;
        tx.commit().await?;

        debug!(
            user_id = %user_id,
            item_id = %item_id,
            quantity = basket.quantity_of(item_id),
            "Item added to basket"
        );
        Ok(basket)
    }

    /// Removes one unit of `item_id` from the basket and returns it to stock.
    ///
    /// A missing basket or line fails with `LineNotFound` and releases nothing.
    pub async fn dec_item(&self, user_id: UserId, item_id: ItemId) -> ShopResult<Basket> {
        let mut tx = self.store.begin().await?;
        let mut basket = tx
            .find_basket(user_id)
            .await?
            .ok_or(ShopError::LineNotFound { item_id })?;

        if !basket.remove_unit(item_id) {
            return Err(ShopError::LineNotFound { item_id });
        }

        tx.release(item_id, 1).await?;
        tx.write_lines(&basket).await?;
        tx.commit().await?;

        debug!(user_id = %user_id, item_id = %item_id, "Item removed from basket");
        Ok(basket)
    }

    /// Commits the open basket into an immutable order.
    pub async fn commit(&self, user_id: UserId) -> ShopResult<Order> {
        let mut tx = self.store.begin().await?;
        let mut basket = tx
            .find_basket(user_id)
            .await?
            .ok_or(ShopError::NoOpenBasket { user_id })?;

        if basket.is_empty() {
            return Err(ShopError::EmptyBasket { user_id });
        }
        basket.recompute_price();

        let order = tx.close_basket(&basket, Utc::now()).await?;
        tx.commit().await?;

        info!(
            user_id = %user_id,
            order_id = %order.id,
            price = order.price,
            lines = order.items.len(),
            "Basket committed"
        );
        Ok(order)
    }
}
