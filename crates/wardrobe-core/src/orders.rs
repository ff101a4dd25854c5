// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Administrative access to committed orders.

use std::sync::Arc;

use tracing::info;

use crate::error::{ShopError, ShopResult};
use crate::store::ShopStore;
use crate::types::{Order, OrderFilter, OrderId, OrderStatus, UserId};

/// Reads and advances committed orders.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn ShopStore>,
}

impl OrderService {
    /// Creates a service over `store`.
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// Fetches one order.
    pub async fn get(&self, id: OrderId) -> ShopResult<Order> {
        self.store
            .order(id)
            .await?
            .ok_or_else(|| ShopError::not_found("order", id))
    }

    /// Lists orders matching `filter`, newest first.
    pub async fn list(&self, filter: OrderFilter) -> ShopResult<Vec<Order>> {
        Ok(self.store.orders(filter).await?)
    }

    /// Lists the orders of one user.
    pub async fn list_for_user(&self, user_id: UserId) -> ShopResult<Vec<Order>> {
        self.list(OrderFilter::for_user(user_id)).await
    }

    /// Moves an order to `status`.
    ///
    /// The change is applied as a compare-and-set on the status read here, so
    /// two concurrent edits cannot both pass the transition check.
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> ShopResult<Order> {
        let current = self.get(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(ShopError::InvalidTransition {
                order_id: id,
                from: current.status,
                to: status,
            });
        }

        if !self.store.set_order_status(id, current.status, status).await? {
            let latest = self.get(id).await?;
            return Err(ShopError::InvalidTransition {
                order_id: id,
                from: latest.status,
                to: status,
            });
        }

        info!(order_id = %id, from = %current.status, to = %status, "Order status changed");
        Ok(Order { status, ..current })
    }
}
