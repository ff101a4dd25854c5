// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Store traits.
//!
//! Basket and stock mutations only happen inside a [`ShopTransaction`]. A
//! transaction that is dropped without [`ShopTransaction::commit`] must leave
//! no trace, which is what makes a cancelled request roll back any
//! reservation it already made.
//!
//! Implementations must linearize [`StockLedger::reserve`] calls against the
//! same item: two concurrent reservations of the last unit cannot both
//! succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::types::{
    Basket, Item, ItemId, NewItem, NewUser, Order, OrderFilter, OrderId, OrderStatus, Page, User,
    UserId,
};

/// Result of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Units were taken from stock at this catalog price.
    Reserved {
        /// Catalog price at reservation time.
        unit_price: i64,
    },
    /// The item is unknown, pulled from sale, or short on stock.
    Unavailable,
}

// =============================================================================
// Transaction traits
// =============================================================================

/// Per-item availability counter.
#[async_trait]
pub trait StockLedger: Send {
    /// Atomically checks availability and takes `quantity` units.
    ///
    /// Clears `is_available` when stock reaches zero.
    async fn reserve(&mut self, item_id: ItemId, quantity: u32) -> StoreResult<Reservation>;

    /// Returns `quantity` previously reserved units to stock.
    ///
    /// An item that ran out is put back on sale unless it was pulled.
    async fn release(&mut self, item_id: ItemId, quantity: u32) -> StoreResult<()>;
}

/// Persistence of open baskets, keyed by `(user_id, status = cart)`.
#[async_trait]
pub trait BasketLedger: Send {
    /// Loads and locks the open basket of `user_id`, if any.
    async fn find_basket(&mut self, user_id: UserId) -> StoreResult<Option<Basket>>;

    /// Loads and locks the open basket of `user_id`, creating an empty one if needed.
    async fn open_basket(&mut self, user_id: UserId) -> StoreResult<Basket>;

    /// Replaces the stored lines and price of `basket`.
    async fn write_lines(&mut self, basket: &Basket) -> StoreResult<()>;

    /// Turns the open basket into a committed order and frees the user's basket slot.
    async fn close_basket(
        &mut self,
        basket: &Basket,
        committed_at: DateTime<Utc>,
    ) -> StoreResult<Order>;
}

/// A unit of work spanning stock and basket mutations.
#[async_trait]
pub trait ShopTransaction: StockLedger + BasketLedger {
    /// Makes every change of this transaction visible at once.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

// =============================================================================
// ShopStore
// =============================================================================

/// Entry point to a backing store.
#[async_trait]
pub trait ShopStore: Send + Sync + 'static {
    /// Returns the backend name for logs.
    fn name(&self) -> &'static str;

    /// Starts a transaction.
    async fn begin(&self) -> StoreResult<Box<dyn ShopTransaction>>;

    /// Checks that the store answers.
    async fn ping(&self) -> StoreResult<()>;

    // ---- catalog -----------------------------------------------------------

    /// Fetches one item.
    async fn item(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Lists items by ascending id.
    async fn items(&self, page: Page) -> StoreResult<Vec<Item>>;

    /// Creates an item.
    async fn insert_item(&self, item: NewItem) -> StoreResult<Item>;

    /// Overwrites stock and the pulled flag of an item.
    ///
    /// `is_available` becomes `stock > 0 && !pulled`.
    async fn set_stock(&self, id: ItemId, stock: u32, pulled: bool) -> StoreResult<Option<Item>>;

    // ---- orders ------------------------------------------------------------

    /// Fetches a committed order. Open baskets are never returned.
    async fn order(&self, id: OrderId) -> StoreResult<Option<Order>>;

    /// Lists committed orders, newest first.
    async fn orders(&self, filter: OrderFilter) -> StoreResult<Vec<Order>>;

    /// Moves an order from `from` to `to` if it is still in `from`.
    ///
    /// Returns `false` when the order is missing or its status changed.
    async fn set_order_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<bool>;

    // ---- users -------------------------------------------------------------

    /// Creates an account. Fails with `StoreError::Duplicate` on a taken login.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    /// Looks an account up by login.
    async fn user_by_login(&self, login: &str) -> StoreResult<Option<User>>;
}
