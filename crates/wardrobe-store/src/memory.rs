// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store implementation.
//!
//! Catalog, baskets and orders share one `tokio::sync::Mutex`. A
//! [`MemoryTransaction`] owns the lock guard for its whole lifetime and stages
//! every write in a private overlay; commit copies the overlay into the shared
//! state, drop discards it. Accounts live in a separate
//! `parking_lot::RwLock` since they are never part of a transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wardrobe_store::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut tx = store.begin().await?;
//! tx.reserve(item_id, 1).await?;
//! drop(tx); // nothing reserved
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use wardrobe_core::error::{StoreError, StoreResult};
use wardrobe_core::store::{BasketLedger, Reservation, ShopStore, ShopTransaction, StockLedger};
use wardrobe_core::types::{
    total_price, Basket, Item, ItemId, NewItem, NewUser, Order, OrderFilter, OrderId, OrderItem,
    OrderStatus, Page, User, UserId,
};

// =============================================================================
// State
// =============================================================================

/// An order row: an open basket while `status` is `Cart`, a committed order afterwards.
#[derive(Debug, Clone)]
struct OrderRecord {
    id: OrderId,
    user_id: UserId,
    items: Vec<OrderItem>,
    status: OrderStatus,
    date: Option<DateTime<Utc>>,
}

impl OrderRecord {
    fn to_order(&self) -> Option<Order> {
        if self.status == OrderStatus::Cart {
            return None;
        }
        Some(Order {
            id: self.id,
            date: self.date?,
            user_id: self.user_id,
            items: self.items.clone(),
            price: total_price(&self.items),
            status: self.status,
        })
    }
}

#[derive(Debug, Default)]
struct ShopState {
    items: BTreeMap<ItemId, Item>,
    orders: BTreeMap<OrderId, OrderRecord>,
    open_baskets: HashMap<UserId, OrderId>,
    last_item_id: i64,
    last_order_id: i64,
}

#[derive(Debug, Default)]
struct UserTable {
    by_id: BTreeMap<UserId, User>,
    by_login: HashMap<String, UserId>,
    last_id: i64,
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Single-process store.
///
/// Reservations are linearized by the store-wide transaction lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<ShopState>>,
    users: RwLock<UserTable>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> StoreResult<Box<dyn ShopTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            state: guard,
            staged: Staged::default(),
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self.state.lock().await.items.get(&id).cloned())
    }

    async fn items(&self, page: Page) -> StoreResult<Vec<Item>> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn insert_item(&self, item: NewItem) -> StoreResult<Item> {
        let mut state = self.state.lock().await;
        state.last_item_id += 1;
        let item = item.into_item(ItemId::new(state.last_item_id));
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn set_stock(
        &self,
        id: ItemId,
        stock: u32,
        pulled: bool,
    ) -> StoreResult<Option<Item>> {
        let mut state = self.state.lock().await;
        Ok(state.items.get_mut(&id).map(|item| {
            item.stock = stock;
            item.pulled = pulled;
            item.is_available = stock > 0 && !pulled;
            item.clone()
        }))
    }

    async fn order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state.orders.get(&id).and_then(OrderRecord::to_order))
    }

    async fn orders(&self, filter: OrderFilter) -> StoreResult<Vec<Order>> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|record| filter.user_id.is_none_or(|user_id| record.user_id == user_id))
            .filter_map(OrderRecord::to_order)
            .collect();
        orders.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state.orders.get_mut(&id) {
            Some(record) if record.status == from && from != OrderStatus::Cart => {
                record.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write();
        if users.by_login.contains_key(&user.login) {
            return Err(StoreError::duplicate(format!("login '{}'", user.login)));
        }
        users.last_id += 1;
        let user = User {
            id: UserId::new(users.last_id),
            login: user.login,
            name: user.name,
            role: user.role,
            password_hash: user.password_hash,
        };
        users.by_login.insert(user.login.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let users = self.users.read();
        Ok(users
            .by_login
            .get(login)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }
}

// =============================================================================
// MemoryTransaction
// =============================================================================

/// Writes of a transaction not yet visible to anyone else.
#[derive(Debug, Default)]
struct Staged {
    items: HashMap<ItemId, Item>,
    orders: HashMap<OrderId, OrderRecord>,
    /// `None` frees the slot.
    open_baskets: HashMap<UserId, Option<OrderId>>,
    last_order_id: Option<i64>,
}

/// Transaction over a [`MemoryStore`].
pub struct MemoryTransaction {
    state: OwnedMutexGuard<ShopState>,
    staged: Staged,
}

impl MemoryTransaction {
    fn item(&self, id: ItemId) -> Option<&Item> {
        self.staged.items.get(&id).or_else(|| self.state.items.get(&id))
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        if !self.staged.items.contains_key(&id) {
            let item = self.state.items.get(&id)?.clone();
            self.staged.items.insert(id, item);
        }
        self.staged.items.get_mut(&id)
    }

    fn record(&self, id: OrderId) -> Option<&OrderRecord> {
        self.staged.orders.get(&id).or_else(|| self.state.orders.get(&id))
    }

    fn record_mut(&mut self, id: OrderId) -> StoreResult<&mut OrderRecord> {
        if !self.staged.orders.contains_key(&id) {
            let record = self
                .state
                .orders
                .get(&id)
                .cloned()
                .ok_or_else(|| StoreError::corrupt(format!("order {id} vanished")))?;
            self.staged.orders.insert(id, record);
        }
        self.staged
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::corrupt(format!("order {id} vanished")))
    }

    fn open_basket_id(&self, user_id: UserId) -> Option<OrderId> {
        match self.staged.open_baskets.get(&user_id) {
            Some(slot) => *slot,
            None => self.state.open_baskets.get(&user_id).copied(),
        }
    }

    fn next_order_id(&mut self) -> OrderId {
        let next = self.staged.last_order_id.unwrap_or(self.state.last_order_id) + 1;
        self.staged.last_order_id = Some(next);
        OrderId::new(next)
    }
}

#[async_trait]
impl StockLedger for MemoryTransaction {
    async fn reserve(&mut self, item_id: ItemId, quantity: u32) -> StoreResult<Reservation> {
        let grantable = self
            .item(item_id)
            .is_some_and(|item| item.is_available && item.stock >= quantity);
        if !grantable {
            return Ok(Reservation::Unavailable);
        }

        let Some(item) = self.item_mut(item_id) else {
            return Ok(Reservation::Unavailable);
        };
        item.stock -= quantity;
        if item.stock == 0 {
            item.is_available = false;
        }
        Ok(Reservation::Reserved {
            unit_price: item.price,
        })
    }

    async fn release(&mut self, item_id: ItemId, quantity: u32) -> StoreResult<()> {
        let item = self
            .item_mut(item_id)
            .ok_or_else(|| StoreError::corrupt(format!("released unknown item {item_id}")))?;
        let stock = item.stock.checked_add(quantity).ok_or_else(|| {
            StoreError::corrupt(format!("stock of item {item_id} overflows on release"))
        })?;
        if item.stock == 0 && !item.pulled {
            item.is_available = true;
        }
        item.stock = stock;
        Ok(())
    }
}

#[async_trait]
impl BasketLedger for MemoryTransaction {
    async fn find_basket(&mut self, user_id: UserId) -> StoreResult<Option<Basket>> {
        let Some(id) = self.open_basket_id(user_id) else {
            return Ok(None);
        };
        let record = self
            .record(id)
            .ok_or_else(|| StoreError::corrupt(format!("open basket {id} has no row")))?;
        Ok(Some(Basket::with_items(id, user_id, record.items.clone())))
    }

    async fn open_basket(&mut self, user_id: UserId) -> StoreResult<Basket> {
        if let Some(basket) = self.find_basket(user_id).await? {
            return Ok(basket);
        }

        let id = self.next_order_id();
        self.staged.orders.insert(
            id,
            OrderRecord {
                id,
                user_id,
                items: Vec::new(),
                status: OrderStatus::Cart,
                date: None,
            },
        );
        self.staged.open_baskets.insert(user_id, Some(id));
        debug!(user_id = %user_id, order_id = %id, "Opened basket");
        Ok(Basket::new(id, user_id))
    }

    async fn write_lines(&mut self, basket: &Basket) -> StoreResult<()> {
        let record = self.record_mut(basket.id)?;
        if record.status != OrderStatus::Cart {
            return Err(StoreError::corrupt(format!(
                "order {} is not an open basket",
                basket.id
            )));
        }
        record.items = basket.items.clone();
        Ok(())
    }

    async fn close_basket(
        &mut self,
        basket: &Basket,
        committed_at: DateTime<Utc>,
    ) -> StoreResult<Order> {
        let record = self.record_mut(basket.id)?;
        if record.status != OrderStatus::Cart {
            return Err(StoreError::corrupt(format!(
                "order {} is not an open basket",
                basket.id
            )));
        }
        record.items = basket.items.clone();
        record.status = OrderStatus::Committed;
        record.date = Some(committed_at);
        let order = record
            .to_order()
            .ok_or_else(|| StoreError::corrupt("committed order has no date"))?;

        self.staged.open_baskets.insert(basket.user_id, None);
        Ok(order)
    }
}

#[async_trait]
impl ShopTransaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { mut state, staged } = *self;

        state.items.extend(staged.items);
        state.orders.extend(staged.orders);
        for (user_id, slot) in staged.open_baskets {
            match slot {
                Some(id) => state.open_baskets.insert(user_id, id),
                None => state.open_baskets.remove(&user_id),
            };
        }
        if let Some(last) = staged.last_order_id {
            state.last_order_id = last;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
