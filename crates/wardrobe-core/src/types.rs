// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for Wardrobe.
//!
//! Money is carried as `i64` minor units and quantities as `u32` everywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ShopError, ShopResult};

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier.
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw integer value.
            #[inline]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

integer_id!(
    /// A unique identifier for a user account.
    ///
    /// ```
    /// use wardrobe_core::types::UserId;
    ///
    /// let id: UserId = "42".parse().unwrap();
    /// assert_eq!(id.get(), 42);
    /// ```
    UserId
);

integer_id!(
    /// A unique identifier for a catalog item.
    ItemId
);

integer_id!(
    /// A unique identifier for an order row (open basket or committed order).
    OrderId
);

// =============================================================================
// Roles & Subjects
// =============================================================================

/// Access tier of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    User,
    /// Catalog and order administrator.
    Admin,
}

impl Role {
    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Returned when parsing a role name that is not `user` or `admin`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// The authenticated identity derived from a validated token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Account id.
    pub id: UserId,
    /// Access tier.
    pub role: Role,
}

impl Subject {
    /// Creates a new subject.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

// =============================================================================
// Users
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Account id.
    pub id: UserId,
    /// Unique login name.
    pub login: String,
    /// Display name.
    pub name: String,
    /// Access tier.
    pub role: Role,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

impl User {
    /// Returns the subject this account authenticates as.
    pub fn subject(&self) -> Subject {
        Subject::new(self.id, self.role)
    }
}

/// Fields required to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name.
    pub login: String,
    /// Display name.
    pub name: String,
    /// Access tier.
    pub role: Role,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

// =============================================================================
// Catalog
// =============================================================================

/// A catalog item together with its stock counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item id.
    pub id: ItemId,
    /// Category label.
    pub category: String,
    /// Size label.
    pub size: String,
    /// Current catalog price in minor units.
    pub price: i64,
    /// Target gender label.
    pub sex: String,
    /// Image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<i64>,
    /// Brand reference.
    pub brand_id: i64,
    /// Authoritative availability flag consulted on reservation.
    pub is_available: bool,
    /// Withdrawn from sale by an administrator. Released units never put a
    /// pulled item back on sale.
    #[serde(default)]
    pub pulled: bool,
    /// Units left for reservation.
    pub stock: u32,
}

/// Fields required to create a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    /// Category label.
    pub category: String,
    /// Size label.
    pub size: String,
    /// Catalog price in minor units.
    pub price: i64,
    /// Target gender label.
    pub sex: String,
    /// Image reference.
    #[serde(default)]
    pub image_id: Option<i64>,
    /// Brand reference.
    pub brand_id: i64,
    /// Initial stock.
    #[serde(default)]
    pub stock: u32,
}

impl NewItem {
    /// Materializes the item under the given id. Availability follows stock.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            category: self.category,
            size: self.size,
            price: self.price,
            sex: self.sex,
            image_id: self.image_id,
            brand_id: self.brand_id,
            is_available: self.stock > 0,
            pulled: false,
            stock: self.stock,
        }
    }
}

/// Offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Rows to skip.
    pub offset: u32,
    /// Maximum rows to return.
    pub limit: u32,
}

impl Page {
    /// Largest page size a caller may request.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates a page, clamping the limit to `1..=MAX_LIMIT`.
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Lifecycle status of an order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Open basket, still mutable.
    Cart,
    /// Committed order snapshot.
    Committed,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled by an administrator.
    Cancelled,
}

impl OrderStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Cart => "cart",
            OrderStatus::Committed => "committed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Returns `true` if an administrator may move an order from `self` to `next`.
    ///
    /// Nothing ever transitions into `Cart`; the basket-to-order step is owned by
    /// the basket lifecycle, not by status edits.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Committed, Shipped) | (Shipped, Delivered) | (Committed, Cancelled) | (Shipped, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(OrderStatus::Cart),
            "committed" => Ok(OrderStatus::Committed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Returned when parsing an unknown order status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

/// One line of a basket or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Reserved item.
    pub item_id: ItemId,
    /// Reserved units.
    pub quantity: u32,
    /// Catalog price captured when the first unit was reserved.
    pub unit_price: i64,
}

impl OrderItem {
    /// Quantity times unit price, `None` on overflow.
    pub fn line_total(&self) -> Option<i64> {
        i64::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// Sums the line totals of `items`, `None` on overflow.
pub fn checked_total(items: &[OrderItem]) -> Option<i64> {
    items
        .iter()
        .try_fold(0i64, |sum, line| sum.checked_add(line.line_total()?))
}

/// Sums the line totals of `items`, saturating at `i64::MAX`.
///
/// Stored baskets always fit: [`Basket::add_unit`] refuses a unit that would
/// overflow the total.
pub fn total_price(items: &[OrderItem]) -> i64 {
    checked_total(items).unwrap_or(i64::MAX)
}

/// The open, mutable order of a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    /// Order row backing the basket.
    pub id: OrderId,
    /// Owner.
    pub user_id: UserId,
    /// Lines in insertion order.
    pub items: Vec<OrderItem>,
    /// Sum of line totals.
    pub price: i64,
}

impl Basket {
    /// Creates an empty basket.
    pub fn new(id: OrderId, user_id: UserId) -> Self {
        Self::with_items(id, user_id, Vec::new())
    }

    /// Creates a basket from stored lines and derives its price.
    pub fn with_items(id: OrderId, user_id: UserId, items: Vec<OrderItem>) -> Self {
        let price = total_price(&items);
        Self {
            id,
            user_id,
            items,
            price,
        }
    }

    /// Returns `true` when the basket has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reserved quantity of `item_id`, zero if absent.
    pub fn quantity_of(&self, item_id: ItemId) -> u32 {
        self.items
            .iter()
            .find(|line| line.item_id == item_id)
            .map_or(0, |line| line.quantity)
    }

    /// Adds one unit of `item_id`.
    ///
    /// An existing line keeps its snapshotted price; a new line records `unit_price`.
    /// Fails with `Validation` and leaves the basket untouched when the line
    /// quantity or the basket total would overflow.
    pub fn add_unit(&mut self, item_id: ItemId, unit_price: i64) -> ShopResult<()> {
        let mut items = self.items.clone();
        match items.iter_mut().find(|line| line.item_id == item_id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(1)
                    .ok_or_else(|| ShopError::validation("basket line quantity out of range"))?;
            }
            None => items.push(OrderItem {
                item_id,
                quantity: 1,
                unit_price,
            }),
        }

        let price = checked_total(&items)
            .ok_or_else(|| ShopError::validation("basket total exceeds the supported price range"))?;
        self.items = items;
        self.price = price;
        Ok(())
    }

    /// Removes one unit of `item_id`, dropping the line at zero.
    ///
    /// Returns `false` without touching the basket if there is no such line.
    pub fn remove_unit(&mut self, item_id: ItemId) -> bool {
        let Some(pos) = self.items.iter().position(|line| line.item_id == item_id) else {
            return false;
        };
        if self.items[pos].quantity > 1 {
            self.items[pos].quantity -= 1;
        } else {
            self.items.remove(pos);
        }
        self.recompute_price();
        true
    }

    /// Re-derives `price` from the lines.
    pub fn recompute_price(&mut self) {
        self.price = total_price(&self.items);
    }
}

/// An immutable order snapshot produced by committing a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order id (the id the basket had).
    pub id: OrderId,
    /// Commit timestamp.
    pub date: DateTime<Utc>,
    /// Owner.
    pub user_id: UserId,
    /// Lines as they were at commit.
    pub items: Vec<OrderItem>,
    /// Price as it was at commit.
    pub price: i64,
    /// Current administrative status.
    pub status: OrderStatus,
}

/// Narrows an order listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders owned by this user.
    pub user_id: Option<UserId>,
}

impl OrderFilter {
    /// Orders of a single user.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
