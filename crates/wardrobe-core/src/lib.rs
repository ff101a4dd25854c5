// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # wardrobe-core
//!
//! Core abstractions and shared types for the Wardrobe retail backend.
//!
//! This crate provides the foundational pieces used across all Wardrobe
//! components:
//!
//! - **Types**: identifiers, `Subject`, `Item`, `Basket`, `Order`
//! - **Error**: the shop error taxonomy
//! - **Store**: the transactional store seam (`StockLedger`, `BasketLedger`,
//!   `ShopTransaction`, `ShopStore`)
//! - **Basket**: the basket/order lifecycle state machine
//! - **Orders** and **Catalog**: administrative services over the store
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wardrobe_core::basket::BasketService;
//! use wardrobe_core::types::{ItemId, UserId};
//!
//! let baskets = BasketService::new(store.clone());
//! let basket = baskets.add_item(UserId::new(7), ItemId::new(5)).await?;
//! let order = baskets.commit(UserId::new(7)).await?;
//! assert_eq!(order.price, basket.price);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod store;
pub mod types;

// =============================================================================
// Services
// =============================================================================

pub mod basket;
pub mod catalog;
pub mod orders;

// =============================================================================
// Re-exports
// =============================================================================

pub use basket::BasketService;
pub use catalog::CatalogService;
pub use error::{ShopError, ShopResult, StoreError, StoreResult};
pub use orders::OrderService;
pub use store::{BasketLedger, Reservation, ShopStore, ShopTransaction, StockLedger};
pub use types::{
    Basket, Item, ItemId, NewItem, NewUser, Order, OrderFilter, OrderId, OrderItem, OrderStatus,
    Page, Role, Subject, User, UserId,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
