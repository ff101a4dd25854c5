// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # wardrobe-store
//!
//! Backends for the `ShopStore` trait.
//!
//! - [`MemoryStore`]: single-process store for development and tests. A
//!   transaction holds the store lock until it commits or is dropped.
//! - `PgStore` (feature `postgres`): PostgreSQL via sqlx. Reservations are a
//!   single conditional `UPDATE`, so the item row lock linearizes them.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "postgres")]
pub use postgres::PgStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
