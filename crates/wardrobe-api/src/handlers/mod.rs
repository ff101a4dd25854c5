// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness and readiness
//! - [`auth`]: register, login, logout
//! - [`items`]: catalog reads and admin stock edits
//! - [`basket`]: the caller's open basket
//! - [`orders`]: checkout and order administration

mod auth;
mod basket;
mod health;
mod items;
mod orders;

pub use auth::*;
pub use basket::*;
pub use health::*;
pub use items::*;
pub use orders::*;
