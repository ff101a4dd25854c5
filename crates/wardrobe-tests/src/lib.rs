// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Wardrobe Integration Tests
//!
//! Shared harness and fixtures for the suites under `tests/`.
//!
//! - [`common`]: test utilities
//!   - `fixtures`: catalog items and config documents
//!   - `harness`: an in-memory app driven through the real router
//!   - `assertions`: status and error-code checks
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wardrobe-tests
//! cargo test -p wardrobe-tests --test integration_basket
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use wardrobe_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let item = app.seed_item(100, 1).await;
//!     let (token, _) = app.shopper("alice").await;
//!     let response = app.post(&format!("/basket/{}", item.id), Some(&token), None).await;
//!     assert_status(&response, StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::init_test_logging;
    pub use axum::http::StatusCode;
}
