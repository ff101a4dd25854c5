// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # wardrobe-api
//!
//! HTTP surface of the Wardrobe retail backend.
//!
//! This crate provides the axum router, the session token codec, the
//! per-route-group authorization layer and the request context it installs.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wardrobe_api::{ApiConfig, ApiServer, JwtConfig};
//! use wardrobe_store::MemoryStore;
//!
//! let config = ApiConfig::default().with_jwt(JwtConfig::new(secret));
//! let server = ApiServer::builder()
//!     .config(config)
//!     .store(Arc::new(MemoryStore::new()))
//!     .build()?;
//! server.run_with_shutdown(shutdown).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{Claims, DenyList, JwtConfig, JwtManager, RequestContext, RoleSet, SessionManager, TokenError};
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use middleware::{authorize, AuthLayer, AuthRejection};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
