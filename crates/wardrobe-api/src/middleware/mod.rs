// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthLayer`]: bearer-token validation and role enforcement per route group

mod auth;

pub use auth::{
    authorize, extract_bearer_token, AuthLayer, AuthMiddleware, AuthRejection, REQUEST_ID_HEADER,
};
