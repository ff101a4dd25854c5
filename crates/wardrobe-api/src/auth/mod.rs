// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - The session token codec
//! - Per-request identity context
//! - Role sets used by the authorization layer
//! - Password hashing and the session manager

mod claims;
mod context;
mod deny_list;
mod jwt;
pub mod password;
mod roles;
mod session;

pub use claims::Claims;
pub use context::{ContextError, RequestContext};
pub use deny_list::DenyList;
pub use jwt::{JwtConfig, JwtManager, TokenError};
pub use roles::RoleSet;
pub use session::{Credentials, Registration, SessionManager};
