// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request-scoped identity context.
//!
//! A [`RequestContext`] is created by the authorization layer and stored in
//! the request's extensions. It lives exactly as long as the request; there
//! is no ambient or global copy. Handlers read it through the
//! [`Context`](crate::extractors::Context) and
//! [`CurrentUser`](crate::extractors::CurrentUser) extractors.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use wardrobe_core::types::{Role, Subject, UserId};

/// Failure to read a value that was never attached to the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The requested value is absent.
    #[error("{0} not present in request context")]
    NotPresent(&'static str),
}

/// Identity and tracing data attached to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Authenticated account, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Role of the authenticated account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// `jti` of the presented token.
    #[serde(skip)]
    pub token_id: Option<String>,
    /// `exp` of the presented token (Unix timestamp).
    #[serde(skip)]
    pub token_expires_at: Option<i64>,
}

impl RequestContext {
    /// Creates an empty context for the given request.
    pub fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            user_id: None,
            role: None,
            token_id: None,
            token_expires_at: None,
        }
    }

    /// Attaches a user id.
    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Attaches a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Attaches both parts of a subject.
    pub fn with_subject(self, subject: Subject) -> Self {
        self.with_user_id(subject.id).with_role(subject.role)
    }

    /// Attaches the presented token's id and expiry, needed for logout.
    pub fn with_token(mut self, token_id: impl Into<String>, expires_at: i64) -> Self {
        self.token_id = Some(token_id.into());
        self.token_expires_at = Some(expires_at);
        self
    }

    /// Returns the authenticated user id.
    pub fn user_id(&self) -> Result<UserId, ContextError> {
        self.user_id.ok_or(ContextError::NotPresent("user_id"))
    }

    /// Returns the authenticated role.
    pub fn role(&self) -> Result<Role, ContextError> {
        self.role.ok_or(ContextError::NotPresent("role"))
    }

    /// Returns the authenticated subject.
    pub fn subject(&self) -> Result<Subject, ContextError> {
        Ok(Subject::new(self.user_id()?, self.role()?))
    }

    /// Returns `true` if no subject is attached.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}
