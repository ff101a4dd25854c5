// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wardrobe_core::types::{Role, Subject, UserId};

use super::TokenError;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id as a decimal string.
    pub sub: String,

    /// Access tier of the subject.
    pub role: Role,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Token id, used as the deny-list key.
    pub jti: String,
}

impl Claims {
    /// Creates claims for `subject` valid for `expires_in_secs` from now.
    ///
    /// A negative lifetime yields an already expired token. `exp` saturates at
    /// the ends of the `i64` range.
    pub fn new(subject: Subject, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: subject.id.to_string(),
            role: subject.role,
            iat: now,
            exp: now.saturating_add(expires_in_secs),
            iss: None,
            jti: Uuid::now_v7().to_string(),
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Decodes the subject carried by these claims.
    pub fn subject(&self) -> Result<Subject, TokenError> {
        let id: UserId = self.sub.parse().map_err(|_| TokenError::Malformed)?;
        Ok(Subject::new(id, self.role))
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}
