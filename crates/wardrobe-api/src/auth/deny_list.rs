// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Revoked-token list.

use chrono::Utc;
use dashmap::DashMap;

/// Token ids revoked by logout, kept until their natural expiry.
#[derive(Debug, Default)]
pub struct DenyList {
    entries: DashMap<String, i64>,
}

impl DenyList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes `token_id` until `expires_at` (Unix timestamp).
    pub fn revoke(&self, token_id: impl Into<String>, expires_at: i64) {
        self.purge_expired();
        self.entries.insert(token_id.into(), expires_at);
    }

    /// Returns `true` if `token_id` has been revoked.
    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.entries.contains_key(token_id)
    }

    /// Drops entries whose token would be rejected as expired anyway.
    pub fn purge_expired(&self) {
        let now = Utc::now().timestamp();
        self.entries.retain(|_, expires_at| *expires_at >= now);
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is revoked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke() {
        let list = DenyList::new();
        let exp = Utc::now().timestamp() + 60;

        assert!(!list.is_revoked("a"));
        list.revoke("a", exp);
        assert!(list.is_revoked("a"));
        assert!(!list.is_revoked("b"));
    }

    #[test]
    fn test_expired_entries_purged() {
        let list = DenyList::new();
        let now = Utc::now().timestamp();

        list.revoke("old", now - 10);
        list.revoke("fresh", now + 60);

        assert!(!list.is_revoked("old"));
        assert!(list.is_revoked("fresh"));
        assert_eq!(list.len(), 1);
    }
}
