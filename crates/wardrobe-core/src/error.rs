// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for the shop domain.
//!
//! ```text
//! ShopError (lifecycle, catalog, orders)
//! └── StoreError  - backing store failures, the only retryable class
//! ```
//!
//! Every lifecycle precondition failure is a typed variant so callers can
//! tell "this is sold out" apart from "you have nothing to commit".
//!
//! ```
//! use wardrobe_core::error::{ShopError, StoreError};
//! use wardrobe_core::types::ItemId;
//!
//! let sold_out = ShopError::ItemUnavailable { item_id: ItemId::new(5) };
//! assert!(!sold_out.is_retryable());
//!
//! let store: ShopError = StoreError::unavailable("pool timed out").into();
//! assert!(store.is_retryable());
//! ```

use thiserror::Error;

use crate::types::{ItemId, OrderId, OrderStatus, UserId};

/// Result alias for shop operations.
pub type ShopResult<T> = Result<T, ShopError>;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// ShopError
// =============================================================================

/// Typed outcome of a failed shop operation.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The item is sold out, pulled from sale, or unknown.
    #[error("Item {item_id} is not available")]
    ItemUnavailable {
        /// Requested item.
        item_id: ItemId,
    },

    /// The basket has no line for this item.
    #[error("Basket has no line for item {item_id}")]
    LineNotFound {
        /// Requested item.
        item_id: ItemId,
    },

    /// The user has no open basket.
    #[error("User {user_id} has no open basket")]
    NoOpenBasket {
        /// Basket owner.
        user_id: UserId,
    },

    /// Commit was requested on a basket without lines.
    #[error("Basket of user {user_id} is empty")]
    EmptyBasket {
        /// Basket owner.
        user_id: UserId,
    },

    /// A referenced resource does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource kind.
        resource: &'static str,
        /// Resource id.
        id: String,
    },

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// Administrative status change not allowed from the current status.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Target order.
        order_id: OrderId,
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Input rejected before reaching the store.
    #[error("{0}")]
    Validation(String),

    /// Backing store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ShopError {
    /// Creates a not found error.
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns `true` if an outer layer may retry the whole operation.
    ///
    /// Lifecycle failures reflect real unavailability or caller misuse and are
    /// never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ShopError::Store(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Stable identifier for logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ShopError::ItemUnavailable { .. } => "item_unavailable",
            ShopError::LineNotFound { .. } => "line_not_found",
            ShopError::NoOpenBasket { .. } => "no_open_basket",
            ShopError::EmptyBasket { .. } => "empty_basket",
            ShopError::NotFound { .. } => "not_found",
            ShopError::Conflict(_) => "conflict",
            ShopError::InvalidTransition { .. } => "invalid_transition",
            ShopError::Validation(_) => "validation",
            ShopError::Store(_) => "store",
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Backing store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or timed out.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// A unique key already exists.
    #[error("Duplicate {what}")]
    Duplicate {
        /// What collided.
        what: String,
    },

    /// Query or transaction failed.
    #[error("Store backend error: {message}")]
    Backend {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Stored data violates a model invariant.
    #[error("Corrupted data: {message}")]
    Corrupt {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate(what: impl Into<String>) -> Self {
        Self::Duplicate { what: what.into() }
    }

    /// Creates a backend error with its cause.
    pub fn backend<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a corrupted data error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Returns `true` for transient failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. } | StoreError::Backend { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_errors_not_retryable() {
        let errors = [
            ShopError::ItemUnavailable {
                item_id: ItemId::new(1),
            },
            ShopError::LineNotFound {
                item_id: ItemId::new(1),
            },
            ShopError::NoOpenBasket {
                user_id: UserId::new(1),
            },
            ShopError::EmptyBasket {
                user_id: UserId::new(1),
            },
        ];
        for error in errors {
            assert!(!error.is_retryable(), "{error}");
        }
    }

    #[test]
    fn test_store_errors() {
        assert!(StoreError::unavailable("down").is_retryable());
        assert!(!StoreError::duplicate("login").is_retryable());
        assert!(!StoreError::corrupt("bad row").is_retryable());

        let err: ShopError = StoreError::corrupt("bad row").into();
        assert_eq!(err.kind(), "store");
    }

    #[test]
    fn test_messages() {
        let err = ShopError::InvalidTransition {
            order_id: OrderId::new(4),
            from: OrderStatus::Delivered,
            to: OrderStatus::Cart,
        };
        assert_eq!(err.to_string(), "Order 4 cannot move from delivered to cart");
        assert_eq!(
            ShopError::not_found("item", 9).to_string(),
            "item not found: 9"
        );
    }
}
