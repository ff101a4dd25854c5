// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every failure a handler can produce maps to an HTTP status code and a
//! JSON error body. Domain errors from the core are converted here, so
//! handlers just use `?`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wardrobe_core::{ShopError, StoreError};

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unauthorized (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// Forbidden (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Input validation failed (400).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
        /// Field-specific errors.
        #[source]
        errors: Option<ValidationErrors>,
    },

    /// Login or password did not match (422).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Conflict (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// Service unavailable (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },

    /// Domain error from the shop core.
    #[error(transparent)]
    Shop(ShopError),
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error with field errors.
    pub fn validation_with_errors(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Shop(e) => shop_status(e),
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
            ApiError::Shop(e) => shop_code(e),
        }
    }

    /// Returns a user-facing error message.
    ///
    /// Safe to show to clients: server-side failures never expose their cause.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Unauthorized { .. } => "Authentication required".to_string(),
            ApiError::Forbidden { .. } => "Access denied".to_string(),
            ApiError::Validation { message, .. } => format!("Validation failed: {}", message),
            ApiError::InvalidCredentials => "Invalid login or password".to_string(),
            ApiError::Conflict { message } => message.clone(),
            ApiError::ServiceUnavailable { .. } => {
                "Service temporarily unavailable".to_string()
            }
            ApiError::Internal { .. } => "An internal error occurred".to_string(),
            ApiError::Shop(ShopError::Store(_)) => "An internal error occurred".to_string(),
            ApiError::Shop(e) => e.to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

fn shop_status(err: &ShopError) -> StatusCode {
    match err {
        ShopError::ItemUnavailable { .. }
        | ShopError::LineNotFound { .. }
        | ShopError::EmptyBasket { .. }
        | ShopError::InvalidTransition { .. }
        | ShopError::Validation(_) => StatusCode::BAD_REQUEST,
        ShopError::NoOpenBasket { .. } | ShopError::NotFound { .. } => StatusCode::NOT_FOUND,
        ShopError::Conflict(_) => StatusCode::CONFLICT,
        ShopError::Store(StoreError::Duplicate { .. }) => StatusCode::CONFLICT,
        ShopError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn shop_code(err: &ShopError) -> &'static str {
    match err {
        ShopError::ItemUnavailable { .. } => "ITEM_UNAVAILABLE",
        ShopError::LineNotFound { .. } => "LINE_NOT_FOUND",
        ShopError::NoOpenBasket { .. } => "NO_OPEN_BASKET",
        ShopError::EmptyBasket { .. } => "EMPTY_BASKET",
        ShopError::NotFound { .. } => "NOT_FOUND",
        ShopError::Conflict(_) => "CONFLICT",
        ShopError::InvalidTransition { .. } => "INVALID_TRANSITION",
        ShopError::Validation(_) => "VALIDATION_ERROR",
        ShopError::Store(StoreError::Duplicate { .. }) => "CONFLICT",
        ShopError::Store(_) => "INTERNAL_ERROR",
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.user_message();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                details: self.error_details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation {
                errors: Some(errors),
                ..
            } => Some(serde_json::to_value(errors).unwrap_or_default()),
            ApiError::Shop(ShopError::ItemUnavailable { item_id })
            | ApiError::Shop(ShopError::LineNotFound { item_id }) => {
                Some(serde_json::json!({ "item_id": item_id }))
            }
            ApiError::Shop(ShopError::InvalidTransition { order_id, from, to }) => {
                Some(serde_json::json!({ "order_id": order_id, "from": from, "to": to }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Collection of field validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    /// Field-specific errors.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates a new validation errors collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts to an ApiError if there are errors.
    pub fn into_result<T>(self, success: T) -> ApiResult<T> {
        if self.is_empty() {
            Ok(success)
        } else {
            Err(ApiError::validation_with_errors("Validation failed", self))
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation errors", self.fields.len())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        match err {
            ShopError::Store(StoreError::Unavailable { message }) => {
                ApiError::service_unavailable(message)
            }
            other => ApiError::Shop(other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ShopError::Store(err).into()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::internal(format!("Blocking task failed: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wardrobe_core::types::{ItemId, OrderId, OrderStatus, UserId};

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::not_found("order").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::unauthorized("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::forbidden("no access").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::validation("login too short").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_shop_error_mapping() {
        let item_id = ItemId::new(1);
        let user_id = UserId::new(2);
        let cases = [
            (ShopError::ItemUnavailable { item_id }, StatusCode::BAD_REQUEST, "ITEM_UNAVAILABLE"),
            (ShopError::LineNotFound { item_id }, StatusCode::BAD_REQUEST, "LINE_NOT_FOUND"),
            (ShopError::EmptyBasket { user_id }, StatusCode::BAD_REQUEST, "EMPTY_BASKET"),
            (ShopError::NoOpenBasket { user_id }, StatusCode::NOT_FOUND, "NO_OPEN_BASKET"),
            (ShopError::not_found("order", 9), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ShopError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                ShopError::InvalidTransition {
                    order_id: OrderId::new(1),
                    from: OrderStatus::Delivered,
                    to: OrderStatus::Shipped,
                },
                StatusCode::BAD_REQUEST,
                "INVALID_TRANSITION",
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), status, "{api}");
            assert_eq!(api.error_code(), code);
        }
    }

    #[test]
    fn test_store_failure_is_opaque() {
        let api: ApiError = StoreError::corrupt("order 7 has no commit date").into();

        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error_code(), "INTERNAL_ERROR");
        assert_eq!(api.user_message(), "An internal error occurred");
        assert!(api.is_server_error());
    }

    #[test]
    fn test_unreachable_store_is_503() {
        let api: ApiError = ShopError::from(StoreError::unavailable("pool timed out")).into();

        assert_eq!(api.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.error_code(), "SERVICE_UNAVAILABLE");
        assert_eq!(api.user_message(), "Service temporarily unavailable");
    }

    #[test]
    fn test_duplicate_login_is_conflict() {
        let api: ApiError = StoreError::duplicate("login").into();
        assert_eq!(api.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_errors() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());
        assert!(errors.clone().into_result(()).is_ok());

        errors.add("login", "must be at least 5 characters");
        errors.add("password", "must be at least 8 characters");

        assert_eq!(errors.fields.len(), 2);
        let err = errors.into_result(()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
