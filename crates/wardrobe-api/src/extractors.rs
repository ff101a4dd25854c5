// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use axum::{
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use wardrobe_core::types::{Page, Subject};

use crate::auth::RequestContext;
use crate::error::ApiError;

// =============================================================================
// Context Extractors
// =============================================================================

/// Extractor for the request context installed by the auth layer.
///
/// Only valid on routes behind [`AuthLayer`](crate::middleware::AuthLayer).
/// A missing context means the route was wired without the layer, which is
/// a server fault rather than a client one.
pub struct Context(pub RequestContext);

impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(Context)
            .ok_or_else(|| ApiError::internal("Request context missing on protected route"))
    }
}

/// Extractor for the authenticated subject.
///
/// ```rust,ignore
/// async fn handler(CurrentUser(subject): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", subject.id)
/// }
/// ```
pub struct CurrentUser(pub Subject);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Context(ctx) = Context::from_request_parts(parts, state).await?;
        ctx.subject()
            .map(CurrentUser)
            .map_err(|e| ApiError::internal(e.to_string()))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for JSON payloads.
///
/// Malformed bodies are reported as 400 with the deserializer's message.
pub struct ValidatedJson<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Pagination Extractor
// =============================================================================

/// Query parameters for pagination.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PaginationParams {
    /// Rows to skip.
    #[serde(default)]
    pub offset: u32,
    /// Maximum rows to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    20
}

impl PaginationParams {
    /// Validates the pagination parameters.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.limit == 0 || self.limit > Page::MAX_LIMIT {
            return Err(ApiError::validation(format!(
                "limit must be between 1 and {}",
                Page::MAX_LIMIT
            )));
        }
        Ok(())
    }

    /// Converts to a store page.
    pub fn page(&self) -> Page {
        Page::new(self.offset, self.limit)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
        }
    }
}

/// Extractor for pagination parameters.
pub struct Pagination(pub PaginationParams);

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid pagination parameters: {}", e)))?;

        params.validate()?;
        Ok(Pagination(params))
    }
}

// =============================================================================
// Id Extractor
// =============================================================================

/// Extractor for a numeric id in the path (`/items/{id}`, `/basket/{item_id}`).
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: From<i64>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid path: {}", e)))?;

        let id: i64 = raw
            .parse()
            .map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))?;

        Ok(IdPath(T::from(id)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;
    use wardrobe_core::types::{Role, UserId};

    #[test]
    fn test_pagination_validation() {
        assert!(PaginationParams::default().validate().is_ok());

        let zero = PaginationParams {
            offset: 0,
            limit: 0,
        };
        assert!(zero.validate().is_err());

        let too_large = PaginationParams {
            offset: 0,
            limit: 500,
        };
        assert!(too_large.validate().is_err());
    }

    #[test]
    fn test_pagination_page() {
        let params = PaginationParams {
            offset: 40,
            limit: 10,
        };
        assert_eq!(params.page(), Page::new(40, 10));
    }

    #[tokio::test]
    async fn test_current_user_reads_context() {
        let subject = Subject::new(UserId::new(5), Role::User);
        let (mut parts, _) = Request::builder()
            .uri("/basket")
            .body(())
            .unwrap()
            .into_parts();
        parts
            .extensions
            .insert(RequestContext::new(Uuid::now_v7()).with_subject(subject));

        let CurrentUser(found) = CurrentUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(found, subject);
    }

    #[tokio::test]
    async fn test_missing_context_is_server_fault() {
        let (mut parts, _) = Request::builder()
            .uri("/basket")
            .body(())
            .unwrap()
            .into_parts();

        let err = match CurrentUser::from_request_parts(&mut parts, &()).await {
            Ok(_) => panic!("context should be missing"),
            Err(e) => e,
        };
        assert!(err.is_server_error());
    }
}
