// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer-token authorization middleware.
//!
//! [`AuthLayer`] is attached per route group with the [`RoleSet`] that group
//! accepts. Rejected requests never reach the inner service.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tower::{Layer, Service};
use uuid::Uuid;

use wardrobe_core::types::{Role, Subject};

use crate::auth::{Claims, DenyList, JwtManager, RequestContext, RoleSet, TokenError};
use crate::error::ApiError;

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Decision
// =============================================================================

/// Why a request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthRejection {
    /// No usable bearer token was presented.
    #[error("no bearer token")]
    MissingToken,
    /// The token failed validation.
    #[error("invalid token: {0}")]
    InvalidToken(TokenError),
    /// The token was revoked by logout.
    #[error("token revoked")]
    Revoked,
    /// The token is valid but its role is not accepted here.
    #[error("role {role} not in {required}")]
    Forbidden {
        /// Role carried by the token.
        role: Role,
        /// Roles the route accepts.
        required: RoleSet,
    },
}

impl From<AuthRejection> for ApiError {
    fn from(rejection: AuthRejection) -> Self {
        match rejection {
            AuthRejection::Forbidden { .. } => ApiError::forbidden(rejection.to_string()),
            _ => ApiError::unauthorized(rejection.to_string()),
        }
    }
}

/// Decides whether a request may proceed.
///
/// Pure with respect to shop state: only the codec and the deny list are
/// consulted.
pub fn authorize(
    authorization: Option<&HeaderValue>,
    codec: &JwtManager,
    deny_list: Option<&DenyList>,
    required: RoleSet,
) -> Result<(Subject, Claims), AuthRejection> {
    let token = authorization
        .and_then(extract_bearer_token)
        .ok_or(AuthRejection::MissingToken)?;

    let claims = codec.decode(token).map_err(AuthRejection::InvalidToken)?;
    let subject = claims.subject().map_err(AuthRejection::InvalidToken)?;

    if deny_list.is_some_and(|list| list.is_revoked(&claims.jti)) {
        return Err(AuthRejection::Revoked);
    }

    if !required.contains(subject.role) {
        return Err(AuthRejection::Forbidden {
            role: subject.role,
            required,
        });
    }

    Ok((subject, claims))
}

/// Extracts the token from a `Bearer <token>` header value.
pub fn extract_bearer_token(value: &HeaderValue) -> Option<&str> {
    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer enforcing a role set on the wrapped routes.
#[derive(Clone)]
pub struct AuthLayer {
    codec: Arc<JwtManager>,
    deny_list: Option<Arc<DenyList>>,
    required: RoleSet,
}

impl AuthLayer {
    /// Creates a layer accepting `required`.
    pub fn new(codec: Arc<JwtManager>, required: RoleSet) -> Self {
        Self {
            codec,
            deny_list: None,
            required,
        }
    }

    /// Also rejects tokens present in `deny_list`.
    pub fn with_deny_list(mut self, deny_list: Option<Arc<DenyList>>) -> Self {
        self.deny_list = deny_list;
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            codec: self.codec.clone(),
            deny_list: self.deny_list.clone(),
            required: self.required,
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer-token authorization.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    codec: Arc<JwtManager>,
    deny_list: Option<Arc<DenyList>>,
    required: RoleSet,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let decision = authorize(
            req.headers().get(header::AUTHORIZATION),
            &self.codec,
            self.deny_list.as_deref(),
            self.required,
        );

        let mut inner = self.inner.clone();

        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .unwrap_or_else(Uuid::now_v7);

        Box::pin(async move {
            let (subject, claims) = match decision {
                Ok(granted) => granted,
                Err(rejection) => {
                    tracing::debug!(
                        request_id = %request_id,
                        reason = %rejection,
                        "Request rejected"
                    );
                    return Ok(ApiError::from(rejection).into_response());
                }
            };

            let ctx = RequestContext::new(request_id)
                .with_subject(subject)
                .with_token(claims.jti, claims.exp);
            req.extensions_mut().insert(ctx);

            inner.call(req).await
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::StatusCode;
    use wardrobe_core::types::UserId;

    use super::*;
    use crate::auth::JwtConfig;

    fn codec() -> JwtManager {
        JwtManager::new(JwtConfig::new("middleware-test-secret-long-enough")).unwrap()
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    fn user() -> Subject {
        Subject::new(UserId::new(1), Role::User)
    }

    fn admin() -> Subject {
        Subject::new(UserId::new(2), Role::Admin)
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(&HeaderValue::from_static("Bearer mytoken123")),
            Some("mytoken123")
        );
        assert_eq!(
            extract_bearer_token(&HeaderValue::from_static("Basic abc")),
            None
        );
        assert_eq!(extract_bearer_token(&HeaderValue::from_static("Bearer ")), None);
        assert_eq!(extract_bearer_token(&HeaderValue::from_static("Bearer")), None);
    }

    #[test]
    fn test_missing_token() {
        let codec = codec();
        assert_eq!(
            authorize(None, &codec, None, RoleSet::SHOPPER).unwrap_err(),
            AuthRejection::MissingToken
        );
        assert_eq!(
            authorize(
                Some(&HeaderValue::from_static("Basic abc")),
                &codec,
                None,
                RoleSet::SHOPPER
            )
            .unwrap_err(),
            AuthRejection::MissingToken
        );
    }

    #[test]
    fn test_invalid_token_kinds() {
        let codec = codec();

        let garbage = authorize(Some(&bearer("x.y.z")), &codec, None, RoleSet::SHOPPER);
        assert_eq!(
            garbage.unwrap_err(),
            AuthRejection::InvalidToken(TokenError::Malformed)
        );

        let claims = Claims::new(user(), -60).with_issuer(codec.issuer());
        let expired = codec.create_token(&claims).unwrap();
        assert_eq!(
            authorize(Some(&bearer(&expired)), &codec, None, RoleSet::SHOPPER).unwrap_err(),
            AuthRejection::InvalidToken(TokenError::Expired)
        );
    }

    #[test]
    fn test_role_matrix() {
        let codec = codec();
        let user_token = codec.issue(user()).unwrap();
        let admin_token = codec.issue(admin()).unwrap();

        let (subject, _) =
            authorize(Some(&bearer(&user_token)), &codec, None, RoleSet::SHOPPER).unwrap();
        assert_eq!(subject, user());

        assert_eq!(
            authorize(Some(&bearer(&user_token)), &codec, None, RoleSet::ADMIN).unwrap_err(),
            AuthRejection::Forbidden {
                role: Role::User,
                required: RoleSet::ADMIN
            }
        );

        for required in [RoleSet::ADMIN, RoleSet::SHOPPER] {
            let (subject, _) =
                authorize(Some(&bearer(&admin_token)), &codec, None, required).unwrap();
            assert_eq!(subject, admin());
        }
    }

    #[test]
    fn test_revoked_token() {
        let codec = codec();
        let deny_list = DenyList::new();
        let token = codec.issue(user()).unwrap();
        let claims = codec.decode(&token).unwrap();

        assert!(authorize(Some(&bearer(&token)), &codec, Some(&deny_list), RoleSet::SHOPPER).is_ok());

        deny_list.revoke(claims.jti, claims.exp);
        assert_eq!(
            authorize(Some(&bearer(&token)), &codec, Some(&deny_list), RoleSet::SHOPPER)
                .unwrap_err(),
            AuthRejection::Revoked
        );
    }

    #[test]
    fn test_rejection_status() {
        let unauthorized: ApiError = AuthRejection::Revoked.into();
        assert_eq!(unauthorized.status_code(), StatusCode::UNAUTHORIZED);

        let forbidden: ApiError = AuthRejection::Forbidden {
            role: Role::User,
            required: RoleSet::ADMIN,
        }
        .into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_middleware_short_circuits_and_injects_context() {
        use tower::ServiceExt;

        let codec = Arc::new(codec());
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let service = AuthLayer::new(codec.clone(), RoleSet::ADMIN).layer(tower::service_fn(
            move |req: Request<Body>| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    let ctx = req.extensions().get::<RequestContext>().cloned();
                    let status = match ctx.and_then(|c| c.subject().ok()) {
                        Some(subject) if subject.role == Role::Admin => StatusCode::OK,
                        _ => StatusCode::INTERNAL_SERVER_ERROR,
                    };
                    let mut response = Response::new(Body::empty());
                    *response.status_mut() = status;
                    Ok::<_, std::convert::Infallible>(response)
                }
            },
        ));

        let request = |token: Option<String>| {
            let mut builder = Request::builder().uri("/orders");
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            builder.body(Body::empty()).unwrap()
        };

        let response = service.clone().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let user_token = codec.issue(user()).unwrap();
        let response = service.clone().oneshot(request(Some(user_token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let admin_token = codec.issue(admin()).unwrap();
        let response = service.clone().oneshot(request(Some(admin_token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
