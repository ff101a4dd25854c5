// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Builds the full router over a fresh [`MemoryStore`] and drives it with
//! `tower::ServiceExt::oneshot`, so every request passes through the same
//! middleware stack as production.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use wardrobe_api::{ApiConfig, ApiServer, AppState, JwtConfig};
use wardrobe_core::{Item, Subject, UserId};
use wardrobe_store::MemoryStore;

use super::fixtures::{ItemFixtures, TEST_PASSWORD, TEST_SECRET};

/// Largest body the harness will buffer.
const MAX_BODY: usize = 1024 * 1024;

/// Login of the harness administrator.
pub const ADMIN_LOGIN: &str = "harness-admin";

// =============================================================================
// TestApp
// =============================================================================

/// A router plus the state behind it.
pub struct TestApp {
    router: Router,
    /// Shared state, for calling services directly.
    pub state: AppState,
}

impl TestApp {
    /// An app with revocation disabled.
    pub fn new() -> Self {
        Self::with_config(Self::config(false))
    }

    /// An app whose logout revokes tokens.
    pub fn with_revocation() -> Self {
        Self::with_config(Self::config(true))
    }

    /// An app over an explicit configuration.
    pub fn with_config(config: ApiConfig) -> Self {
        super::init_test_logging();

        let server = ApiServer::builder()
            .config(config)
            .store(Arc::new(MemoryStore::new()))
            .build()
            .expect("server builds");

        Self {
            router: server.router(),
            state: server.state().clone(),
        }
    }

    /// The default harness configuration.
    pub fn config(revocation: bool) -> ApiConfig {
        ApiConfig::default().with_jwt(JwtConfig::new(TEST_SECRET).with_revocation(revocation))
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    /// Sends a raw request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), MAX_BODY)
            .await
            .expect("body is readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends `method path` with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request builds")).await
    }

    /// GET helper.
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, token, None).await
    }

    /// POST helper.
    pub async fn post(&self, path: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.request(Method::POST, path, token, body).await
    }

    /// DELETE helper.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, path, token, None).await
    }

    /// PATCH helper.
    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, path, token, Some(body)).await
    }

    // -------------------------------------------------------------------------
    // Accounts
    // -------------------------------------------------------------------------

    /// Registers `login` over HTTP and returns its token and id.
    pub async fn shopper(&self, login: &str) -> (String, UserId) {
        self.shopper_at("", login).await
    }

    /// Registers `login` on a router nested under `base_path`.
    pub async fn shopper_at(&self, base_path: &str, login: &str) -> (String, UserId) {
        let response = self
            .post(
                &format!("{}/register", base_path),
                None,
                Some(serde_json::json!({ "login": login, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let token = response.token();
        let subject = self.subject_of(&token);
        (token, subject.id)
    }

    /// Ensures the harness admin exists and logs in over HTTP.
    pub async fn admin(&self) -> String {
        self.state
            .sessions
            .ensure_admin(ADMIN_LOGIN, TEST_PASSWORD, "Harness Admin")
            .await
            .expect("admin bootstraps");

        let response = self
            .post(
                "/login",
                None,
                Some(serde_json::json!({ "login": ADMIN_LOGIN, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.token()
    }

    /// Decodes the subject a token carries.
    pub fn subject_of(&self, token: &str) -> Subject {
        self.state.jwt().validate(token).expect("token is valid")
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Creates a jacket directly through the catalog service.
    pub async fn seed_item(&self, price: i64, stock: u32) -> Item {
        self.state
            .catalog
            .create_item(ItemFixtures::jacket(price, stock))
            .await
            .expect("item is created")
    }

    /// Reads an item straight from the catalog.
    pub async fn item(&self, item: &Item) -> Item {
        self.state
            .catalog
            .item(item.id)
            .await
            .expect("item exists")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TestResponse
// =============================================================================

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when empty.
    pub body: Value,
}

impl TestResponse {
    /// The `error.code` of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body.pointer("/error/code").and_then(Value::as_str)
    }

    /// The `token` of an auth body.
    pub fn token(&self) -> String {
        self.body["token"]
            .as_str()
            .expect("body carries a token")
            .to_string()
    }
}
