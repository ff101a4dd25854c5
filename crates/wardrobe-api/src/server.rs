// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method, StatusCode},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use wardrobe_core::ShopStore;

use crate::auth::{JwtManager, RoleSet};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, REQUEST_ID_HEADER};
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns a builder.
    pub fn builder() -> ApiServerBuilder {
        ApiServerBuilder::new()
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let admin = self.auth_layer(RoleSet::ADMIN);
        let shopper = self.auth_layer(RoleSet::SHOPPER);

        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
        let middleware_stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(create_cors_layer(&self.config))
            .layer(PropagateRequestIdLayer::new(request_id));

        let routes = Router::new()
            // Health endpoints (public)
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // Sessions
            .route("/register", post(handlers::register))
            .route("/login", post(handlers::login))
            .route(
                "/logout",
                post(handlers::logout).route_layer(shopper.clone()),
            )
            // Catalog
            .route(
                "/items",
                put(handlers::create_item)
                    .route_layer(admin.clone())
                    .merge(get(handlers::list_items)),
            )
            .route("/items/{id}", get(handlers::get_item))
            .route(
                "/items/{id}/stock",
                patch(handlers::restock_item).route_layer(admin.clone()),
            )
            // Basket
            .route(
                "/basket",
                get(handlers::get_basket).route_layer(shopper.clone()),
            )
            .route(
                "/basket/{item_id}",
                post(handlers::add_to_basket)
                    .merge(delete(handlers::remove_from_basket))
                    .route_layer(shopper.clone()),
            )
            // Orders
            .route(
                "/orders",
                post(handlers::commit_basket)
                    .route_layer(shopper.clone())
                    .merge(get(handlers::list_orders).route_layer(admin.clone())),
            )
            .route(
                "/orders/my",
                get(handlers::my_orders).route_layer(shopper),
            )
            .route(
                "/orders/{id}",
                get(handlers::get_order)
                    .merge(patch(handlers::update_order_status))
                    .route_layer(admin),
            )
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .with_state(self.state.clone());

        let base_path = self.config.base_path.trim_end_matches('/');
        let router = if base_path.is_empty() {
            routes
        } else {
            Router::new().nest(base_path, routes)
        };

        router.layer(middleware_stack)
    }

    fn auth_layer(&self, required: RoleSet) -> AuthLayer {
        AuthLayer::new(self.state.jwt_manager.clone(), required)
            .with_deny_list(self.state.deny_list.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!(store = self.state.store().name(), "Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let mut layer = CorsLayer::new().max_age(Duration::from_secs(cors.max_age));

    if cors.allows_any_origin() {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<_> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(AllowOrigin::list(origins));
    }

    let methods: Vec<Method> = cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    if cors.allowed_headers.iter().any(|h| h == "*") {
        layer = layer.allow_headers(Any);
    } else {
        let mut headers: Vec<HeaderName> = cors
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        if headers.is_empty() {
            headers = vec![header::AUTHORIZATION, header::CONTENT_TYPE];
        }
        layer = layer.allow_headers(headers);
    }

    layer
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
pub struct ApiServerBuilder {
    state_builder: crate::state::AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the JWT manager.
    pub fn jwt_manager(mut self, manager: Arc<JwtManager>) -> Self {
        self.state_builder = self.state_builder.jwt_manager(manager);
        self
    }

    /// Sets the backing store.
    pub fn store(mut self, store: Arc<dyn ShopStore>) -> Self {
        self.state_builder = self.state_builder.store(store);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use wardrobe_store::MemoryStore;

    fn test_server(base_path: &str) -> ApiServer {
        let config = ApiConfig::default()
            .with_jwt(JwtConfig::new("test-secret-key-that-is-long-enough"))
            .with_base_path(base_path);

        ApiServerBuilder::new()
            .config(config)
            .store(Arc::new(MemoryStore::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_server_builder() {
        let server = test_server("");
        assert_eq!(server.addr().port(), 8080);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = test_server("")
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_base_path_nesting() {
        let router = test_server("/api/v1/").router();

        let nested = router
            .clone()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(nested.status(), StatusCode::OK);

        let bare = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(bare.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_public_and_admin_share_items_path() {
        let router = test_server("").router();

        let list = router
            .clone()
            .oneshot(Request::get("/items").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(list.status(), StatusCode::OK);

        let create = router
            .oneshot(
                Request::put("/items")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
    }
}
