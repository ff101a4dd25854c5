// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use wardrobe_core::{BasketService, CatalogService, OrderService, ShopStore};

use crate::auth::{DenyList, JwtManager, SessionManager};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token codec.
    pub jwt_manager: Arc<JwtManager>,
    /// Revoked tokens, present when revocation is enabled.
    pub deny_list: Option<Arc<DenyList>>,
    /// Backing store.
    pub store: Arc<dyn ShopStore>,
    /// Registration, login and logout.
    pub sessions: SessionManager,
    /// Basket lifecycle.
    pub baskets: BasketService,
    /// Order administration.
    pub orders: OrderService,
    /// Catalog administration.
    pub catalog: CatalogService,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt_manager
    }

    /// Returns the deny list if revocation is enabled.
    pub fn deny_list(&self) -> Option<&Arc<DenyList>> {
        self.deny_list.as_ref()
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Arc<dyn ShopStore> {
        &self.store
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    jwt_manager: Option<Arc<JwtManager>>,
    store: Option<Arc<dyn ShopStore>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the JWT manager.
    pub fn jwt_manager(mut self, manager: Arc<JwtManager>) -> Self {
        self.jwt_manager = Some(manager);
        self
    }

    /// Sets the backing store.
    pub fn store(mut self, store: Arc<dyn ShopStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the AppState.
    ///
    /// The store is required; the JWT manager is derived from the config
    /// when not given.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();
        let store = self
            .store
            .ok_or_else(|| ApiError::internal("AppState requires a store"))?;

        let jwt_manager = match self.jwt_manager {
            Some(manager) => manager,
            None => Arc::new(JwtManager::new(config.jwt.clone())?),
        };

        let deny_list = config.jwt.revocation.then(|| Arc::new(DenyList::new()));

        Ok(AppState {
            sessions: SessionManager::new(store.clone(), jwt_manager.clone(), deny_list.clone()),
            baskets: BasketService::new(store.clone()),
            orders: OrderService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            config: Arc::new(config),
            jwt_manager,
            deny_list,
            store,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_manager.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for BasketService {
    fn from_ref(state: &AppState) -> Self {
        state.baskets.clone()
    }
}

impl axum::extract::FromRef<AppState> for OrderService {
    fn from_ref(state: &AppState) -> Self {
        state.orders.clone()
    }
}

impl axum::extract::FromRef<AppState> for CatalogService {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}

impl axum::extract::FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
