// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! Startup order:
//!
//! 1. Open the configured store (and apply the schema for postgres)
//! 2. Build the API server and its shared state
//! 3. Ensure the bootstrap admin account
//! 4. Serve until SIGINT/SIGTERM, then drain within `shutdown_timeout_secs`

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use wardrobe_api::{ApiConfig, ApiServer, CorsConfig, JwtConfig};
use wardrobe_config::{load_config, StoreBackend, StoreConfig, WardrobeConfig};
use wardrobe_core::ShopStore;
use wardrobe_store::MemoryStore;

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ShopRuntime
// =============================================================================

/// Owns the loaded configuration and drives the server lifecycle.
pub struct ShopRuntime {
    config: Arc<WardrobeConfig>,
    shutdown: ShutdownCoordinator,
}

impl ShopRuntime {
    /// Creates a new runtime.
    pub fn new(config: WardrobeConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &WardrobeConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!(version = wardrobe_api::VERSION, "Starting Wardrobe");

        let server = self.build_server().await?;
        let grace = self.config.server.shutdown_timeout();

        let listener = self.shutdown.clone();
        tokio::spawn(async move { listener.wait_for_shutdown().await });

        let serve = server.run_with_shutdown(self.shutdown.shutdown_signal().wait());
        let deadline = {
            let signal = self.shutdown.shutdown_signal();
            async move {
                signal.wait().await;
                tokio::time::sleep(grace).await;
            }
        };

        tokio::select! {
            result = serve => result?,
            _ = deadline => warn!(?grace, "Graceful shutdown timed out, dropping open connections"),
        }

        info!("Wardrobe shutdown complete");
        Ok(())
    }

    /// Opens the store, builds the server and ensures the bootstrap admin.
    pub async fn build_server(&self) -> BinResult<ApiServer> {
        let store = open_store(&self.config.store).await?;

        let server = ApiServer::builder()
            .config(api_config(&self.config)?)
            .store(store)
            .build()?;

        if let Some(admin) = &self.config.bootstrap.admin {
            let subject = server
                .state()
                .sessions
                .ensure_admin(&admin.login, admin.password.expose(), &admin.name)
                .await
                .map_err(|e| BinError::from(e).with_context("bootstrapping admin account"))?;
            info!(user_id = %subject.id, login = %admin.login, "Admin account ready");
        }

        Ok(server)
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// Maps the file configuration onto the API server configuration.
pub fn api_config(config: &WardrobeConfig) -> BinResult<ApiConfig> {
    let server = &config.server;

    let cors = CorsConfig {
        allowed_origins: server.cors_origins.clone(),
        ..CorsConfig::default()
    };

    Ok(ApiConfig {
        host: server.host,
        port: server.port,
        base_path: server.base_path.clone(),
        cors,
        jwt: jwt_config(config)?,
        request_timeout: server.request_timeout(),
        shutdown_timeout: server.shutdown_timeout(),
        max_body_size: server.max_body_size,
    })
}

/// Maps the `jwt` section onto the token codec configuration.
pub fn jwt_config(config: &WardrobeConfig) -> BinResult<JwtConfig> {
    let jwt = &config.jwt;

    let expiration_secs = i64::try_from(jwt.expiration_secs)
        .map_err(|_| BinError::config("jwt.expiration_secs is out of range"))?;
    let algorithm = jwt
        .algorithm
        .as_str()
        .parse()
        .map_err(|e| BinError::config(format!("jwt.algorithm: {}", e)))?;

    Ok(JwtConfig {
        secret: jwt.secret.expose().to_string(),
        issuer: jwt.issuer.clone(),
        expiration_secs,
        algorithm,
        leeway_secs: jwt.leeway_secs,
        revocation: jwt.revocation,
    })
}

/// Opens the configured store backend.
pub async fn open_store(config: &StoreConfig) -> BinResult<Arc<dyn ShopStore>> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &StoreConfig) -> BinResult<Arc<dyn ShopStore>> {
    use wardrobe_store::PgStore;

    let url = config
        .url
        .as_ref()
        .ok_or_else(|| BinError::config("store.url is required for postgres"))?;

    let store = PgStore::connect(url.expose(), config.max_connections, config.acquire_timeout())
        .await
        .map_err(|e| BinError::from(e).with_context("connecting to PostgreSQL"))?;

    if config.migrate {
        store
            .migrate()
            .await
            .map_err(|e| BinError::from(e).with_context("applying schema"))?;
    }

    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &StoreConfig) -> BinResult<Arc<dyn ShopStore>> {
    Err(BinError::config(
        "store.backend is 'postgres' but this binary was built without the 'postgres' feature",
    ))
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<std::path::PathBuf>,
    config: Option<WardrobeConfig>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: WardrobeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ShopRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("loading {}", path.display()))
                })?
            }
        };

        Ok(ShopRuntime::new(config))
    }
}

// =============================================================================
// Tests
// =============================================================================
