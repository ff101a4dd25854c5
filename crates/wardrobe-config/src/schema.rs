// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for Wardrobe.
//!
//! ```text
//! WardrobeConfig
//! ├── server: ServerConfig
//! ├── jwt: JwtSettings
//! ├── store: StoreConfig
//! ├── bootstrap: BootstrapConfig
//! └── logging: LoggingConfig
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default token lifetime in seconds (24 hours).
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 86_400;

/// Secrets shorter than this are accepted with a warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Default database pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for Wardrobe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WardrobeConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token configuration.
    #[serde(default)]
    pub jwt: JwtSettings,

    /// Backing store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Accounts created at startup.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WardrobeConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.jwt.validate()?;
        self.store.validate()?;
        self.bootstrap.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix for all routes. Empty serves at the root.
    #[serde(default)]
    pub base_path: String,

    /// Allowed CORS origins. `*` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_request_timeout() -> u64 {
    30
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "cannot be zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation(
                "server.max_body_size",
                "cannot be zero",
            ));
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(ConfigError::validation(
                "server.base_path",
                "must start with '/'",
            ));
        }
        Ok(())
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the shutdown timeout as a Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            base_path: String::new(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

// =============================================================================
// JWT
// =============================================================================

/// Token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtSettings {
    /// HMAC signing secret.
    #[serde(default)]
    pub secret: SecretValue,

    /// Token issuer.
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_jwt_expiration")]
    pub expiration_secs: u64,

    /// Signing algorithm.
    #[serde(default)]
    pub algorithm: JwtAlgorithm,

    /// Clock skew tolerance in seconds.
    #[serde(default)]
    pub leeway_secs: u64,

    /// Keep a deny list so logout revokes tokens.
    #[serde(default)]
    pub revocation: bool,
}

fn default_jwt_issuer() -> String {
    "wardrobe".to_string()
}

fn default_jwt_expiration() -> u64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

impl JwtSettings {
    /// Validates the JWT configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.secret.is_empty() {
            return Err(ConfigError::missing_field("jwt.secret"));
        }
        if self.expiration_secs == 0 {
            return Err(ConfigError::validation(
                "jwt.expiration_secs",
                "cannot be zero",
            ));
        }
        if self.issuer.is_empty() {
            return Err(ConfigError::validation("jwt.issuer", "cannot be empty"));
        }
        if self.secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                length = self.secret.len(),
                "jwt.secret is shorter than {} bytes",
                RECOMMENDED_SECRET_LEN
            );
        }
        Ok(())
    }

    /// Returns the expiration as a Duration.
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: SecretValue::default(),
            issuer: default_jwt_issuer(),
            expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            algorithm: JwtAlgorithm::default(),
            leeway_secs: 0,
            revocation: false,
        }
    }
}

/// JWT signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256.
    #[default]
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    HS512,
}

impl JwtAlgorithm {
    /// Returns the JOSE name.
    pub fn as_str(&self) -> &'static str {
        match self {
            JwtAlgorithm::HS256 => "HS256",
            JwtAlgorithm::HS384 => "HS384",
            JwtAlgorithm::HS512 => "HS512",
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Which store backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on restart.
    #[default]
    Memory,
    /// PostgreSQL via a connection pool.
    Postgres,
}

impl StoreBackend {
    /// Returns the backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgres => "postgres",
        }
    }
}

/// Backing store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Connection URL, required for `postgres`.
    #[serde(default)]
    pub url: Option<SecretValue>,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply the schema at startup.
    #[serde(default = "default_true")]
    pub migrate: bool,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl StoreConfig {
    /// Validates the store configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == StoreBackend::Postgres
            && self.url.as_ref().is_none_or(|url| url.is_empty())
        {
            return Err(ConfigError::missing_field("store.url"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "store.max_connections",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the acquire timeout as a Duration.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: default_acquire_timeout(),
            migrate: true,
        }
    }
}

// =============================================================================
// Bootstrap
// =============================================================================

/// Accounts ensured at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Administrator account, created if the login does not exist.
    #[serde(default)]
    pub admin: Option<AdminAccount>,
}

impl BootstrapConfig {
    /// Validates the bootstrap configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(admin) = &self.admin {
            if admin.login.trim().is_empty() {
                return Err(ConfigError::missing_field("bootstrap.admin.login"));
            }
            if admin.password.is_empty() {
                return Err(ConfigError::missing_field("bootstrap.admin.password"));
            }
        }
        Ok(())
    }
}

/// Administrator credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminAccount {
    /// Login name.
    pub login: String,
    /// Plain-text password, hashed before storage.
    pub password: SecretValue,
    /// Display name.
    #[serde(default = "default_admin_name")]
    pub name: String,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, accepting `warning` as `warn`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Text,
    /// Single-line compact format.
    Compact,
    /// JSON format for log shippers.
    Json,
}

impl LogFormat {
    /// Parses a format name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "text" | "pretty" | "full" => Some(LogFormat::Text),
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never prints its contents.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}
