// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # wardrobe-config
//!
//! Configuration management for the Wardrobe shop backend.
//!
//! - **Schema**: typed sections for server, tokens, store, bootstrap and logging
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `WARDROBE_*` variables and `${VAR}` placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use wardrobe_config::loader::load_config;
//!
//! let config = load_config("wardrobe.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, ConfigLoaderBuilder};
pub use schema::{
    AdminAccount, BootstrapConfig, JwtAlgorithm, JwtSettings, LogFormat, LogLevel,
    LoggingConfig, SecretValue, ServerConfig, StoreBackend, StoreConfig, WardrobeConfig,
};
