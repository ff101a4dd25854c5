// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # wardrobe-bin
//!
//! CLI binary for the Wardrobe shop backend.
//!
//! ```text
//!          main.rs
//!             │
//!          cli.rs ──────────────┐
//!             │                 │
//!        commands/          logging.rs
//!             │
//!        runtime.rs ── shutdown.rs
//!             │
//!   wardrobe-{config,store,api}
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! wardrobe -c /etc/wardrobe/wardrobe.yaml
//!
//! # Validate configuration
//! wardrobe validate --strict
//!
//! # Mint an operator token
//! wardrobe issue-token --user-id 1 --role admin
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, ShopRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
