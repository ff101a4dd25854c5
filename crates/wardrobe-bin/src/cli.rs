// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the shop server (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `issue-token`: Mint a session token for an existing account

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use wardrobe_core::types::{Role, UserId};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Wardrobe - retail shop backend
///
/// Serves the catalog, basket and order API over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "wardrobe",
    author = "Sylvex <contact@sylvex.io>",
    version = wardrobe_core::VERSION,
    about = "Retail shop backend",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "wardrobe.yaml",
        env = "WARDROBE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format. Overrides the config file.
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the Wardrobe CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the shop server
    ///
    /// This is the default command when no subcommand is specified.
    Run,

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration file without starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Mint a session token
    ///
    /// Signs a token for an existing account id with the configured secret.
    /// The account is not looked up.
    #[command(name = "issue-token")]
    IssueToken(IssueTokenArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `issue-token` command.
#[derive(Args, Debug, Clone)]
pub struct IssueTokenArgs {
    /// Account id carried in the token
    #[arg(long)]
    pub user_id: UserId,

    /// Role carried in the token (user, admin)
    #[arg(long, default_value = "user")]
    pub role: Role,

    /// Lifetime in seconds. Defaults to `jwt.expiration_secs`.
    #[arg(long)]
    pub expires_in: Option<u64>,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<wardrobe_config::LogFormat> for LogFormat {
    fn from(format: wardrobe_config::LogFormat) -> Self {
        match format {
            wardrobe_config::LogFormat::Text => LogFormat::Text,
            wardrobe_config::LogFormat::Compact => LogFormat::Compact,
            wardrobe_config::LogFormat::Json => LogFormat::Json,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level. Flags win over `--log-level`, which wins
    /// over `fallback`.
    pub fn effective_log_level<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(fallback)
        }
    }

    /// Get the effective log format.
    pub fn effective_log_format(&self, fallback: LogFormat) -> LogFormat {
        self.log_format.unwrap_or(fallback)
    }
}

// =============================================================================
// Tests
// =============================================================================
