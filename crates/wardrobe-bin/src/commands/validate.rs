// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use serde_json::Value;

use wardrobe_config::schema::RECOMMENDED_SECRET_LEN;
use wardrobe_config::{StoreBackend, WardrobeConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Paths blanked out before a config is printed.
const SECRET_POINTERS: &[&str] = &["/jwt/secret", "/store/url", "/bootstrap/admin/password"];

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = wardrobe_config::load_config(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen: {}", config.server.socket_addr());
            if !config.server.base_path.is_empty() {
                println!("  Base path: {}", config.server.base_path);
            }
            println!("  Store: {}", config.store.backend.as_str());
            println!("  Token lifetime: {}s", config.jwt.expiration_secs);
            println!(
                "  Revocation: {}",
                if config.jwt.revocation { "enabled" } else { "disabled" }
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", pretty(&redacted(&config)?)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "store": config.store.backend.as_str(),
                    "revocation": config.jwt.revocation,
                    "bootstrap_admin": config.bootstrap.admin.is_some(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(redacted(&config)?) } else { None },
            });
            println!("{}", pretty(&output)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Settings that are valid but probably not what production wants.
pub fn collect_warnings(config: &WardrobeConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.jwt.secret.len() < RECOMMENDED_SECRET_LEN {
        warnings.push(format!(
            "jwt.secret is shorter than {} bytes",
            RECOMMENDED_SECRET_LEN
        ));
    }
    if !config.jwt.revocation {
        warnings.push("jwt.revocation is disabled; logout does not invalidate tokens".to_string());
    }
    if config.store.backend == StoreBackend::Memory {
        warnings.push("store.backend is memory; data is lost on restart".to_string());
    }
    if config.bootstrap.admin.is_none() {
        warnings.push("No bootstrap admin; admin routes are unusable until one exists".to_string());
    }

    warnings
}

fn redacted(config: &WardrobeConfig) -> BinResult<Value> {
    let mut value = serde_json::to_value(config)
        .map_err(|e| BinError::runtime(format!("Failed to serialize config: {}", e)))?;
    for pointer in SECRET_POINTERS {
        if let Some(slot) = value.pointer_mut(pointer) {
            if !slot.is_null() {
                *slot = Value::String("***".to_string());
            }
        }
    }
    Ok(value)
}

fn pretty(value: &Value) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to render output: {}", e)))
}
