// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("Wardrobe - retail shop backend");
    println!();
    println!("Version Information:");
    println!("  wardrobe-bin:    {}", crate::VERSION);
    println!("  wardrobe-core:   {}", wardrobe_core::VERSION);
    println!("  wardrobe-api:    {}", wardrobe_api::VERSION);
    println!("  wardrobe-store:  {}", wardrobe_store::VERSION);
    println!();
    println!("Build Information:");
    println!("  Rust Edition: 2024");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("Features:");
    println!(
        "  PostgreSQL:   {}",
        if cfg!(feature = "postgres") { "enabled" } else { "disabled" }
    );
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
