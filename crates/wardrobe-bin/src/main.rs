// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Wardrobe server entry point.

use anyhow::Context;

use wardrobe_bin::error::report_error_and_exit;
use wardrobe_bin::{commands, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("wardrobe-worker")
        .build()
        .context("failed to start the async runtime")?;

    if let Err(error) = runtime.block_on(commands::execute(cli)) {
        report_error_and_exit(error);
    }

    Ok(())
}
