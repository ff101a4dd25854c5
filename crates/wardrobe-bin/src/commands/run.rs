// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use crate::cli::Cli;
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the server.
///
/// Logging is installed after the config is loaded so the file's `logging`
/// section applies; CLI flags still win.
pub async fn run(cli: &Cli) -> BinResult<()> {
    let runtime = RuntimeBuilder::new().config_path(&cli.config).build()?;

    let logging = &runtime.config().logging;
    init_logging(
        cli.effective_log_level(logging.level.as_str()),
        cli.effective_log_format(logging.format.into()),
    )?;

    runtime.run().await
}
