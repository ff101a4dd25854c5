// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod issue_token;
mod run;
mod validate;
mod version;

pub use issue_token::issue_token;
pub use run::run;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands, LogFormat};
use crate::error::BinResult;
use crate::logging::init_logging;

/// Executes the appropriate command based on CLI arguments.
///
/// `run` installs logging itself once the config file is loaded.
pub async fn execute(cli: Cli) -> BinResult<()> {
    let command = cli.effective_command();
    if !matches!(command, Commands::Run) {
        init_logging(
            cli.effective_log_level("warn"),
            cli.effective_log_format(LogFormat::Text),
        )?;
    }

    match command {
        Commands::Run => run::run(&cli).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::IssueToken(args) => issue_token::issue_token(&cli, args),
    }
}
