//! Shroud CLI
//!
//! Seal, commit, disclose and sign confidential transaction payloads from the
//! shell. Results are printed as JSON on stdout; logs go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use shroud_cli::{Cli, run};
use shroud_core::config::load_config;
use shroud_core::tracing_init::init_from_config;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().ok();
    let mut config = load_config(cwd.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.log_json {
        config.logging.json = true;
    }
    init_from_config(&config.logging);
    debug!(version = env!("CARGO_PKG_VERSION"), "Starting shroud CLI");

    let outcome = run(cli.command, &config)?;

    let mut out = io::stdout();
    writeln!(out, "{}", serde_json::to_string_pretty(&outcome.output)?)?;

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
