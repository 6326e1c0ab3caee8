//! # fitclip CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Log lookup for a video (`find-log`)
//! - Telemetry export for a video (`extract`)
//! - Session listing and config validation

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::debug;

use cli::{Cli, Commands};
use commands::{run_extract, run_find_log, run_sessions, run_validate};
use pipeline::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    debug!(version = env!("CARGO_PKG_VERSION"), "fitclip starting");

    let result = match &cli.command {
        Commands::FindLog(args) => match load_config(cli.config.as_deref()) {
            Ok(config) => run_find_log(args, config).await,
            Err(e) => Err(e),
        },
        Commands::Extract(args) => match load_config(cli.config.as_deref()) {
            Ok(config) => run_extract(args, config).await,
            Err(e) => Err(e),
        },
        Commands::Sessions(args) => {
            load_config(cli.config.as_deref()).and_then(|config| run_sessions(args, config))
        }
        Commands::Validate(args) => run_validate(args, cli.config.as_deref()),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging (and metrics) based on CLI options
fn init_observability(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: default_log_level.to_string(),
    })
}
