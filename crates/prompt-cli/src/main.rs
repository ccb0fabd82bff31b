//! Command-line interface for prompt-rs

mod args;
mod commands;
mod recent;

use anyhow::Context;
use args::Cli;
use clap::Parser;
use prompt_utils::Config;
use std::process::ExitCode;
use tracing::debug;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::from_env().context("Failed to load config from environment")?,
    };
    if cli.verbose {
        config.log_level = "debug".to_string();
    }

    // Initialize tracing
    prompt_utils::init_tracing_with(&config);

    debug!(command = ?cli.command, "Starting promptctl");

    commands::run(cli.command, &config)
}
