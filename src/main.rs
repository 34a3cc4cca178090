//! Razer Chroma Driver CLI
//!
//! A command-line interface for controlling Razer Chroma lighting.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use chroma_driver::DriverConfig;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;
use commands::Context;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let config_path = cli.config.unwrap_or_else(DriverConfig::default_path);
    debug!("Loading config from {:?}", config_path);
    let config = DriverConfig::load(&config_path)?;
    let ctx = Context::new(config, cli.pid)?;

    match cli.command {
        None => commands::query::info(&ctx, false),
        Some(Commands::List) => commands::query::list(&ctx),
        Some(Commands::Info { json }) => commands::query::info(&ctx, json),
        Some(Commands::Brightness { level }) => commands::set::brightness(&ctx, level),
        Some(Commands::Led { led, action }) => commands::set::led(&ctx, led, action),
        Some(Commands::Effect { effect }) => commands::set::effect(&ctx, effect),
        Some(Commands::Reset) => commands::set::reset(&ctx),
        Some(Commands::Fill { color }) => commands::matrix::fill(&ctx, color),
        Some(Commands::Row { row, colors, start }) => {
            commands::matrix::row(&ctx, row, start, &colors)
        }
        Some(Commands::Animate { fps }) => commands::matrix::animate(&ctx, fps),
    }
}
