use anyhow::Context;
use clap::Parser;
use colored::*;
use std::process;
use tracing::warn;

use dockformer_cli::{setup_logging, Cli, CommandHandler, ConfigManager};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_manager = ConfigManager::new(cli.config.clone())?;
    let config = config_manager.get_config();

    setup_logging(cli.verbose, cli.quiet, &config.log_level);
    for warning in config_manager.validate_config() {
        warn!(config = %config_manager.config_path().display(), "{}", warning);
    }

    let handler = CommandHandler::new(config, cli.format)
        .await
        .context("Failed to initialize the engine")?;

    handler.execute(cli.command).await?;
    Ok(())
}
