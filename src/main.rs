mod cli;
mod config;
mod models;
mod prayer_times;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    match cli.command {
        Some(Commands::Times { date, absolute }) => {
            handlers::handle_times(&config, date, absolute)?;
        }
        Some(Commands::Watch) => {
            handlers::handle_watch(&config)?;
        }
        Some(Commands::Config {
            latitude,
            longitude,
            notice,
            relative,
            status_icon,
        }) => {
            handlers::handle_config(
                &mut config,
                latitude,
                longitude,
                notice,
                relative,
                status_icon,
            )?;
        }
        Some(Commands::Cache { action }) => {
            handlers::handle_cache(&action)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(config)?;
        }
    }

    Ok(())
}
