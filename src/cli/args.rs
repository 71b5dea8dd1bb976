use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "salawaat",
    version,
    about = "Prayer times with a live countdown and alerts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the prayer times for today (or another day)
    Times {
        /// Day to show, as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Always show the selected day's six times, fajr first
        #[arg(long)]
        absolute: bool,
    },
    /// Run without the dashboard and print alerts as they happen
    Watch,
    /// Show or change settings
    Config {
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        longitude: Option<String>,
        /// Minutes before a prayer to alert
        #[arg(long)]
        notice: Option<u32>,
        /// Show the six times nearest to now instead of a fixed day
        #[arg(long)]
        relative: Option<bool>,
        /// Show the status lines in the dashboard footer
        #[arg(long)]
        status_icon: Option<bool>,
    },
    /// Year table cache management
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Print the cache directory
    Path,
    /// Delete every cached year table
    Clear,
}
