//! Trendline - headless trendline editor driven from the terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use trendline::runner::{self, RunOptions};
use trendline_config::Config;

#[derive(Parser, Debug)]
#[command(name = "trendline", version, about = "Draw and edit trendlines on a price chart")]
struct Cli {
    /// Configuration file (defaults to ./config.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trading pair to load, e.g. ETHUSDT
    #[arg(short, long)]
    symbol: Option<String>,

    /// Use generated price data and skip the backend
    #[arg(long)]
    offline: bool,

    /// Do not read or write stored trendlines
    #[arg(long)]
    memory: bool,
}

fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_default(),
    };

    runner::run(
        config,
        RunOptions {
            symbol: cli.symbol,
            offline: cli.offline,
            memory: cli.memory,
        },
    )
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
