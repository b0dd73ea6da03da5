use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use vidscout::cli;

#[derive(Parser)]
#[command(
    name = "vidscout",
    about = "vidscout — extract video candidates from listing pages and pick one at random",
    version
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the configured sources and pick one random video candidate
    Pick {
        /// Path to a JSON config file overriding the built-in defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seed the random draws for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Fall back to a headless Chromium fetch when plain HTTP fails
        #[arg(long)]
        browser: bool,
    },
    /// List the configured source URLs in order
    Sources {
        /// Path to a JSON config file overriding the built-in defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Pick {
            config,
            seed,
            browser,
        } => cli::pick_cmd::run(config.as_deref(), seed, browser, cli.json).await,
        Commands::Sources { config } => cli::sources_cmd::run(config.as_deref(), cli.json),
    }
}
