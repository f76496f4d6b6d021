use anyhow::Result;
use clap::Parser;

use codebox::Config;
use codebox::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging: --verbose wins, then config, then "info".
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        Config::load()
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Run(args) => cli::run::run(args).await,
        Commands::Shell(args) => cli::shell::run(args).await,
        Commands::Languages => cli::languages::run().await,
        Commands::Selftest => cli::selftest::run().await,
    }
}
