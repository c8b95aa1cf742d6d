use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ragserve::commands;

#[derive(Parser)]
#[command(name = "ragserve")]
#[command(about = "Retrieval-grounded question answering over a local document corpus")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "ragserve.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the corpus and run the HTTP server
    Serve,
    /// Rebuild the vector index from the corpus directory
    Ingest,
    /// Show corpus and index statistics
    Status,
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => commands::serve(&cli.config).await,
        Commands::Ingest => commands::ingest(&cli.config).await,
        Commands::Status => commands::status(&cli.config).await,
        Commands::Config {
            command: ConfigCommands::Show,
        } => commands::show_config(&cli.config),
    }
}
