use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lightblocks=info".parse()?))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Publish(args) => commands::publish::run(args).await,
    }
}
