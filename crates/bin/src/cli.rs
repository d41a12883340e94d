//! CLI argument definitions for the Lightblocks binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lightblocks::queue::DEFAULT_CAPACITY;

/// Queue URL used when none is given.
pub const DEFAULT_QUEUE_URL: &str = "http://127.0.0.1:5672/commands";

/// Lightblocks ordered key/value server and command publisher
#[derive(Parser, Debug)]
#[command(name = "lightblocks")]
#[command(about = "Lightblocks: insertion-ordered key/value service fed by a command queue")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Consume commands from the queue and apply them to the ordered map
    Serve(ServeArgs),
    /// Publish a JSON file of commands to a running server
    Publish(PublishArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Queue URL to listen on, e.g. http://0.0.0.0:5672/commands
    #[arg(env = "LIGHTBLOCKS_QUEUE_URL")]
    pub queue_url: String,

    /// File that read results are written to (created or truncated)
    #[arg(env = "LIGHTBLOCKS_OUTPUT")]
    pub output: PathBuf,

    /// Messages buffered between the queue endpoint and the dispatcher
    #[arg(long, default_value_t = DEFAULT_CAPACITY, env = "LIGHTBLOCKS_QUEUE_CAPACITY")]
    pub capacity: usize,
}

/// Arguments for the publish command
#[derive(clap::Args, Debug)]
pub struct PublishArgs {
    /// Path to a JSON array of commands
    #[arg(short, long)]
    pub file: PathBuf,

    /// Queue URL of the server to publish to
    #[arg(short, long, default_value = DEFAULT_QUEUE_URL, env = "LIGHTBLOCKS_QUEUE_URL")]
    pub queue_url: String,
}
