//! Seismo CLI
//!
//! Command-line interface for the Seismo API: load the dataset, query
//! earthquakes, submit chart jobs and download their results.

mod commands;
mod config;
mod id_resolver;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "seismo")]
#[command(about = "Seismo earthquake data CLI", long_about = None)]
struct Cli {
    /// API URL
    #[arg(long, env = "SEISMO_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::new(cli.api_url);

    handle_command(cli.command, &config).await
}
