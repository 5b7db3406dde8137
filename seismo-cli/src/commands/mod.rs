//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod data;
mod job;
mod quake;

pub use data::DataCommands;
pub use job::JobCommands;
pub use quake::QuakeCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use seismo_client::SeismoClient;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Dataset management
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
    /// Earthquake queries
    Quake {
        #[command(subcommand)]
        command: QuakeCommands,
    },
    /// Chart jobs and results
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Check that the API is reachable
    Health,
    /// Print the API usage summary
    Usage,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Data { command } => data::handle_data_command(command, config).await,
        Commands::Quake { command } => quake::handle_quake_command(command, config).await,
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Health => health(config).await,
        Commands::Usage => usage(config).await,
    }
}

async fn health(config: &Config) -> Result<()> {
    let client = SeismoClient::new(&config.api_url);

    match client.health().await {
        Ok(true) => println!("{} API at {} is up", "✓".green(), config.api_url),
        Ok(false) => println!("{} API at {} is unhealthy", "✗".red(), config.api_url),
        Err(e) => println!("{} API at {} is unreachable: {}", "✗".red(), config.api_url, e),
    }

    Ok(())
}

async fn usage(config: &Config) -> Result<()> {
    let client = SeismoClient::new(&config.api_url);
    print!("{}", client.help().await?);
    Ok(())
}
