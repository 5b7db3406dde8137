//! Data command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use seismo_client::SeismoClient;

use crate::config::Config;

/// Data subcommands
#[derive(Subcommand)]
pub enum DataCommands {
    /// Fetch the upstream feed into the store
    Load,
    /// Delete every stored record
    Delete,
}

pub async fn handle_data_command(command: DataCommands, config: &Config) -> Result<()> {
    let client = SeismoClient::new(&config.api_url);

    let response = match command {
        DataCommands::Load => client.load_data().await?,
        DataCommands::Delete => client.delete_data().await?,
    };

    println!("{} {}", "✓".green(), response.message);
    Ok(())
}
