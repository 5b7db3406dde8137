//! Quake command handlers
//!
//! Read-only queries over the stored earthquakes.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use serde_json::Value as JsonValue;

use seismo_client::SeismoClient;
use seismo_core::domain::quake::{Earthquake, QuakeStats};
use seismo_core::dto::quake::{NearbyQuery, ScoreRangeQuery};

use crate::config::Config;

/// Quake subcommands
#[derive(Subcommand)]
pub enum QuakeCommands {
    /// List all earthquake IDs
    List,
    /// Show the stored feature of one earthquake
    Get {
        /// Earthquake ID
        id: String,
    },
    /// Earthquakes between two dates (YYYY-MM-DD or RFC 3339)
    Range { start: String, end: String },
    /// Earthquakes within a magnitude band
    Magnitude {
        #[arg(long, allow_hyphen_values = true)]
        min: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        max: Option<f64>,
    },
    /// Earthquakes within a depth band, in km
    Depth {
        #[arg(long, allow_hyphen_values = true)]
        min: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        max: Option<f64>,
    },
    /// Earthquakes near a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, default_value_t = 100.0)]
        radius_km: f64,
    },
    /// Summary statistics between two dates
    Stats { start: String, end: String },
}

pub async fn handle_quake_command(command: QuakeCommands, config: &Config) -> Result<()> {
    let client = SeismoClient::new(&config.api_url);

    match command {
        QuakeCommands::List => list_quakes(&client).await,
        QuakeCommands::Get { id } => get_quake(&client, &id).await,
        QuakeCommands::Range { start, end } => {
            let features = client.quakes_in_range(&start, &end).await?;
            print_features(&features);
            Ok(())
        }
        QuakeCommands::Magnitude { min, max } => {
            let features = client.quakes_by_magnitude(&ScoreRangeQuery { min, max }).await?;
            print_features(&features);
            Ok(())
        }
        QuakeCommands::Depth { min, max } => {
            let features = client.quakes_by_depth(&ScoreRangeQuery { min, max }).await?;
            print_features(&features);
            Ok(())
        }
        QuakeCommands::Nearby { lon, lat, radius_km } => {
            let features = client
                .quakes_nearby(&NearbyQuery { lon, lat, radius_km })
                .await?;
            print_features(&features);
            Ok(())
        }
        QuakeCommands::Stats { start, end } => {
            let stats = client.quake_stats(&start, &end).await?;
            print_stats(&stats);
            Ok(())
        }
    }
}

async fn list_quakes(client: &SeismoClient) -> Result<()> {
    let ids = client.list_quakes().await?;

    println!("{}", format!("Found {} earthquake(s):", ids.len()).bold());
    for id in ids {
        println!("  {} {}", "▸".cyan(), id);
    }

    Ok(())
}

async fn get_quake(client: &SeismoClient, id: &str) -> Result<()> {
    let feature = client.get_quake(id).await?;
    println!("{}", serde_json::to_string_pretty(&feature)?);
    Ok(())
}

fn print_features(features: &[JsonValue]) {
    if features.is_empty() {
        println!("{}", "No earthquakes found.".yellow());
        return;
    }

    println!("{}", format!("Found {} earthquake(s):", features.len()).bold());
    println!();
    for feature in features {
        match Earthquake::from_feature(feature) {
            Some(quake) => print_quake_summary(&quake),
            None => println!("  {} {}", "▸".cyan(), feature.to_string().dimmed()),
        }
    }
}

fn print_quake_summary(quake: &Earthquake) {
    println!("  {} {} {}", "▸".cyan(), format_magnitude(quake), quake.id.dimmed());
    println!("    Place: {}", quake.locality());
    println!("    Depth: {:.1} km", quake.depth);
    println!("    Time:  {}", format_time(quake.time).dimmed());
}

fn print_stats(stats: &QuakeStats) {
    println!("{}", "Earthquake Statistics:".bold());
    println!("  Count:         {}", stats.count.to_string().cyan());
    println!("  Magnitude:     {} to {}", format_opt(stats.min_magnitude), format_opt(stats.max_magnitude));
    println!("  Depth (km):    {} to {}", format_opt(stats.min_depth), format_opt(stats.max_depth));

    if !stats.magtype_counts.is_empty() {
        println!("\n{}", "Magnitude types:".bold());
        for (mag_type, count) in &stats.magtype_counts {
            println!("  {} = {}", mag_type.cyan(), count);
        }
    }
}

/// Magnitude label, coloured by severity
fn format_magnitude(quake: &Earthquake) -> ColoredString {
    let label = match &quake.mag_type {
        Some(mag_type) => format!("M{:.1} ({})", quake.mag, mag_type),
        None => format!("M{:.1}", quake.mag),
    };

    if quake.mag >= 5.0 {
        label.red().bold()
    } else if quake.mag >= 3.0 {
        label.yellow()
    } else {
        label.normal()
    }
}

/// Epoch milliseconds as a UTC timestamp
fn format_time(time_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(time_ms)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| time_ms.to_string())
}

fn format_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}
