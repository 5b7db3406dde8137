//! Job command handlers
//!
//! Handles chart job submission, status polling and result download.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use std::path::PathBuf;
use std::time::Duration;

use seismo_client::SeismoClient;
use seismo_core::domain::job::{Job, JobStatus, JobType};
use seismo_core::domain::result::JobResult;
use seismo_core::dto::job::{JobStats, SubmitJob};

use crate::config::Config;
use crate::id_resolver::resolve_job_id;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a chart job over a date range
    Submit {
        start: String,
        end: String,

        /// Job type (magnitude_distribution, earthquake_count_by_city)
        #[arg(long = "type")]
        job_type: Option<String>,

        /// Wait until the job finishes
        #[arg(short, long)]
        wait: bool,

        /// Seconds to wait before giving up
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },
    /// List all jobs
    List,
    /// Job counts by status
    Stats,
    /// Get job details
    Get {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Fetch the result of a completed job
    Result {
        /// Job ID or unambiguous prefix
        id: String,

        /// Write the payload to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = SeismoClient::new(&config.api_url);

    match command {
        JobCommands::Submit {
            start,
            end,
            job_type,
            wait,
            timeout,
        } => {
            let wait = wait.then(|| (config.poll_interval, Duration::from_secs(timeout)));
            submit_job(&client, start, end, job_type, wait).await
        }
        JobCommands::List => list_jobs(&client).await,
        JobCommands::Stats => job_stats(&client).await,
        JobCommands::Get { id } => get_job(&client, &id).await,
        JobCommands::Result { id, output } => get_result(&client, &id, output).await,
    }
}

async fn submit_job(
    client: &SeismoClient,
    start: String,
    end: String,
    job_type: Option<String>,
    wait: Option<(Duration, Duration)>,
) -> Result<()> {
    let mut req = SubmitJob::new(start, end);
    if let Some(job_type) = job_type {
        req = req.with_type(job_type);
    }

    let job = client.submit_job(req).await?;
    println!("{} Submitted job {}", "✓".green(), job.id.cyan());

    if let Some((interval, timeout)) = wait {
        println!("{}", "  Waiting for a worker...".dimmed());
        let job = client.wait_for_job(&job.id, interval, timeout).await?;
        println!();
        print_job_details(&job);
    }

    Ok(())
}

async fn list_jobs(client: &SeismoClient) -> Result<()> {
    let ids = client.list_jobs().await?;

    if ids.is_empty() {
        println!("{}", "No jobs found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} job(s):", ids.len()).bold());
    println!();
    for id in ids {
        match client.get_job(&id).await {
            Ok(job) => print_job_summary(&job),
            Err(e) => println!("  {} Job {} {}", "▸".cyan(), id.dimmed(), e.to_string().red()),
        }
    }

    Ok(())
}

async fn job_stats(client: &SeismoClient) -> Result<()> {
    let stats = client.job_stats().await?;
    print_job_stats(&stats);
    Ok(())
}

async fn get_job(client: &SeismoClient, id: &str) -> Result<()> {
    let id = resolve_job_id(client, id).await?;
    let job = client.get_job(&id).await?;

    print_job_details(&job);

    Ok(())
}

async fn get_result(client: &SeismoClient, id: &str, output: Option<PathBuf>) -> Result<()> {
    let id = resolve_job_id(client, id).await?;
    let result = client.get_result(&id).await?;

    match (output, &result) {
        (Some(path), _) => {
            std::fs::write(&path, result.payload())
                .with_context(|| format!("Failed to write result to {}", path.display()))?;
            println!(
                "{} Wrote {} result ({} bytes) to {}",
                "✓".green(),
                result.kind(),
                result.payload().len(),
                path.display()
            );
        }
        (None, JobResult::Json(_)) => {
            let value = result.as_json()?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        (None, JobResult::Image(bytes)) => {
            println!(
                "{}",
                format!("Image result ({} bytes); use --output to save it.", bytes.len()).yellow()
            );
        }
    }

    Ok(())
}

/// Print a job summary
fn print_job_summary(job: &Job) {
    println!("  {} Job {}", "▸".cyan(), job.id.dimmed());
    println!("    Type:      {}", job.job_type);
    println!("    Status:    {}", colorize_status(&job.status));
    println!("    Range:     {} .. {}", job.start, job.end);
    println!(
        "    Submitted: {}",
        job.submitted_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.cyan());
    println!("  Type:        {}", describe_type(&job.job_type));
    println!("  Status:      {}", colorize_status(&job.status));
    println!("  Range:       {} .. {}", job.start, job.end);
    println!("  Submitted:   {}", job.submitted_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(started) = job.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(finished) = job.finished_at {
        println!("  Finished:    {}", finished.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = job.started_at {
            let duration = finished.signed_duration_since(started);
            println!("  Duration:    {}ms", duration.num_milliseconds());
        }
    }

    if let Some(lease) = job.lease_expires_at {
        println!("  Lease until: {}", lease.format("%Y-%m-%d %H:%M:%S"));
    }

    if job.status == JobStatus::Complete {
        println!(
            "\n{}",
            format!("Fetch the result with: seismo job result {}", job.id).dimmed()
        );
    }
}

fn print_job_stats(stats: &JobStats) {
    println!("{}", "Job Statistics:".bold());
    println!("  {:<12} {}", colorize_status(&JobStatus::Submitted), stats.submitted);
    println!("  {:<12} {}", colorize_status(&JobStatus::InProgress), stats.in_progress);
    println!("  {:<12} {}", colorize_status(&JobStatus::Complete), stats.complete);
    println!("  {:<12} {}", colorize_status(&JobStatus::Failed), stats.failed);

    if stats.stale_submitted > 0 {
        println!(
            "{}",
            format!("  {} submitted job(s) look stuck", stats.stale_submitted).yellow()
        );
    }
}

/// Job type with its result kind, or a marker when the API accepted an unknown type
fn describe_type(job_type: &str) -> String {
    match job_type.parse::<JobType>() {
        Ok(known) => format!("{} ({})", known, known.result_kind()),
        Err(_) => format!("{} (unknown)", job_type),
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> colored::ColoredString {
    let status_str = status.as_str();
    match status {
        JobStatus::Submitted => status_str.yellow(),
        JobStatus::InProgress => status_str.cyan(),
        JobStatus::Complete => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
