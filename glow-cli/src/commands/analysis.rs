//! Analysis command handlers
//!
//! Handles submitting photos, checking and waiting on jobs, and browsing
//! past analyses.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use glow_client::{AnalysisClient, CancellationToken, PollError, PollOptions};
use glow_core::domain::analysis::{Analysis, AnalysisStatus};
use glow_core::dto::analysis::CreateAnalysisRequest;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::photo::encode_photo;

/// Options controlling how long `wait` keeps polling
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct WaitArgs {
    /// Status checks before giving up
    #[arg(long, default_value_t = PollOptions::DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Milliseconds between status checks
    #[arg(long, default_value_t = 5000)]
    interval_ms: u64,
}

/// Analysis subcommands
#[derive(Subcommand)]
pub enum AnalysisCommands {
    /// Submit photos for analysis
    Create {
        /// Face photo (required)
        #[arg(long)]
        face: PathBuf,

        /// Full-body photo
        #[arg(long)]
        body: Option<PathBuf>,

        /// Wait for the analysis to finish
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        poll: WaitArgs,
    },
    /// Show the current status of an analysis
    Status {
        /// Analysis ID
        id: String,
    },
    /// Show a finished analysis
    Get {
        /// Analysis ID
        id: String,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },
    /// Wait for an analysis to finish and show it
    Wait {
        /// Analysis ID
        id: String,

        #[command(flatten)]
        poll: WaitArgs,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },
    /// Delete an analysis
    Delete {
        /// Analysis ID
        id: String,
    },
    /// List all analyses of the signed-in user
    List,
}

/// Handle analysis commands
pub async fn handle_analysis_command(command: AnalysisCommands, config: &Config) -> Result<()> {
    let client = config.api_client();

    match command {
        AnalysisCommands::Create {
            face,
            body,
            wait,
            poll,
        } => create_analysis(&client, face, body, wait.then_some(poll)).await,
        AnalysisCommands::Status { id } => show_status(&client, &id).await,
        AnalysisCommands::Get { id, json } => get_analysis(&client, &id, json).await,
        AnalysisCommands::Wait { id, poll, json } => wait_for_analysis(&client, &id, poll, json).await,
        AnalysisCommands::Delete { id } => delete_analysis(&client, &id).await,
        AnalysisCommands::List => list_analyses(&client).await,
    }
}

/// Submit photos, optionally waiting for the result
async fn create_analysis(
    client: &AnalysisClient,
    face: PathBuf,
    body: Option<PathBuf>,
    wait: Option<WaitArgs>,
) -> Result<()> {
    let mut req = CreateAnalysisRequest::new(encode_photo(&face)?);
    if let Some(body) = body {
        req = req.with_body_photo(encode_photo(&body)?);
    }

    let created = client
        .create_analysis(req)
        .await
        .context("Failed to submit analysis")?;

    println!("{}", "✓ Analysis submitted".green().bold());
    println!("  ID:        {}", created.analysis_id.cyan());
    println!("  Status:    {}", colorize_status(created.status));
    if !created.estimated_time.is_empty() {
        println!("  Estimated: {}", created.estimated_time);
    }

    match wait {
        Some(poll) => {
            println!();
            wait_for_analysis(client, &created.analysis_id, poll, false).await
        }
        None => Ok(()),
    }
}

/// Show the status of a single analysis
async fn show_status(client: &AnalysisClient, id: &str) -> Result<()> {
    let status = client.check_analysis_status(id).await?;

    println!("Analysis {}: {}", id.cyan(), colorize_status(status.status));
    if let Some(error) = status.error.filter(|_| status.status == AnalysisStatus::Failed) {
        println!("  Error: {}", error.red());
    }

    Ok(())
}

/// Get and display a single analysis
async fn get_analysis(client: &AnalysisClient, id: &str, json: bool) -> Result<()> {
    let analysis = client.get_analysis(id).await?;
    print_analysis(&analysis, json)
}

/// Poll until the analysis finishes; Ctrl-C stops waiting quietly
///
/// Progress goes to stderr so stdout carries only the result.
async fn wait_for_analysis(
    client: &AnalysisClient,
    id: &str,
    poll: WaitArgs,
    json: bool,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let options = PollOptions::default()
        .with_max_attempts(poll.max_attempts)
        .with_base_interval(Duration::from_millis(poll.interval_ms))
        .with_cancellation(cancel)
        .on_progress(progress_printer(std::io::stderr()));

    eprintln!("Waiting for analysis {}", id.cyan());
    let outcome = client.poller().poll_until_complete(id, options).await;
    signal_task.abort();

    match outcome {
        Ok(analysis) => {
            eprintln!();
            print_analysis(&analysis, json)
        }
        Err(PollError::Cancelled) => {
            eprintln!("{}", "Stopped waiting; the analysis keeps running.".dimmed());
            Ok(())
        }
        Err(e @ PollError::AttemptsExhausted { .. }) => Err(anyhow::Error::new(e).context(format!(
            "Analysis {} is still running; check again later with `glow analysis wait {}`",
            id, id
        ))),
        Err(e) => Err(e).context(format!("Analysis {} did not complete", id)),
    }
}

/// Writes one line per status change to `out`
fn progress_printer(
    mut out: impl Write + Send + 'static,
) -> impl FnMut(AnalysisStatus) + Send + 'static {
    let mut last = None;
    move |status| {
        if last != Some(status) {
            // Best effort; a closed stderr is not an error here
            let _ = writeln!(out, "  {} {}", "…".dimmed(), colorize_status(status));
            last = Some(status);
        }
    }
}

/// Delete an analysis
async fn delete_analysis(client: &AnalysisClient, id: &str) -> Result<()> {
    client.delete_analysis(id).await?;
    println!("{} Deleted analysis {}", "✓".green(), id.cyan());
    Ok(())
}

/// List all analyses
async fn list_analyses(client: &AnalysisClient) -> Result<()> {
    let response = client.list_user_analyses().await?;

    if response.analyses.is_empty() {
        println!("{}", "No analyses found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} analysis(es):", response.count).bold());
    println!();
    for analysis in &response.analyses {
        print_analysis_summary(analysis);
    }

    Ok(())
}

/// Print a one-entry summary of an analysis
fn print_analysis_summary(analysis: &Analysis) {
    println!("  {} Analysis {}", "▸".cyan(), analysis.id.dimmed());
    println!("    Status:   {}", colorize_status(analysis.status));
    if let Some(created) = analysis.created_at {
        println!(
            "    Created:  {}",
            created.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    if let Some(season) = analysis.seasonal_type() {
        println!("    Season:   {}", season);
    }
    println!();
}

/// Print detailed analysis information
fn print_analysis(analysis: &Analysis, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }

    println!("{}", "Analysis Details:".bold());
    println!("  ID:         {}", analysis.id.cyan());
    println!("  Status:     {}", colorize_status(analysis.status));
    if let Some(tier) = analysis.tier {
        println!("  Tier:       {:?}", tier);
    }
    if let Some(created) = analysis.created_at {
        println!("  Created:    {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(completed) = analysis.completed_at {
        println!("  Completed:  {}", completed.format("%Y-%m-%d %H:%M:%S"));
        if let Some(created) = analysis.created_at {
            let seconds = completed.signed_duration_since(created).num_seconds();
            println!("  Duration:   {}s", seconds);
        }
    }

    if let Some(season) = analysis.seasonal_type() {
        println!("  Season:     {}", season.green());
    }
    if let Some(kibbe) = analysis.kibbe_type() {
        println!("  Kibbe type: {}", kibbe.green());
    }

    if let Some(matches) = analysis.celebrity_matches.as_ref().filter(|m| !m.is_empty()) {
        println!("\n{}", "Celebrity Matches:".bold());
        for m in matches {
            println!(
                "  {} ({:.0}%) {}",
                m.name.cyan(),
                m.similarity * 100.0,
                m.match_reason.dimmed()
            );
        }
    }

    if let Some(error) = &analysis.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }

    Ok(())
}

/// Colorize analysis status for display
fn colorize_status(status: AnalysisStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        AnalysisStatus::Pending => status_str.yellow(),
        AnalysisStatus::Processing => status_str.cyan(),
        AnalysisStatus::Completed => status_str.green(),
        AnalysisStatus::Failed => status_str.red(),
    }
}
