//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod analysis;

pub use analysis::AnalysisCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Analysis submission and tracking
    Analysis {
        #[command(subcommand)]
        command: AnalysisCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Analysis { command } => analysis::handle_analysis_command(command, config).await,
    }
}
