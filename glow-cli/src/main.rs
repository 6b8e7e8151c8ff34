//! Glow CLI
//!
//! Command-line interface for submitting photos to the Glow analysis backend
//! and tracking the resulting jobs.

mod commands;
mod config;
mod photo;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use glow_client::{ClientConfig, RequestTimeouts};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "glow")]
#[command(about = "Glow style analysis CLI", long_about = None)]
struct Cli {
    /// Backend URL [default: $GLOW_API_URL or http://localhost:3000]
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token of the signed-in user
    #[arg(long, env = "GLOW_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glow_cli=info,glow_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let client = match cli.api_url {
        Some(api_url) => {
            let client = ClientConfig::new(api_url).with_timeouts(RequestTimeouts::from_env());
            client.validate()?;
            client
        }
        None => ClientConfig::from_env()?,
    };

    debug!(
        api_url = %client.base_url,
        timeouts = ?client.timeouts,
        has_token = cli.token.is_some(),
        "Loaded configuration"
    );

    let config = Config {
        client,
        token: cli.token,
    };

    handle_command(cli.command, &config).await
}
