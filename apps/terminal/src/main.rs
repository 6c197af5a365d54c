use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, HttpDiagnosisClient};
use conversation::ConversationController;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod logging;
mod render;

use commands::{parse_line, Command};
use logging::LogTarget;
use render::{TerminalInput, TerminalLog};

/// Chat with the leaf diagnosis service from a terminal.
#[derive(Parser, Debug)]
#[command(name = "leafchat")]
struct Args {
    /// Overrides the configured diagnosis service url.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Settings file; defaults to ./leafchat.toml or the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log file; when stderr is a terminal, logs default to a file in the temp dir.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())
        .context("failed to load settings")?
        .with_base_url_override(args.api_base_url.as_deref())
        .context("invalid --api-base-url")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    let log_target = LogTarget::detect(args.log_file);
    tracing::subscriber::set_global_default(logging::subscriber(filter, &log_target)?)
        .context("failed to install log subscriber")?;
    info!(api = %settings.api_base_url, logs = ?log_target, "starting terminal chat");

    let mut controller = ConversationController::new(
        HttpDiagnosisClient::from_settings(&settings),
        TerminalLog::new(std::io::stdout()),
        TerminalInput::new(std::io::stdout()),
    );
    controller.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let Some(mounted) = controller.mounted() else {
            break;
        };
        match parse_line(mounted, &line) {
            Command::Quit => break,
            Command::Ignore => {}
            Command::Invalid(reason) => println!("{reason}"),
            Command::Event(event) => {
                if let Err(err) = controller.dispatch(event).await {
                    warn!(%err, "event refused");
                    println!("({err})");
                }
            }
        }
    }

    info!("terminal chat finished");
    Ok(())
}
