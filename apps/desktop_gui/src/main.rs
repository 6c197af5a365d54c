use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context, Result};
use backend_bridge::{commands::BackendCommand, runtime::launch};
use clap::Parser;
use client_core::load_settings;
use controller::events::UiEvent;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::LeafChatApp;

/// Desktop chat window for the leaf diagnosis service.
#[derive(Parser, Debug)]
#[command(name = "leafchat-desktop")]
struct Args {
    /// Overrides the configured diagnosis service url.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Settings file; defaults to ./leafchat.toml or the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())
        .context("failed to load settings")?
        .with_base_url_override(args.api_base_url.as_deref())
        .context("invalid --api-base-url")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();
    info!(api = %settings.api_base_url, "starting desktop chat");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let api_base_url = settings.api_base_url.clone();
    launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("LeafChat")
            .with_inner_size([480.0, 760.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };
    let shutdown_tx = cmd_tx.clone();
    eframe::run_native(
        "LeafChat",
        options,
        Box::new(move |_cc| Ok(Box::new(LeafChatApp::new(cmd_tx, ui_rx, api_base_url)))),
    )
    .map_err(|err| anyhow!("desktop window failed: {err}"))?;

    let _ = shutdown_tx.try_send(BackendCommand::Shutdown);
    Ok(())
}
