mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::load_settings;
use crossbeam_channel::{bounded, unbounded};
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::CheckersApp;

#[derive(Debug, Parser)]
#[command(name = "checkers-gui", about = "Desktop client for the checkers game service")]
struct Args {
    /// Base address of the game service, e.g. http://localhost:8080/api
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings()
        .and_then(|settings| settings.with_server_url(args.server_url))
        .context("failed to load client settings")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(server_url = %settings.server_url, "starting checkers desktop gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = unbounded::<UiEvent>();
    backend_bridge::runtime::launch(settings.server_url.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Checkers")
            .with_inner_size([640.0, 820.0])
            .with_min_inner_size([560.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Checkers",
        options,
        Box::new(move |_cc| Ok(Box::new(CheckersApp::new(cmd_tx, ui_rx, settings.server_url)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop gui exited with error: {err}"))
}
