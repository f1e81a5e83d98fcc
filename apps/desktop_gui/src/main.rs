use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::{load_settings, JsonFileStore, ThemeController};
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use ui::DesktopChatApp;

#[derive(Parser, Debug)]
#[command(name = "chat-gui", about = "Desktop client for an /ask chat backend")]
struct Args {
    /// Backend root, e.g. http://127.0.0.1:5001
    #[arg(long)]
    server_url: Option<String>,
    /// TOML settings file (defaults to ./chat.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for saved preferences
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Send each query without the previous turns
    #[arg(long)]
    no_history: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = Some(data_dir);
    }
    if args.no_history {
        settings.send_history = false;
    }
    let preferences = settings.preferences_path()?;
    tracing::info!(server_url = %settings.server_url, preferences = %preferences.display(), "starting desktop chat");

    let (cmd_tx, cmd_rx) = bounded(16);
    let (ui_tx, ui_rx) = bounded(256);
    backend_bridge::runtime::launch(
        settings.server_url.clone(),
        settings.history_mode(),
        cmd_rx,
        ui_tx,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Ask")
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([360.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ask",
        options,
        Box::new(move |cc| {
            let system_prefers_dark = cc.egui_ctx.system_theme() == Some(egui::Theme::Dark);
            let themes = ThemeController::new(JsonFileStore::open(preferences));
            Ok(Box::new(DesktopChatApp::new(
                cmd_tx,
                ui_rx,
                themes,
                system_prefers_dark,
            )))
        }),
    )
    .map_err(|err| anyhow!("desktop ui failed: {err}"))
}
