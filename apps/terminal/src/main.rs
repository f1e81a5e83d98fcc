use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{
    load_settings, ChatTurnController, HttpAskClient, JsonFileStore, StyledMarkdown,
    ThemeController, TurnOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod view;

use view::TerminalView;

#[derive(Parser, Debug)]
#[command(name = "chat", about = "Terminal client for an /ask chat backend")]
struct Args {
    /// Backend root, e.g. http://127.0.0.1:5001
    #[arg(long)]
    server_url: Option<String>,
    /// TOML settings file (defaults to ./chat.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Send each query without the previous turns
    #[arg(long)]
    no_history: bool,
    /// Ask a single question and exit
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if args.no_history {
        settings.send_history = false;
    }

    let backend = HttpAskClient::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let mut themes = ThemeController::new(JsonFileStore::open(settings.preferences_path()?));
    let mut view = TerminalView::new(std::io::stdout());
    if let Err(err) = themes.start(system_prefers_dark(), &mut view) {
        tracing::warn!("theme preference not saved: {err}");
    }

    let mut chat = ChatTurnController::new(backend, view, StyledMarkdown)
        .with_history_mode(settings.history_mode());

    if let Some(query) = args.query {
        return match chat.submit_turn(&query).await {
            TurnOutcome::Failed(err) => Err(anyhow!(err)),
            TurnOutcome::Skipped => Err(anyhow!("query is empty")),
            TurnOutcome::Answered(_) => Ok(()),
        };
    }

    chat.view_mut().banner(&settings.server_url);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        chat.view_mut().prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/theme" => {
                if let Err(err) = themes.toggle(chat.view_mut()) {
                    tracing::warn!("theme preference not saved: {err}");
                }
            }
            _ => {
                chat.submit_turn(&line).await;
            }
        }
    }

    Ok(())
}

/// Reads the terminal background from `COLORFGBG` ("fg;bg"); dark when unknown.
fn system_prefers_dark() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(background_is_dark)
        .unwrap_or(true)
}

fn background_is_dark(colorfgbg: &str) -> Option<bool> {
    let bg = colorfgbg.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    Some(bg < 7 || bg == 8)
}
