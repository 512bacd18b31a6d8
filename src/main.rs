use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod balance;
mod client;
mod config;
mod handler;
mod pipeline;
mod render;
mod session;
mod transcript;
mod tui;
mod ui;

use app::App;
use client::BackendClient;
use config::Config;

#[derive(Parser)]
#[command(name = "satchat")]
#[command(about = "Chat with a pay-per-request AI backend from the terminal")]
struct Cli {
    /// Backend base URL (also read from SATCHAT_BACKEND_URL)
    #[arg(short, long, env = "SATCHAT_BACKEND_URL")]
    backend: Option<String>,

    /// Append logs to this file. The terminal itself is never logged to.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level (overridden by SATCHAT_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_file.as_deref(), cli.verbose)?;

    let config = Config::load().unwrap_or_else(|_| Config::new());
    if let Err(err) = config.save_if_missing() {
        tracing::warn!(error = %err, "could not write default config");
    }
    let backend_url = config.resolve_backend_url(cli.backend.as_deref());
    let client = BackendClient::new(&backend_url);

    tracing::info!(backend = %client.base_url(), "starting satchat");

    let mut app = App::new(client, &config);

    // Fetch the wallet balance on startup; a failure degrades the header,
    // never the chat.
    app.refresh_balance();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Reap finished requests before drawing; the tick event keeps this
        // loop turning while one is outstanding.
        app.poll_tasks().await;

        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

/// Set up tracing to a file when requested. Without a log file there is no
/// subscriber at all; the alternate screen owns the terminal.
fn init_tracing(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env("SATCHAT_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
