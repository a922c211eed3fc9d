//! Brewlog - A terminal coffee brewing journal.
//!
//! Keyboard-driven client for the Brewlog backend: log in, record brewings
//! with ratings, and browse the coffee catalog.

mod app;
mod cli;
mod form;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brewlog_core::auth::open_store;
use brewlog_core::config::StoreKind;
use brewlog_core::{ApiClient, Config, SessionHandle, SessionStore};

use app::{App, AppState};
use cli::Command;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name in the cache directory
const LOG_FILE: &str = "brewlog.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file so they never draw over the UI. Use the RUST_LOG env
/// var to control the level (e.g., RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = cli::parse_args(std::env::args().skip(1))?;
    if args.command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {:#}. Using defaults.", e);
            let mut config = Config::default();
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
    };
    if args.ephemeral {
        config.credential_store = StoreKind::Memory;
    }

    let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
    let _log_guard = match init_tracing(&cache_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };
    info!(api_url = %config.api_url, store = ?config.credential_store, "Brewlog starting");

    // The gateway and the session store share one session handle
    let api = ApiClient::new(&config.api_url, SessionHandle::new())
        .with_context(|| format!("Invalid API URL {}", config.api_url))?;
    let store = open_store(config.credential_store, cache_dir);
    let session = Arc::new(SessionStore::new(store, api.clone()));

    match args.command {
        Command::Login => return cli::login(&session, &mut config).await,
        Command::Logout => return cli::logout(&session).await,
        Command::Status => return cli::status(&session, &config).await,
        Command::Tui | Command::Help => {}
    }

    // Restore in the background; the guard holds still until it finishes
    tokio::spawn({
        let session = Arc::clone(&session);
        async move {
            session.restore().await;
        }
    });
    let expiry = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.expire_on_unauthorized().await }
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, session, api);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    expiry.abort();

    if let Err(e) = result {
        warn!(error = %e, "Main loop failed");
        eprintln!("Error: {}", e);
    }

    info!("Brewlog shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Correct the screen before drawing so the wrong area never shows
        app.apply_guard();

        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
