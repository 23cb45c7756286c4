//! Outreach console - terminal control panel for the outreach agent.
//!
//! Connects to the agent server's REST API to start and stop the agent,
//! mirror its run-state, and display periodically refreshed KPIs.

use std::io;

use color_eyre::Result;
use outreach_console::app::{App, AppConfig};
use outreach_console::event::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    setup_terminal()?;

    // Base URL from the first argument, defaulting to the local server.
    let mut config = AppConfig::new();
    if let Some(base_url) = std::env::args().nth(1) {
        config = config.with_base_url(base_url);
    }

    let mut app = App::new(config);
    let mut event_handler = EventHandler::new();

    let result = app.run_with_crossterm(&mut event_handler).await;

    restore_terminal()?;

    result
}

fn setup_terminal() -> Result<()> {
    color_eyre::install()?;

    // Log to stderr; the alternate screen keeps the TUI on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;

    Ok(())
}

fn restore_terminal() -> Result<()> {
    crossterm::execute!(
        io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    crossterm::terminal::disable_raw_mode()?;

    Ok(())
}
