//! AgroClimate Analyst terminal client.
//!
//! Startup order matters: the API credential is validated before the
//! terminal enters raw mode, so a missing key fails fast with a readable
//! message instead of a garbled screen.

mod app;
mod input;
mod markdown;
mod transcript;
mod ui;

use std::io::{self, Stdout};
use std::sync::Arc;

use agroclimate_core::ChatController;
use agroclimate_interaction::GeminiGateway;
use anyhow::{Context, Result};
use crossterm::ExecutableCommand;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let gateway = GeminiGateway::from_env().context("startup failed")?;
    let controller = ChatController::new(Arc::new(gateway));

    let mut terminal = setup_terminal()?;
    let result = App::new(controller).run(&mut terminal).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
