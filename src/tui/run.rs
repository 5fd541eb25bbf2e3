//! Dashboard TUI entry point and setup.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::cmd::Context;
use crate::error::Result;
use crate::fields::Strategy;
use crate::snapshot::Snapshot;
use crate::tui::app::DashboardApp;

/// Initialise and run the dashboard until the user quits.
pub fn run_dashboard(ctx: &Context, snapshot: Snapshot, strategy: Strategy) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = DashboardApp::new(snapshot, strategy);
    let result = app.run(&mut terminal, ctx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
