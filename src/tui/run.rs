//! TUI entry point and setup.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use crate::store::{BlobStore, TaskStore};
use crate::tui::app::App;

/// Initialise and run the terminal user interface.
pub fn run_tui<B: BlobStore + Clone>(store: TaskStore<B>, poll_timeout: Duration) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("tui starting");
    let mut app = App::new(store).with_poll_timeout(poll_timeout);
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    info!("tui exiting");

    result
}
