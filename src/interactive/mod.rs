//! Interactive terminal chart
//!
//! Shows the stacked block bars full screen with a tooltip panel for the
//! selected segment.

pub mod app;
pub mod events;
pub mod ui;

pub use app::App;
pub use events::EventHandler;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::debug;

use crate::chart::ChartConfig;
use crate::params::ChartParams;

/// Run the interactive chart until the user quits
pub fn run_interactive(chart: ChartConfig, params: ChartParams) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(chart, params);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    debug!("Interactive chart closed");
    res
}

/// Main application loop
fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let event_handler = EventHandler::new();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Some(event) = event_handler.next()? {
            if !app.handle_event(event)? {
                break;
            }
        }
    }

    Ok(())
}
