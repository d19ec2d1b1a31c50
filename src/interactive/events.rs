//! Event handling for the interactive UI

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

/// Event handler for keyboard input
pub struct EventHandler {
    /// Timeout for polling events
    timeout: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_millis(250),
        }
    }

    /// Get the next key press, if any arrived within the poll timeout.
    ///
    /// Release and repeat events are ignored so each key acts once on
    /// terminals that report them.
    pub fn next(&self) -> Result<Option<KeyEvent>> {
        if event::poll(self.timeout)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    return Ok(Some(key_event));
                }
            }
        }
        Ok(None)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
