//! Application state and key handling for the interactive chart

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::chart::ChartConfig;
use crate::params::ChartParams;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Browsing blocks and segments
    Normal,
    /// Help screen
    Help,
}

/// Main application state
pub struct App {
    pub chart: ChartConfig,
    pub params: ChartParams,
    pub mode: AppMode,
    /// Index of the selected block (bar)
    pub selected_block: usize,
    /// Position within the selected block's visible datasets
    pub selected_segment: usize,
}

impl App {
    pub fn new(chart: ChartConfig, params: ChartParams) -> Self {
        App {
            chart,
            params,
            mode: AppMode::Normal,
            selected_block: 0,
            selected_segment: 0,
        }
    }

    /// Handle a key press. Returns false when the app should exit.
    pub fn handle_event(&mut self, event: KeyEvent) -> Result<bool> {
        match self.mode {
            AppMode::Normal => Ok(self.handle_normal_mode(event)),
            AppMode::Help => Ok(self.handle_help_mode(event)),
        }
    }

    fn handle_normal_mode(&mut self, event: KeyEvent) -> bool {
        match event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return false,
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Up | KeyCode::Char('k') => self.select_previous_block(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next_block(),
            KeyCode::Left | KeyCode::Char('h') => self.select_previous_segment(),
            KeyCode::Right | KeyCode::Char('l') => self.select_next_segment(),
            KeyCode::Home => self.select_block(0),
            KeyCode::End => self.select_block(self.chart.block_count().saturating_sub(1)),
            _ => {}
        }
        true
    }

    fn handle_help_mode(&mut self, event: KeyEvent) -> bool {
        match event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return false,
            _ => self.mode = AppMode::Normal,
        }
        true
    }

    fn select_block(&mut self, block: usize) {
        if block < self.chart.block_count() {
            self.selected_block = block;
            self.selected_segment = 0;
        }
    }

    fn select_previous_block(&mut self) {
        if self.selected_block > 0 {
            self.select_block(self.selected_block - 1);
        }
    }

    fn select_next_block(&mut self) {
        self.select_block(self.selected_block + 1);
    }

    fn select_previous_segment(&mut self) {
        let count = self.chart.visible_datasets(self.selected_block).len();
        if count > 0 {
            self.selected_segment = (self.selected_segment + count - 1) % count;
        }
    }

    fn select_next_segment(&mut self) {
        let count = self.chart.visible_datasets(self.selected_block).len();
        if count > 0 {
            self.selected_segment = (self.selected_segment + 1) % count;
        }
    }

    /// Dataset index of the highlighted segment
    pub fn selected_dataset(&self) -> Option<usize> {
        self.chart
            .visible_datasets(self.selected_block)
            .get(self.selected_segment)
            .copied()
    }

    /// Tooltip title and body for the highlighted segment
    pub fn tooltip(&self) -> (String, Vec<String>) {
        let title = self.chart.tooltip_title(self.selected_block).to_string();
        let body = self
            .selected_dataset()
            .map(|dataset| self.chart.tooltip_label(dataset, self.selected_block))
            .unwrap_or_default();
        (title, body)
    }
}
