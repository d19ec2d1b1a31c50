//! Rendering of the interactive chart

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::app::{App, AppMode};
use crate::chart::format_duration;
use crate::ui::{axis_labels, bar_rows, label_width, StackKind};
use crate::utils::{pad_to_width, parse_color};

/// Width reserved right of each bar for its duration
const DURATION_WIDTH: u16 = 8;

/// Converts a chart colour string, falling back to the terminal default
pub fn to_color(color: &str) -> Color {
    parse_color(color)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Reset)
}

struct Palette {
    background: Color,
    foreground: Color,
    grid: Color,
    tick: Color,
}

impl Palette {
    fn from_app(app: &App) -> Self {
        let theme = &app.chart.theme;
        Palette {
            background: to_color(&theme.background),
            foreground: to_color(&theme.foreground),
            grid: to_color(&theme.grid),
            tick: to_color(&theme.tick),
        }
    }
}

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.size();
    let palette = Palette::from_app(app);

    // Page background follows the theme
    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.foreground)),
        size,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Chart
            Constraint::Length(5), // Tooltip
            Constraint::Length(3), // Footer
        ])
        .split(size);

    render_header(f, app, &palette, chunks[0]);
    render_chart(f, app, &palette, chunks[1]);
    render_tooltip(f, app, &palette, chunks[2]);
    render_footer(f, app, &palette, chunks[3]);

    if app.mode == AppMode::Help {
        render_help(f, &palette, size);
    }
}

fn bordered<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(palette.grid))
}

fn render_header(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let title = format!(
        " Planned vs actual - {} ({}) ",
        app.params.hostname, app.params.period
    );
    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(palette.foreground)
                .add_modifier(Modifier::BOLD),
        )
        .block(bordered("", palette));

    f.render_widget(header, area);
}

/// First block to draw so that the selection stays on screen
fn scroll_offset(selected: usize, visible: usize) -> usize {
    selected.saturating_sub(visible.saturating_sub(1))
}

fn render_chart(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = bordered(" Blocks ", palette);
    let inner = block.inner(area);
    let chart = &app.chart;

    let label_w = label_width(chart);
    let bar_w = inner
        .width
        .saturating_sub(label_w as u16 + 2 + DURATION_WIDTH) as usize;

    // Two rows per block, one row for the axis
    let visible_blocks = (inner.height.saturating_sub(1) / 2).max(1) as usize;
    let offset = scroll_offset(app.selected_block, visible_blocks);
    let selected_dataset = app.selected_dataset();

    let mut lines = Vec::new();
    for index in offset..chart.block_count().min(offset + visible_blocks) {
        let is_selected = index == app.selected_block;

        for row in bar_rows(chart, index, bar_w) {
            let label = match row.stack {
                StackKind::Actual => pad_to_width(chart.tooltip_title(index), label_w),
                StackKind::Planned => " ".repeat(label_w),
            };
            let label_style = if is_selected && row.stack == StackKind::Actual {
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut spans = vec![Span::styled(label, label_style), Span::raw(" ")];
            let mut used = 0;
            for segment in &row.segments {
                let dataset = &chart.data.datasets[segment.dataset];
                let highlighted = is_selected && selected_dataset == Some(segment.dataset);
                let glyph = if highlighted { "▓" } else { "█" };
                spans.push(Span::styled(
                    glyph.repeat(segment.cells),
                    Style::default().fg(to_color(&dataset.background_color)),
                ));
                used += segment.cells;
            }
            spans.push(Span::raw(" ".repeat(bar_w.saturating_sub(used) + 1)));
            spans.push(Span::styled(
                format_duration(row.value),
                Style::default().fg(palette.tick),
            ));

            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::from(vec![
        Span::raw(" ".repeat(label_w + 1)),
        Span::styled(axis_labels(chart, bar_w), Style::default().fg(palette.tick)),
    ]));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_tooltip(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let (title, body) = app.tooltip();

    let mut lines = vec![Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(body.into_iter().map(Line::from));

    let paragraph = Paragraph::new(lines).block(bordered(" Details ", palette));
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let shortcuts = match app.mode {
        AppMode::Normal => "[↑↓] Blocks  [←→] Segments  [Home/End] First/last  [?] help  [q]uit",
        AppMode::Help => "Press any key to return",
    };

    let footer = Paragraph::new(shortcuts)
        .style(Style::default().fg(palette.tick))
        .block(bordered("", palette));

    f.render_widget(footer, area);
}

fn render_help(f: &mut Frame, palette: &Palette, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  ↑/↓ or k/j    Select block"),
        Line::from("  ←/→ or h/l    Select segment within the block"),
        Line::from("  Home/End      First/last block"),
        Line::from("  q or Esc      Quit"),
        Line::from(""),
        Line::from("Top bar: tracked activity per category"),
        Line::from("Bottom bar: planned duration"),
    ];

    let width = 54.min(area.width);
    let height = (help_text.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(help_text)
            .style(Style::default().bg(palette.background).fg(palette.foreground))
            .block(bordered(" Help ", palette)),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_chart, sample_params};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_to_color() {
        assert_eq!(to_color("#6699ff"), Color::Rgb(0x66, 0x99, 0xff));
        assert_eq!(to_color("rgba(255, 140, 0, 0.7)"), Color::Rgb(255, 140, 0));
        assert_eq!(to_color("papayawhip"), Color::Reset);
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(0, 5), 0);
        assert_eq!(scroll_offset(4, 5), 0);
        assert_eq!(scroll_offset(7, 5), 3);
        assert_eq!(scroll_offset(3, 0), 3);
    }

    #[test]
    fn test_draw_chart_and_tooltip() {
        let app = App::new(sample_chart(), sample_params());
        let text = screen(&app, 100, 24);

        assert!(text.contains("Planned vs actual - laptop"));
        assert!(text.contains("Write"));
        assert!(text.contains("Review"));
        assert!(text.contains("Uncategorized: 10m 0s"));
        assert!(text.contains("Total: 30m 0s"));
        assert!(text.contains("[q]uit"));
    }

    #[test]
    fn test_draw_help_overlay() {
        let mut app = App::new(sample_chart(), sample_params());
        app.mode = AppMode::Help;
        let text = screen(&app, 100, 24);
        assert!(text.contains("Keyboard Shortcuts"));
        assert!(text.contains("Press any key to return"));
    }

    #[test]
    fn test_draw_tiny_terminal_does_not_panic() {
        let app = App::new(sample_chart(), sample_params());
        screen(&app, 10, 4);
    }
}
