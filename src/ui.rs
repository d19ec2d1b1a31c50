//! Plain terminal output: bar layout shared with the TUI, and the one-shot
//! text renderer

use crossterm::style::{style, Color as TermColor, Stylize};
use std::io::{self, Write};

use crate::chart::{format_duration, ChartConfig};
use crate::params::ChartParams;
use crate::utils::{display_width, pad_to_width, parse_color};

pub const NO_DATA_MESSAGE: &str = "No data available for the selected time range.";

const MAX_LABEL_WIDTH: usize = 24;
const MIN_BAR_WIDTH: usize = 10;
const AXIS_TICKS: usize = 5;

/// Glyphs used to tell segments apart when colour is off
const SEGMENT_GLYPHS: [&str; 4] = ["█", "▓", "▒", "░"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Actual,
    Planned,
}

impl StackKind {
    pub fn name(self) -> &'static str {
        match self {
            StackKind::Actual => "actual",
            StackKind::Planned => "planned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarSegment {
    pub dataset: usize,
    pub cells: usize,
}

/// One stacked bar of a block, laid out in terminal cells
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub stack: StackKind,
    pub segments: Vec<BarSegment>,
    pub value: f64,
}

fn axis_scale(chart: &ChartConfig) -> f64 {
    let max = chart.axis_max();
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

/// Lays out the actual and planned bars of one block in `bar_width` cells.
///
/// Segment edges are rounded from cumulative values so a stack never
/// exceeds its exact length by more than half a cell.
pub fn bar_rows(chart: &ChartConfig, block: usize, bar_width: usize) -> [BarRow; 2] {
    let scale = axis_scale(chart);
    let to_cells = |value: f64| ((value / scale) * bar_width as f64).round() as usize;

    let mut segments = Vec::new();
    let mut cumulative = 0.0;
    let mut drawn = 0;
    for (i, dataset) in chart.data.datasets.iter().enumerate() {
        if dataset.is_planned() {
            continue;
        }
        let value = chart.value(i, block);
        if value <= 0.0 {
            continue;
        }
        cumulative += value;
        let edge = to_cells(cumulative).min(bar_width);
        segments.push(BarSegment {
            dataset: i,
            cells: edge.saturating_sub(drawn),
        });
        drawn = drawn.max(edge);
    }

    let planned_segments = chart
        .data
        .datasets
        .iter()
        .position(|d| d.is_planned())
        .map(|i| BarSegment {
            dataset: i,
            cells: to_cells(chart.value(i, block)).min(bar_width),
        })
        .into_iter()
        .collect();

    [
        BarRow {
            stack: StackKind::Actual,
            segments,
            value: chart.total(block),
        },
        BarRow {
            stack: StackKind::Planned,
            segments: planned_segments,
            value: chart.planned(block),
        },
    ]
}

/// Duration tick labels spread across `width` cells.
///
/// The first and last ticks always win; middle ticks that would collide
/// are dropped.
pub fn axis_labels(chart: &ChartConfig, width: usize) -> String {
    let scale = axis_scale(chart);

    let ticks: Vec<(usize, Vec<char>)> = (0..AXIS_TICKS)
        .filter_map(|i| {
            let fraction = i as f64 / (AXIS_TICKS - 1) as f64;
            let label: Vec<char> = format_duration(scale * fraction).chars().collect();
            if label.len() > width {
                return None;
            }
            let pos = ((fraction * width as f64).round() as usize).min(width - label.len());
            Some((pos, label))
        })
        .collect();

    let mut line = vec![' '; width];
    let last_pos = ticks.last().map(|(pos, _)| *pos).unwrap_or(width);
    let mut next_free = 0;

    for (i, (pos, label)) in ticks.iter().enumerate() {
        let limit = if i + 1 == ticks.len() {
            width
        } else {
            last_pos.saturating_sub(1)
        };
        if *pos < next_free || pos + label.len() > limit {
            continue;
        }
        line[*pos..pos + label.len()].copy_from_slice(label);
        next_free = pos + label.len() + 1;
    }

    line.into_iter().collect()
}

/// Width of the block label column for this chart
pub fn label_width(chart: &ChartConfig) -> usize {
    chart
        .data
        .labels
        .iter()
        .map(|l| display_width(l))
        .max()
        .unwrap_or(0)
        .clamp(1, MAX_LABEL_WIDTH)
}

fn paint(text: String, color: &str, use_color: bool) -> String {
    match parse_color(color).filter(|_| use_color) {
        Some((r, g, b)) => style(text).with(TermColor::Rgb { r, g, b }).to_string(),
        None => text,
    }
}

/// Renders the whole chart plus per-block tooltips as text.
pub fn render_text(chart: &ChartConfig, params: &ChartParams, width: usize, use_color: bool) -> String {
    let label_w = label_width(chart);
    // label, space, stack name (7), space, two borders, space, duration (8)
    let bar_w = width
        .saturating_sub(label_w + 1 + 7 + 1 + 2 + 1 + 8)
        .max(MIN_BAR_WIDTH);

    let mut out = String::new();
    out.push_str(&format!(
        "Planned vs actual time for {} ({})\n\n",
        params.hostname, params.period
    ));

    for block in 0..chart.block_count() {
        for row in bar_rows(chart, block, bar_w) {
            let label = match row.stack {
                StackKind::Actual => pad_to_width(chart.tooltip_title(block), label_w),
                StackKind::Planned => " ".repeat(label_w),
            };

            let mut bar = String::new();
            let mut used = 0;
            for segment in &row.segments {
                let dataset = &chart.data.datasets[segment.dataset];
                let glyph = if use_color {
                    SEGMENT_GLYPHS[0]
                } else {
                    SEGMENT_GLYPHS[segment.dataset % SEGMENT_GLYPHS.len()]
                };
                bar.push_str(&paint(
                    glyph.repeat(segment.cells),
                    &dataset.background_color,
                    use_color,
                ));
                used += segment.cells;
            }
            bar.push_str(&" ".repeat(bar_w.saturating_sub(used)));

            out.push_str(&format!(
                "{} {:<7} │{}│ {}\n",
                label,
                row.stack.name(),
                bar,
                format_duration(row.value)
            ));
        }
    }

    out.push_str(&format!(
        "{} {:<7}  {}\n",
        " ".repeat(label_w),
        "",
        paint(axis_labels(chart, bar_w), &chart.theme.tick, use_color)
    ));

    for block in 0..chart.block_count() {
        out.push('\n');
        out.push_str(chart.tooltip_title(block));
        out.push('\n');
        for dataset in chart.visible_datasets(block) {
            if let Some(line) = chart.tooltip_label(dataset, block).into_iter().next() {
                out.push_str(&format!("  {}\n", line));
            }
        }
        out.push_str(&format!("  Total: {}\n", format_duration(chart.total(block))));
    }

    out
}

pub fn print_chart(chart: &ChartConfig, params: &ChartParams, use_color: bool) -> io::Result<()> {
    let width = crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80);
    let mut stdout = io::stdout().lock();
    stdout.write_all(render_text(chart, params, width, use_color).as_bytes())?;
    stdout.flush()
}

pub fn print_no_data() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", NO_DATA_MESSAGE)?;
    stdout.flush()
}
