//! Builds the horizontal stacked bar chart document
//!
//! The document follows the Chart.js `{type, data, options}` shape so it can
//! be handed to a browser as-is; the terminal renderers read the same
//! structure.

use serde::Serialize;
use std::collections::HashMap;

use crate::blocks::Block;
use crate::categories::{CategorySeries, AFK_CATEGORY};
use crate::models::{Theme, UNCATEGORIZED};

pub const PLANNED_LABEL: &str = "Planned Duration";
pub const ACTUAL_STACK: &str = "actual";
pub const PLANNED_STACK: &str = "planned";

pub const AFK_COLOR: &str = "#888888";
pub const UNCATEGORIZED_COLOR: &str = "#CCC";
pub const DEFAULT_COLOR: &str = "#6699ff";
pub const PLANNED_COLOR: &str = "rgba(255, 140, 0, 0.7)";

const MIN_HEIGHT_PX: usize = 250;
const HEIGHT_PER_BLOCK_PX: usize = 20;
const HEIGHT_BASE_PX: usize = 100;
const PADDING_PX: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: ChartData,
    pub options: ChartOptions,
    /// Sum of all actual (non-planned) datasets, per block
    pub block_totals: Vec<f64>,
    /// Minimum chart height in pixels
    pub min_height: usize,
    pub theme: ThemeColors,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: String,
    pub border_width: u32,
    pub stack: String,
}

impl Dataset {
    pub fn is_planned(&self) -> bool {
        self.label == PLANNED_LABEL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub index_axis: String,
    pub plugins: Plugins,
    pub scales: Scales,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub stacked: bool,
    pub grid: Grid,
    pub ticks: Ticks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticks {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_skip: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub padding: Padding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Padding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeColors {
    pub name: Theme,
    pub background: String,
    pub foreground: String,
    pub grid: String,
    pub tick: String,
}

impl From<Theme> for ThemeColors {
    fn from(theme: Theme) -> Self {
        ThemeColors {
            name: theme,
            background: theme.background().to_string(),
            foreground: theme.foreground().to_string(),
            grid: theme.grid().to_string(),
            tick: theme.tick().to_string(),
        }
    }
}

/// Format duration in seconds as "1h 1m", "2m 5s" or "45s"
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Display colour for a category label.
pub fn category_color(category: &str, colors: &HashMap<String, String>) -> String {
    if category == AFK_CATEGORY {
        return AFK_COLOR.to_string();
    }
    if let Some(color) = colors.get(category) {
        return color.clone();
    }
    match category {
        UNCATEGORIZED => UNCATEGORIZED_COLOR.to_string(),
        _ => DEFAULT_COLOR.to_string(),
    }
}

/// Vertical space needed for `block_count` bars.
pub fn min_height(block_count: usize) -> usize {
    MIN_HEIGHT_PX.max(block_count * HEIGHT_PER_BLOCK_PX + HEIGHT_BASE_PX)
}

/// Assembles category datasets, the planned dataset and the chart options.
pub fn build_chart(
    blocks: &[Block],
    series: &[CategorySeries],
    colors: &HashMap<String, String>,
    theme: Theme,
) -> ChartConfig {
    let mut datasets: Vec<Dataset> = series
        .iter()
        .map(|s| Dataset {
            label: s.category.clone(),
            data: s.values.clone(),
            background_color: category_color(&s.category, colors),
            border_width: 0,
            stack: ACTUAL_STACK.to_string(),
        })
        .collect();

    datasets.push(Dataset {
        label: PLANNED_LABEL.to_string(),
        data: blocks.iter().map(|b| b.planned_duration).collect(),
        background_color: PLANNED_COLOR.to_string(),
        border_width: 0,
        stack: PLANNED_STACK.to_string(),
    });

    let block_totals = (0..blocks.len())
        .map(|i| {
            datasets
                .iter()
                .filter(|d| !d.is_planned())
                .map(|d| d.data.get(i).copied().unwrap_or(0.0))
                .sum()
        })
        .collect();

    ChartConfig {
        chart_type: "bar".to_string(),
        data: ChartData {
            labels: blocks.iter().map(|b| b.name.clone()).collect(),
            datasets,
        },
        options: chart_options(theme),
        block_totals,
        min_height: min_height(blocks.len()),
        theme: theme.into(),
    }
}

fn chart_options(theme: Theme) -> ChartOptions {
    let axis = |auto_skip: Option<bool>| Axis {
        stacked: true,
        grid: Grid {
            color: theme.grid().to_string(),
        },
        ticks: Ticks {
            color: theme.tick().to_string(),
            auto_skip,
        },
    };

    ChartOptions {
        responsive: true,
        maintain_aspect_ratio: false,
        index_axis: "y".to_string(),
        plugins: Plugins {
            legend: Legend { display: false },
        },
        scales: Scales {
            x: axis(None),
            y: axis(Some(false)),
        },
        layout: Layout {
            padding: Padding {
                top: PADDING_PX,
                bottom: PADDING_PX,
                left: PADDING_PX,
                right: PADDING_PX,
            },
        },
    }
}

impl ChartConfig {
    pub fn block_count(&self) -> usize {
        self.data.labels.len()
    }

    pub fn value(&self, dataset: usize, block: usize) -> f64 {
        self.data
            .datasets
            .get(dataset)
            .and_then(|d| d.data.get(block))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn total(&self, block: usize) -> f64 {
        self.block_totals.get(block).copied().unwrap_or(0.0)
    }

    pub fn planned(&self, block: usize) -> f64 {
        self.data
            .datasets
            .iter()
            .position(Dataset::is_planned)
            .map(|i| self.value(i, block))
            .unwrap_or(0.0)
    }

    /// Largest bar length on the duration axis.
    pub fn axis_max(&self) -> f64 {
        (0..self.block_count())
            .map(|b| self.total(b).max(self.planned(b)))
            .fold(0.0, f64::max)
    }

    /// Tooltip title: the block name.
    pub fn tooltip_title(&self, block: usize) -> &str {
        self.data
            .labels
            .get(block)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Tooltip body for one dataset segment of a block.
    pub fn tooltip_label(&self, dataset: usize, block: usize) -> Vec<String> {
        let Some(ds) = self.data.datasets.get(dataset) else {
            return Vec::new();
        };
        let line = format!("{}: {}", ds.label, format_duration(self.value(dataset, block)));
        if ds.is_planned() {
            vec![line]
        } else {
            vec![line, format!("Total: {}", format_duration(self.total(block)))]
        }
    }

    /// Datasets with something to show for a block; planned is always kept.
    pub fn visible_datasets(&self, block: usize) -> Vec<usize> {
        self.data
            .datasets
            .iter()
            .enumerate()
            .filter(|(i, d)| d.is_planned() || self.value(*i, block) > 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}
