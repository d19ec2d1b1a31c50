//! Fetch → aggregate → chart, with the single failure boundary
//!
//! Settings failures degrade inside the settings resolver. Any other error
//! after parameter validation ends the run in the no-data state; the cause
//! is logged and kept in [`NoDataReason`].

use tracing::{debug, error, info};

use crate::aw_client::{afk_query, categorize_query, nextblock_query, AwClient};
use crate::blocks::aggregate_blocks;
use crate::categories::aggregate_categories;
use crate::chart::{build_chart, ChartConfig};
use crate::error::Result;
use crate::models::Event;
use crate::params::ChartParams;
use crate::settings::{load_settings, ResolvedSettings};

/// Why the chart was not drawn
#[derive(Debug, Clone, PartialEq)]
pub enum NoDataReason {
    /// No nextblock markers in the requested range
    NoBlocks,
    /// Nothing to plot after building the datasets
    EmptySeries,
    /// A fetch or build step failed
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Chart(ChartConfig),
    NoData(NoDataReason),
}

/// The three event sets a chart is built from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedEvents {
    pub markers: Vec<Event>,
    pub window: Vec<Event>,
    pub afk: Vec<Event>,
}

/// Runs one complete chart build against the server.
pub async fn run(client: &AwClient, params: &ChartParams) -> Outcome {
    info!(
        server = %client.base_url(),
        hostname = %params.hostname,
        period = %params.period,
        "Loading chart data"
    );

    let settings = load_settings(client).await;

    match fetch_and_build(client, params, &settings).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Error loading data: {}", e);
            Outcome::NoData(NoDataReason::Failed(e.to_string()))
        }
    }
}

async fn fetch_and_build(
    client: &AwClient,
    params: &ChartParams,
    settings: &ResolvedSettings,
) -> Result<Outcome> {
    let period = &params.period;

    let markers = client
        .query(period, &nextblock_query(&params.hostname))
        .await?;
    debug!(count = markers.len(), "Fetched nextblock markers");
    if markers.is_empty() {
        info!("No nextblock markers in range");
        return Ok(Outcome::NoData(NoDataReason::NoBlocks));
    }

    // Read again here: a failure at this point aborts the run
    let classes = client.get_classes().await?;
    let window = client
        .query(period, &categorize_query(&params.hostname, &classes)?)
        .await?;
    debug!(count = window.len(), "Fetched categorized window events");

    let afk = client.query(period, &afk_query(&params.hostname)).await?;
    debug!(count = afk.len(), "Fetched AFK events");

    Ok(build_outcome(
        &FetchedEvents {
            markers,
            window,
            afk,
        },
        settings,
    ))
}

/// Pure part of the pipeline: identical inputs give identical charts.
pub fn build_outcome(events: &FetchedEvents, settings: &ResolvedSettings) -> Outcome {
    if events.markers.is_empty() {
        return Outcome::NoData(NoDataReason::NoBlocks);
    }

    let blocks = aggregate_blocks(&events.markers);
    let series = aggregate_categories(&blocks, &events.window, &events.afk);
    info!(
        blocks = blocks.len(),
        categories = series.len(),
        "Aggregated activity per block"
    );

    let chart = build_chart(&blocks, &series, &settings.colors, settings.theme);
    if chart.data.datasets.is_empty() {
        return Outcome::NoData(NoDataReason::EmptySeries);
    }
    Outcome::Chart(chart)
}
