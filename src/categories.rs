//! Per-category activity totals for each block

use std::collections::BTreeSet;

use crate::blocks::Block;
use crate::models::Event;

/// Synthetic category holding away-from-keyboard time
pub const AFK_CATEGORY: &str = "AFK";

/// Aggregated durations for one category, one value per block
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: String,
    pub values: Vec<f64>,
}

/// Distinct window categories plus "AFK" when there is AFK time, sorted.
pub fn category_universe(window_events: &[Event], afk_events: &[Event]) -> Vec<String> {
    let mut categories: BTreeSet<String> =
        window_events.iter().map(Event::category_label).collect();
    if !afk_events.is_empty() {
        categories.insert(AFK_CATEGORY.to_string());
    }
    categories.into_iter().collect()
}

/// Sums event durations per category and block.
///
/// An event counts with its whole duration as soon as it overlaps a block
/// at all; it is not clipped to the block window. The same event may
/// therefore count toward several adjacent blocks.
pub fn aggregate_categories(
    blocks: &[Block],
    window_events: &[Event],
    afk_events: &[Event],
) -> Vec<CategorySeries> {
    let labelled: Vec<(String, &Event)> = window_events
        .iter()
        .map(|event| (event.category_label(), event))
        .collect();

    category_universe(window_events, afk_events)
        .into_iter()
        .map(|category| {
            let values = blocks
                .iter()
                .map(|block| {
                    if category == AFK_CATEGORY {
                        sum_overlapping(block, afk_events.iter())
                    } else {
                        sum_overlapping(
                            block,
                            labelled
                                .iter()
                                .filter(|(label, _)| *label == category)
                                .map(|(_, event)| *event),
                        )
                    }
                })
                .collect();
            CategorySeries { category, values }
        })
        .collect()
}

fn sum_overlapping<'a>(block: &Block, events: impl Iterator<Item = &'a Event>) -> f64 {
    events
        .filter(|event| block.contains_overlap(event))
        .map(|event| event.duration)
        .sum()
}
