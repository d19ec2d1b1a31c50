//! Groups nextblock marker events into named time blocks

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{offset_by_seconds, Event};

/// A planned block, as first announced by its marker events
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    /// Timestamp of the first marker for this name
    pub start: DateTime<Utc>,
    /// Duration of the first marker, in seconds
    pub duration: f64,
    /// Planned duration in seconds
    pub planned_duration: f64,
    /// Every marker carrying this name, in arrival order
    pub events: Vec<Event>,
}

impl Block {
    fn from_first_event(name: String, event: &Event) -> Self {
        Block {
            name,
            start: event.start(),
            duration: event.duration,
            planned_duration: event.planned_duration_secs(),
            events: Vec::new(),
        }
    }

    /// Only the first marker defines the window used for overlap tests.
    pub fn end(&self) -> DateTime<Utc> {
        offset_by_seconds(self.start, self.duration)
    }

    pub fn contains_overlap(&self, event: &Event) -> bool {
        event.overlaps(self.start, self.end())
    }
}

/// Deduplicates markers by block name and orders the blocks oldest first.
///
/// Blocks sharing a start time keep the order in which their names were
/// first seen.
pub fn aggregate_blocks(events: &[Event]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for event in events {
        let name = event.block_name();
        let slot = match index.get(&name) {
            Some(&slot) => slot,
            None => {
                blocks.push(Block::from_first_event(name.clone(), event));
                index.insert(name, blocks.len() - 1);
                blocks.len() - 1
            }
        };
        blocks[slot].events.push(event.clone());
    }

    blocks.sort_by_key(|block| block.start);
    blocks
}
