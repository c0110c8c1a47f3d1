//! Synthetic event generation for testing and demos
//!
//! Produces mobility handover events with realistic route patterns:
//! a share of subscribers follow two common routes, the rest move randomly.
//! Output is sorted by timestamp so the replay precondition (per-subscriber
//! time order) holds.

use crate::domain::types::{EventAttributes, EventRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

const NANOS_PER_SEC: i64 = 1_000_000_000;

const EVENT_NAME: &str = "Mobility.Handover.Notified";

/// Default cell sites, matching the sample site directory
pub const DEFAULT_CELLS: [&str; 5] = [
    "001001:0000001",
    "001001:0000002",
    "001001:0000003",
    "001001:0000004",
    "001001:0000005",
];

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub subscribers: usize,
    /// Average number of events per subscriber
    pub events_per_subscriber: usize,
    pub cells: Vec<String>,
    /// Base timestamp in nanoseconds for the first event
    pub base_ts: i64,
    /// Fixed RNG seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            subscribers: 50,
            events_per_subscriber: 10,
            cells: DEFAULT_CELLS.iter().map(|c| c.to_string()).collect(),
            base_ts: 1_609_459_200 * NANOS_PER_SEC, // 2021-01-01 00:00:00 UTC
            seed: None,
        }
    }
}

/// Generate mobility events, sorted by timestamp.
///
/// Route mix: 30% of subscribers follow cells[0..4], 30% follow
/// cells[0],[2],[4], the rest take random routes of 2-5 cells. Handover
/// gaps are 60-600 seconds. Random extra movements may revisit the
/// current cell, exercising the tracker's stationary-repeat absorption.
pub fn generate_events(options: &GeneratorOptions) -> Vec<EventRecord> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let cells = &options.cells;
    if cells.is_empty() {
        return Vec::new();
    }
    let mut events = Vec::new();

    for subscriber_idx in 0..options.subscribers {
        let subscriber_key = format!("IMSI:{}", 123_456_789_000_000u64 + subscriber_idx as u64);

        let route: Vec<&String> = if subscriber_idx < options.subscribers * 3 / 10 {
            cells.iter().take(4).collect()
        } else if subscriber_idx < options.subscribers * 6 / 10 {
            cells.iter().step_by(2).take(3).collect()
        } else {
            let len = rng.gen_range(2..=5).min(cells.len());
            cells.choose_multiple(&mut rng, len).collect()
        };

        let mut event_time = options.base_ts;
        let mut current_cell: Option<&String> = None;

        for next_cell in &route {
            if current_cell.is_some() {
                event_time += rng.gen_range(60..=600) * NANOS_PER_SEC;
            }
            events.push(handover(&subscriber_key, event_time, next_cell.as_str(), current_cell));
            current_cell = Some(*next_cell);
        }

        // Random extra movements beyond the route; 30% stay put
        let extra = options.events_per_subscriber.saturating_sub(route.len());
        let extra = if extra > 0 { rng.gen_range(0..=extra) } else { 0 };
        for _ in 0..extra {
            event_time += rng.gen_range(60..=600) * NANOS_PER_SEC;
            let next_cell = if rng.gen_bool(0.7) {
                match cells.choose(&mut rng) {
                    Some(cell) => cell,
                    None => continue,
                }
            } else {
                match current_cell {
                    Some(cell) => cell,
                    None => continue,
                }
            };
            events.push(handover(&subscriber_key, event_time, next_cell.as_str(), current_cell));
            current_cell = Some(next_cell);
        }
    }

    events.sort_by_key(|e| e.ts);
    info!(
        events = %events.len(),
        subscribers = %options.subscribers,
        "events_generated"
    );
    events
}

fn handover(
    subscriber_key: &str,
    ts: i64,
    target_cell: &str,
    source_cell: Option<&String>,
) -> EventRecord {
    EventRecord {
        name: EVENT_NAME.to_string(),
        ts,
        subscriber_key: Some(subscriber_key.to_string()),
        attributes: EventAttributes {
            target_cell_id: Some(target_cell.to_string()),
            cell_id: None,
            source_cell_id: source_cell.map(|c| c.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn options(seed: u64) -> GeneratorOptions {
        GeneratorOptions { seed: Some(seed), ..GeneratorOptions::default() }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let a = generate_events(&options(42));
        let b = generate_events(&options(42));

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.ts, y.ts);
            assert_eq!(x.subscriber_key, y.subscriber_key);
            assert_eq!(x.attributes.target_cell_id, y.attributes.target_cell_id);
        }
    }

    #[test]
    fn test_events_sorted_and_well_formed() {
        let events = generate_events(&options(7));
        assert!(!events.is_empty());

        for pair in events.windows(2) {
            assert!(pair[0].ts <= pair[1].ts);
        }
        for event in &events {
            assert_eq!(event.name, EVENT_NAME);
            assert!(event.subscriber().is_some());
            assert!(event.target_cell().is_some());
        }
    }

    #[test]
    fn test_per_subscriber_time_order() {
        let events = generate_events(&options(3));

        let mut last_ts: FxHashMap<&str, i64> = FxHashMap::default();
        for event in &events {
            let subscriber = event.subscriber().unwrap();
            if let Some(prev) = last_ts.get(subscriber) {
                assert!(event.ts >= *prev);
            }
            last_ts.insert(subscriber, event.ts);
        }
        assert_eq!(last_ts.len(), 50);
    }

    #[test]
    fn test_respects_subscriber_count() {
        let events = generate_events(&GeneratorOptions {
            subscribers: 5,
            events_per_subscriber: 4,
            seed: Some(1),
            ..GeneratorOptions::default()
        });

        let subscribers: rustc_hash::FxHashSet<&str> =
            events.iter().filter_map(|e| e.subscriber()).collect();
        assert_eq!(subscribers.len(), 5);
    }
}
