//! Flow aggregator - derives segment and cell statistics from journeys
//!
//! Each call to `aggregate` clears all prior state and recomputes from the
//! given journey batch (snapshot semantics, not an incremental merge).

use crate::domain::journey::Journey;
use crate::domain::types::{CellId, Segment, SubscriberKey};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Aggregated flow on a directed journey segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFlow {
    pub from_cell: CellId,
    pub to_cell: CellId,
    /// Number of journeys traversing this segment (repeat traversals count)
    pub journey_count: u64,
    /// Number of distinct subscribers among those journeys
    pub subscriber_count: usize,
    /// Earliest start_time among owning journeys. Derived from the owning
    /// journey's time span, not from the exact visit pair forming the
    /// segment, so long journeys widen this window beyond the traversal.
    pub first_seen: i64,
    /// Latest end_time among owning journeys (same derivation as first_seen)
    pub last_seen: i64,
}

/// Aggregated flow through a cell site
#[derive(Debug, Clone)]
pub struct CellFlow {
    pub cell_id: CellId,
    pub total_entries: u64,
    pub total_exits: u64,
    pub unique_subscribers: FxHashSet<SubscriberKey>,
    pub entry_segments: Vec<Segment>,
    pub exit_segments: Vec<Segment>,
}

impl CellFlow {
    fn new(cell_id: CellId) -> Self {
        Self {
            cell_id,
            total_entries: 0,
            total_exits: 0,
            unique_subscribers: FxHashSet::default(),
            entry_segments: Vec::new(),
            exit_segments: Vec::new(),
        }
    }
}

/// Summary of the single most-traveled segment
#[derive(Debug, Clone, PartialEq)]
pub struct MostTraveled {
    pub from_cell: CellId,
    pub to_cell: CellId,
    pub journey_count: u64,
}

/// Aggregation summary statistics
#[derive(Debug, Clone, PartialEq)]
pub struct FlowStatistics {
    pub total_unique_segments: usize,
    pub total_cells: usize,
    /// Raw (non-deduplicated) segment occurrences across all journeys
    pub total_segment_occurrences: u64,
    pub avg_journeys_per_segment: f64,
    /// None when the batch produced no segments
    pub most_traveled_segment: Option<MostTraveled>,
}

impl FlowStatistics {
    fn empty() -> Self {
        Self {
            total_unique_segments: 0,
            total_cells: 0,
            total_segment_occurrences: 0,
            avg_journeys_per_segment: 0.0,
            most_traveled_segment: None,
        }
    }
}

/// Aggregates completed journeys into per-segment and per-cell flows.
///
/// Never errors for data-shape reasons: an empty journey batch yields
/// zero-valued statistics and empty collections.
pub struct FlowAggregator {
    segment_flows: FxHashMap<Segment, SegmentFlow>,
    /// Segments in first-observation order, for deterministic snapshots
    /// and tie-breaking in rankings
    segment_order: Vec<Segment>,
    segment_subscribers: FxHashMap<Segment, FxHashSet<SubscriberKey>>,
    cell_flows: FxHashMap<CellId, CellFlow>,
    cell_order: Vec<CellId>,
    total_segment_occurrences: u64,
}

impl FlowAggregator {
    pub fn new() -> Self {
        Self {
            segment_flows: FxHashMap::default(),
            segment_order: Vec::new(),
            segment_subscribers: FxHashMap::default(),
            cell_flows: FxHashMap::default(),
            cell_order: Vec::new(),
            total_segment_occurrences: 0,
        }
    }

    /// Recompute all flows from the given journey batch.
    ///
    /// Prior aggregator state is cleared first; calling this twice with the
    /// identical batch produces identical snapshots.
    pub fn aggregate(&mut self, journeys: &[Journey]) {
        self.segment_flows.clear();
        self.segment_order.clear();
        self.segment_subscribers.clear();
        self.cell_flows.clear();
        self.cell_order.clear();
        self.total_segment_occurrences = 0;

        for journey in journeys {
            for segment in journey.segments() {
                self.record_segment(&segment, journey);
            }
        }

        debug!(
            journeys = %journeys.len(),
            segments = %self.segment_flows.len(),
            cells = %self.cell_flows.len(),
            "aggregation_complete"
        );
    }

    fn record_segment(&mut self, segment: &Segment, journey: &Journey) {
        self.total_segment_occurrences += 1;

        let flow = self.segment_flows.entry(segment.clone()).or_insert_with(|| {
            self.segment_order.push(segment.clone());
            SegmentFlow {
                from_cell: segment.from.clone(),
                to_cell: segment.to.clone(),
                journey_count: 0,
                subscriber_count: 0,
                first_seen: journey.start_time,
                last_seen: journey.end_time,
            }
        });

        flow.journey_count += 1;
        flow.first_seen = flow.first_seen.min(journey.start_time);
        flow.last_seen = flow.last_seen.max(journey.end_time);

        let subscribers = self.segment_subscribers.entry(segment.clone()).or_default();
        subscribers.insert(journey.subscriber_key.clone());
        flow.subscriber_count = subscribers.len();

        self.record_cell(&segment.to, segment, &journey.subscriber_key, true);
        self.record_cell(&segment.from, segment, &journey.subscriber_key, false);
    }

    fn record_cell(
        &mut self,
        cell_id: &CellId,
        segment: &Segment,
        subscriber: &SubscriberKey,
        is_entry: bool,
    ) {
        let flow = self.cell_flows.entry(cell_id.clone()).or_insert_with(|| {
            self.cell_order.push(cell_id.clone());
            CellFlow::new(cell_id.clone())
        });

        flow.unique_subscribers.insert(subscriber.clone());
        if is_entry {
            flow.total_entries += 1;
            flow.entry_segments.push(segment.clone());
        } else {
            flow.total_exits += 1;
            flow.exit_segments.push(segment.clone());
        }
    }

    /// Segments ordered by journey_count descending; ties broken by
    /// first-observation order so repeated runs on the same input produce
    /// identical rankings
    pub fn top_segments(&self, limit: usize) -> Vec<&SegmentFlow> {
        let mut flows: Vec<&SegmentFlow> =
            self.segment_order.iter().filter_map(|s| self.segment_flows.get(s)).collect();
        flows.sort_by(|a, b| b.journey_count.cmp(&a.journey_count));
        flows.truncate(limit);
        flows
    }

    pub fn segment_flow(&self, from: &CellId, to: &CellId) -> Option<&SegmentFlow> {
        self.segment_flows.get(&Segment::new(from.clone(), to.clone()))
    }

    pub fn cell_flow(&self, cell_id: &CellId) -> Option<&CellFlow> {
        self.cell_flows.get(cell_id)
    }

    /// All segment flows in first-observation order
    pub fn all_segments(&self) -> Vec<&SegmentFlow> {
        self.segment_order.iter().filter_map(|s| self.segment_flows.get(s)).collect()
    }

    /// All cell flows in first-observation order
    pub fn all_cells(&self) -> Vec<&CellFlow> {
        self.cell_order.iter().filter_map(|c| self.cell_flows.get(c)).collect()
    }

    pub fn statistics(&self) -> FlowStatistics {
        if self.segment_flows.is_empty() {
            return FlowStatistics::empty();
        }

        let total_journey_count: u64 =
            self.segment_flows.values().map(|f| f.journey_count).sum();
        let most_traveled = self.top_segments(1).first().map(|f| MostTraveled {
            from_cell: f.from_cell.clone(),
            to_cell: f.to_cell.clone(),
            journey_count: f.journey_count,
        });

        FlowStatistics {
            total_unique_segments: self.segment_flows.len(),
            total_cells: self.cell_flows.len(),
            total_segment_occurrences: self.total_segment_occurrences,
            avg_journeys_per_segment: total_journey_count as f64
                / self.segment_flows.len() as f64,
            most_traveled_segment: most_traveled,
        }
    }
}

impl Default for FlowAggregator {
    fn default() -> Self {
        Self::new()
    }
}
