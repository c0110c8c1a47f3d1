//! Session tracker - segments per-subscriber event streams into journeys
//!
//! Maintains one active session per subscriber. A session closes when the
//! inactivity gap between consecutive events exceeds the configured maximum,
//! or on explicit flush. Closed sessions materialize as a `Journey` only
//! when they contain at least two visits; single-visit sessions are
//! discarded silently.

use crate::domain::journey::{CellVisit, Journey};
use crate::domain::types::{CellId, EventRecord, SubscriberKey};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Default maximum inactivity gap between visits (one hour)
pub const DEFAULT_MAX_GAP_SECS: u64 = 3600;

/// Summary statistics over completed journeys
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerStats {
    pub total_journeys: usize,
    pub total_visits: usize,
    pub avg_journey_length: f64,
    pub unique_subscribers: usize,
}

/// Per-subscriber session state machine emitting completed journeys.
///
/// Precondition: events for a given subscriber must be ingested in
/// non-decreasing timestamp order. Cross-subscriber interleaving order
/// is irrelevant.
pub struct SessionTracker {
    /// Maximum inactivity gap in event-clock units (nanoseconds)
    max_gap_ns: i64,
    /// Active sessions by subscriber
    active: FxHashMap<SubscriberKey, Journey>,
    completed: Vec<Journey>,
    /// Journey id counter, scoped to this tracker instance
    journey_counter: u64,
}

impl SessionTracker {
    pub fn new(max_gap_secs: u64) -> Self {
        Self {
            max_gap_ns: max_gap_secs as i64 * NANOS_PER_SEC,
            active: FxHashMap::default(),
            completed: Vec::new(),
            journey_counter: 0,
        }
    }

    /// Process a single mobility event.
    ///
    /// Records missing a subscriber identifier or target cell are dropped
    /// silently; malformed input is tolerated, never raised as an error.
    pub fn ingest(&mut self, record: &EventRecord) {
        let Some(subscriber) = record.subscriber() else {
            debug!(ts = %record.ts, "event_skipped_no_subscriber");
            return;
        };
        let Some(target_cell) = record.target_cell() else {
            debug!(subscriber = %subscriber, ts = %record.ts, "event_skipped_no_target_cell");
            return;
        };

        let subscriber = SubscriberKey::from(subscriber);
        let target_cell = CellId::from(target_cell);

        let Some(session) = self.active.get_mut(&subscriber) else {
            self.start_session(subscriber, target_cell, record);
            return;
        };

        let gap = record.ts - session.last_visit().timestamp;
        if gap > self.max_gap_ns {
            // Inactivity gap exceeded: close the session and start a new
            // one seeded by this event
            self.close_session(&subscriber);
            self.start_session(subscriber, target_cell, record);
        } else if session.last_visit().cell_id != target_cell {
            session.push_visit(CellVisit {
                cell_id: target_cell,
                timestamp: record.ts,
                event_name: record.name.clone(),
                subscriber_key: subscriber,
            });
        } else {
            // Stationary repeat at the same cell: absorbed without
            // appending a visit or touching end_time
            debug!(subscriber = %subscriber, cell = %target_cell, "event_absorbed_same_cell");
        }
    }

    /// Force-close every active session. Call once after the last event of
    /// a replay to avoid losing in-progress journeys.
    pub fn flush_all(&mut self) {
        let subscribers: Vec<SubscriberKey> = self.active.keys().cloned().collect();
        for subscriber in subscribers {
            self.close_session(&subscriber);
        }
    }

    /// Read-only snapshot of all journeys closed so far
    pub fn completed_journeys(&self) -> &[Journey] {
        &self.completed
    }

    /// Consume the tracker and take ownership of the completed journeys
    pub fn into_journeys(self) -> Vec<Journey> {
        self.completed
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Summary statistics over completed journeys
    pub fn statistics(&self) -> TrackerStats {
        if self.completed.is_empty() {
            return TrackerStats {
                total_journeys: 0,
                total_visits: 0,
                avg_journey_length: 0.0,
                unique_subscribers: 0,
            };
        }

        let total_visits: usize = self.completed.iter().map(|j| j.visits.len()).sum();
        let unique_subscribers = self
            .completed
            .iter()
            .map(|j| &j.subscriber_key)
            .collect::<rustc_hash::FxHashSet<_>>()
            .len();

        TrackerStats {
            total_journeys: self.completed.len(),
            total_visits,
            avg_journey_length: total_visits as f64 / self.completed.len() as f64,
            unique_subscribers,
        }
    }

    fn start_session(&mut self, subscriber: SubscriberKey, cell: CellId, record: &EventRecord) {
        self.journey_counter += 1;
        let journey_id = format!("{}_{}", subscriber, self.journey_counter);

        debug!(
            subscriber = %subscriber,
            journey_id = %journey_id,
            cell = %cell,
            "session_started"
        );

        let visit = CellVisit {
            cell_id: cell,
            timestamp: record.ts,
            event_name: record.name.clone(),
            subscriber_key: subscriber.clone(),
        };
        self.active.insert(subscriber, Journey::start(journey_id, visit));
    }

    /// Close a subscriber's active session, materializing it as a journey
    /// iff it recorded movement (>= 2 visits)
    fn close_session(&mut self, subscriber: &SubscriberKey) {
        if let Some(journey) = self.active.remove(subscriber) {
            if journey.visits.len() >= 2 {
                info!(
                    subscriber = %subscriber,
                    journey_id = %journey.journey_id,
                    visits = %journey.visits.len(),
                    "journey_closed"
                );
                self.completed.push(journey);
            } else {
                debug!(
                    subscriber = %subscriber,
                    journey_id = %journey.journey_id,
                    "session_discarded_single_visit"
                );
            }
        }
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GAP_SECS)
    }
}
