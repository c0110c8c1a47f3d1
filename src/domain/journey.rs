//! Journey data model for subscriber movement between cell sites

use crate::domain::types::{CellId, Segment, SubscriberKey};
use serde::Serialize;

/// A single visit to a cell site. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct CellVisit {
    pub cell_id: CellId,
    /// Unix timestamp in nanoseconds
    pub timestamp: i64,
    pub event_name: String,
    pub subscriber_key: SubscriberKey,
}

/// A chronologically contiguous sequence of cell visits by one subscriber,
/// bounded by inactivity gaps.
///
/// Invariants, guaranteed by the session tracker:
/// - visit timestamps are non-decreasing
/// - no two consecutive visits share a cell identifier
/// - a completed journey has at least 2 visits
#[derive(Debug, Clone, Serialize)]
pub struct Journey {
    pub subscriber_key: SubscriberKey,
    /// Unique within the emitting tracker instance
    pub journey_id: String,
    pub visits: Vec<CellVisit>,
    pub start_time: i64,
    pub end_time: i64,
}

impl Journey {
    /// Start a journey seeded with a single visit
    pub fn start(journey_id: String, visit: CellVisit) -> Self {
        let ts = visit.timestamp;
        Self {
            subscriber_key: visit.subscriber_key.clone(),
            journey_id,
            visits: vec![visit],
            start_time: ts,
            end_time: ts,
        }
    }

    /// Append a visit and extend the journey end time
    pub fn push_visit(&mut self, visit: CellVisit) {
        self.end_time = visit.timestamp;
        self.visits.push(visit);
    }

    pub fn last_visit(&self) -> &CellVisit {
        // A journey always holds at least its seed visit
        &self.visits[self.visits.len() - 1]
    }

    /// Ordered list of cell IDs visited
    pub fn path(&self) -> Vec<&CellId> {
        self.visits.iter().map(|v| &v.cell_id).collect()
    }

    /// Directed segments between consecutive visits
    pub fn segments(&self) -> Vec<Segment> {
        self.visits
            .windows(2)
            .map(|pair| Segment::new(pair[0].cell_id.clone(), pair[1].cell_id.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(cell: &str, ts: i64) -> CellVisit {
        CellVisit {
            cell_id: CellId::from(cell),
            timestamp: ts,
            event_name: "Mobility.Handover.Notified".to_string(),
            subscriber_key: SubscriberKey::from("IMSI:1"),
        }
    }

    #[test]
    fn test_start_seeds_times() {
        let journey = Journey::start("IMSI:1_1".to_string(), visit("A", 100));
        assert_eq!(journey.start_time, 100);
        assert_eq!(journey.end_time, 100);
        assert_eq!(journey.visits.len(), 1);
        assert_eq!(journey.last_visit().cell_id, CellId::from("A"));
    }

    #[test]
    fn test_push_visit_extends_end_time() {
        let mut journey = Journey::start("IMSI:1_1".to_string(), visit("A", 100));
        journey.push_visit(visit("B", 250));
        assert_eq!(journey.start_time, 100);
        assert_eq!(journey.end_time, 250);
        assert_eq!(journey.visits.len(), 2);
    }

    #[test]
    fn test_path_and_segments() {
        let mut journey = Journey::start("IMSI:1_1".to_string(), visit("A", 1));
        journey.push_visit(visit("B", 2));
        journey.push_visit(visit("C", 3));

        let path: Vec<&str> = journey.path().iter().map(|c| c.as_str()).collect();
        assert_eq!(path, vec!["A", "B", "C"]);

        let segments = journey.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], Segment::new(CellId::from("A"), CellId::from("B")));
        assert_eq!(segments[1], Segment::new(CellId::from("B"), CellId::from("C")));
    }

    #[test]
    fn test_single_visit_has_no_segments() {
        let journey = Journey::start("IMSI:1_1".to_string(), visit("A", 1));
        assert!(journey.segments().is_empty());
    }
}
