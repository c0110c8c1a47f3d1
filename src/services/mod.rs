//! Services - the stateful computational core
//!
//! This module contains the core business logic:
//! - `session_tracker` - segments per-subscriber event streams into journeys
//! - `aggregator` - derives segment/cell flow statistics from journey batches

pub mod aggregator;
pub mod session_tracker;

// Re-export commonly used types
pub use aggregator::{CellFlow, FlowAggregator, FlowStatistics, MostTraveled, SegmentFlow};
pub use session_tracker::{SessionTracker, TrackerStats, DEFAULT_MAX_GAP_SECS};
