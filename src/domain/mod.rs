//! Domain models - core data types for movement analysis
//!
//! This module contains the canonical data types used throughout the system:
//! - `CellVisit` / `Journey` - a subscriber's path through cell sites
//! - `Segment` - directed edge between consecutively visited cells
//! - `EventRecord` - raw mobility handover event from the wire
//! - `CellId` / `SubscriberKey` - identifier newtypes

pub mod journey;
pub mod types;

// Re-export commonly used types at module level
pub use journey::{CellVisit, Journey};
pub use types::{CellId, EventAttributes, EventRecord, Segment, SubscriberKey};
