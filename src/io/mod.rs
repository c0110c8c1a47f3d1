//! IO modules - peripheral collaborators around the core
//!
//! This module contains all external IO operations:
//! - `events` - JSONL event ingest and egress
//! - `sites` - Cell site directory (cell id -> coordinates)
//! - `report` - Leaflet HTML movement map writer
//! - `generator` - Synthetic event generation for testing and demos

pub mod events;
pub mod generator;
pub mod report;
pub mod sites;

// Re-export commonly used types
pub use events::{read_events, write_events};
pub use generator::{generate_events, GeneratorOptions};
pub use report::{write_map_report, ReportOptions};
pub use sites::{CellSite, CellSiteDirectory};
