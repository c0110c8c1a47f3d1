//! Population movement analysis library
//!
//! Reconstructs per-subscriber journeys from mobility handover events and
//! aggregates them into directional segment and cell flow statistics.
//! Exposes modules for integration testing and binary reuse.

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
