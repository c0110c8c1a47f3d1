//! Shared types for the movement analysis pipeline

use serde::{Deserialize, Serialize};

/// Newtype wrapper for cell identifiers (ECGI strings like "001001:0000002")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub String);

impl CellId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CellId {
    fn from(s: &str) -> Self {
        CellId(s.to_string())
    }
}

/// Newtype wrapper for subscriber identifiers (e.g. "IMSI:123456789012345")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberKey(pub String);

impl SubscriberKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubscriberKey {
    fn from(s: &str) -> Self {
        SubscriberKey(s.to_string())
    }
}

/// Directed journey segment between two consecutively visited cells.
///
/// Identity is directional: `(A,B) != (B,A)`. Used as a composite map key
/// with structural equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    pub from: CellId,
    pub to: CellId,
}

impl Segment {
    pub fn new(from: CellId, to: CellId) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Raw mobility event record as it appears on the wire (JSONL)
///
/// Subscriber and cell attributes are optional at this layer; records
/// missing required fields are skipped by the tracker, never errored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub name: String,
    /// Unix timestamp in nanoseconds
    #[serde(default)]
    pub ts: i64,
    #[serde(default)]
    pub subscriber_key: Option<String>,
    #[serde(default)]
    pub attributes: EventAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cell_id: Option<String>,
    /// Fallback field used by some event sources instead of target_cell_id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_cell_id: Option<String>,
}

impl EventRecord {
    /// Target cell of the handover, with `cell_id` as fallback.
    /// Empty strings count as missing, same as the subscriber key.
    pub fn target_cell(&self) -> Option<&str> {
        self.attributes
            .target_cell_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.attributes.cell_id.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn subscriber(&self) -> Option<&str> {
        self.subscriber_key.as_deref().filter(|s| !s.is_empty())
    }
}
