//! Event ingest - reads mobility event records from JSONL files
//!
//! One JSON object per line. Lines that fail to parse are logged as
//! non-fatal warnings and skipped; only file-level I/O failures are errors.

use crate::domain::types::EventRecord;
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Read all event records from a JSONL file.
///
/// Unparseable lines are skipped with a warning; the remaining records are
/// returned in file order.
pub fn read_events<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<EventRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open events file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line
            .with_context(|| format!("Failed to read events file {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<EventRecord>(trimmed) {
            Ok(event) => events.push(event),
            Err(e) => {
                skipped += 1;
                warn!(line = %(line_no + 1), error = %e, "event_line_parse_failed");
            }
        }
    }

    info!(
        file = %path.display(),
        events = %events.len(),
        skipped = %skipped,
        "events_loaded"
    );
    Ok(events)
}

/// Write event records to a JSONL file, one object per line
pub fn write_events<P: AsRef<Path>>(path: P, events: &[EventRecord]) -> anyhow::Result<()> {
    use std::io::Write;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create events file {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    for event in events {
        let json = serde_json::to_string(event).context("Failed to serialize event")?;
        writeln!(writer, "{}", json)
            .with_context(|| format!("Failed to write events file {}", path.display()))?;
    }

    info!(file = %path.display(), events = %events.len(), "events_written");
    Ok(())
}
