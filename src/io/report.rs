//! Movement map report - renders aggregated flows as a Leaflet HTML map
//!
//! The report is a single self-contained HTML file: cell sites become
//! circle markers sized by traffic, segments become polylines weighted by
//! journey count, plus a statistics panel. Reads the aggregator's query
//! API only; core state is never mutated here.

use crate::io::sites::CellSiteDirectory;
use crate::services::aggregator::FlowAggregator;
use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

/// Fallback map center when no cell has a known location (central London,
/// matching the sample site directory)
const FALLBACK_CENTER: (f64, f64) = (51.5074, -0.1278);

/// Map rendering options, resolved from config and CLI flags
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub center: Option<(f64, f64)>,
    pub zoom: u8,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { center: None, zoom: 12 }
    }
}

/// Render the movement map to an HTML file.
///
/// Cells and segments without a known location are skipped with a warning
/// count; they still appear in the statistics panel totals.
pub fn write_map_report<P: AsRef<Path>>(
    path: P,
    aggregator: &FlowAggregator,
    sites: &CellSiteDirectory,
    options: &ReportOptions,
) -> anyhow::Result<()> {
    let path = path.as_ref();

    let mut cells = Vec::new();
    let mut unlocated_cells = 0usize;
    for flow in aggregator.all_cells() {
        let Some((lat, lon)) = sites.location(&flow.cell_id) else {
            unlocated_cells += 1;
            continue;
        };
        let name = sites
            .get(&flow.cell_id)
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| flow.cell_id.to_string());
        cells.push(serde_json::json!({
            "id": flow.cell_id.as_str(),
            "name": name,
            "lat": lat,
            "lon": lon,
            "entries": flow.total_entries,
            "exits": flow.total_exits,
            "subscribers": flow.unique_subscribers.len(),
        }));
    }

    let mut segments = Vec::new();
    let mut unlocated_segments = 0usize;
    for flow in aggregator.all_segments() {
        let (Some(from), Some(to)) =
            (sites.location(&flow.from_cell), sites.location(&flow.to_cell))
        else {
            unlocated_segments += 1;
            continue;
        };
        segments.push(serde_json::json!({
            "from": flow.from_cell.as_str(),
            "to": flow.to_cell.as_str(),
            "from_lat": from.0,
            "from_lon": from.1,
            "to_lat": to.0,
            "to_lon": to.1,
            "journeys": flow.journey_count,
            "subscribers": flow.subscriber_count,
        }));
    }

    if unlocated_cells > 0 || unlocated_segments > 0 {
        warn!(
            cells = %unlocated_cells,
            segments = %unlocated_segments,
            "report_skipped_unlocated"
        );
    }

    let stats = aggregator.statistics();
    let stats_json = serde_json::json!({
        "unique_segments": stats.total_unique_segments,
        "cells": stats.total_cells,
        "segment_occurrences": stats.total_segment_occurrences,
        "avg_journeys_per_segment": stats.avg_journeys_per_segment,
        "most_traveled": stats.most_traveled_segment.as_ref().map(|m| {
            serde_json::json!({
                "from": m.from_cell.as_str(),
                "to": m.to_cell.as_str(),
                "journeys": m.journey_count,
            })
        }),
    });

    let (center_lat, center_lon) = options
        .center
        .unwrap_or_else(|| map_center(aggregator, sites).unwrap_or(FALLBACK_CENTER));

    let html = MAP_TEMPLATE
        .replace("{{center_lat}}", &center_lat.to_string())
        .replace("{{center_lon}}", &center_lon.to_string())
        .replace("{{zoom}}", &options.zoom.to_string())
        .replace("{{cells}}", &serde_json::Value::Array(cells).to_string())
        .replace("{{segments}}", &serde_json::Value::Array(segments).to_string())
        .replace("{{stats}}", &stats_json.to_string());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, html)
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    info!(file = %path.display(), "report_written");
    Ok(())
}

/// Mean coordinate over the aggregated cells with a known location
fn map_center(aggregator: &FlowAggregator, sites: &CellSiteDirectory) -> Option<(f64, f64)> {
    let located: Vec<(f64, f64)> = aggregator
        .all_cells()
        .iter()
        .filter_map(|flow| sites.location(&flow.cell_id))
        .collect();
    if located.is_empty() {
        return None;
    }
    let n = located.len() as f64;
    let lat = located.iter().map(|(lat, _)| lat).sum::<f64>() / n;
    let lon = located.iter().map(|(_, lon)| lon).sum::<f64>() / n;
    Some((lat, lon))
}

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Population Movement</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
  html, body, #map { height: 100%; margin: 0; }
  .panel {
    position: absolute; top: 10px; right: 10px; z-index: 1000;
    background: rgba(255, 255, 255, 0.92); padding: 10px 14px;
    border-radius: 4px; font: 13px/1.5 sans-serif; max-width: 280px;
    box-shadow: 0 1px 4px rgba(0, 0, 0, 0.3);
  }
  .panel h3 { margin: 0 0 6px; font-size: 14px; }
  .legend {
    position: absolute; bottom: 20px; left: 10px; z-index: 1000;
    background: rgba(255, 255, 255, 0.92); padding: 8px 12px;
    border-radius: 4px; font: 12px/1.6 sans-serif;
  }
  .legend .swatch {
    display: inline-block; width: 18px; height: 4px; margin-right: 6px;
    vertical-align: middle;
  }
</style>
</head>
<body>
<div id="map"></div>
<div class="panel" id="stats"></div>
<div class="legend">
  <div><span class="swatch" style="background:#d73027"></span>heavy flow</div>
  <div><span class="swatch" style="background:#fc8d59"></span>medium flow</div>
  <div><span class="swatch" style="background:#91bfdb"></span>light flow</div>
</div>
<script>
var cells = {{cells}};
var segments = {{segments}};
var stats = {{stats}};

var map = L.map('map').setView([{{center_lat}}, {{center_lon}}], {{zoom}});
L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);

var maxJourneys = segments.reduce(function (m, s) {
  return Math.max(m, s.journeys);
}, 1);

segments.forEach(function (s) {
  var ratio = s.journeys / maxJourneys;
  var color = ratio > 0.66 ? '#d73027' : ratio > 0.33 ? '#fc8d59' : '#91bfdb';
  L.polyline(
    [[s.from_lat, s.from_lon], [s.to_lat, s.to_lon]],
    { color: color, weight: 2 + 6 * ratio, opacity: 0.8 }
  ).bindPopup(
    '<b>' + s.from + ' &rarr; ' + s.to + '</b><br>' +
    s.journeys + ' journeys, ' + s.subscribers + ' subscribers'
  ).addTo(map);
});

var maxTraffic = cells.reduce(function (m, c) {
  return Math.max(m, c.entries + c.exits);
}, 1);

cells.forEach(function (c) {
  var traffic = c.entries + c.exits;
  var ratio = traffic / maxTraffic;
  var color = ratio > 0.66 ? '#d73027' : ratio > 0.33 ? '#fc8d59' : '#91bfdb';
  L.circleMarker([c.lat, c.lon], {
    radius: 6 + 10 * ratio,
    color: '#333',
    weight: 1,
    fillColor: color,
    fillOpacity: 0.7
  }).bindPopup(
    '<b>' + c.name + '</b><br>' + c.id + '<br>' +
    c.entries + ' entries, ' + c.exits + ' exits<br>' +
    c.subscribers + ' subscribers'
  ).addTo(map);
});

var panel = document.getElementById('stats');
var lines = [
  '<h3>Movement Statistics</h3>',
  'Unique segments: ' + stats.unique_segments,
  'Cell sites: ' + stats.cells,
  'Segment occurrences: ' + stats.segment_occurrences,
  'Avg journeys/segment: ' + stats.avg_journeys_per_segment.toFixed(2)
];
if (stats.most_traveled) {
  lines.push(
    'Busiest: ' + stats.most_traveled.from + ' &rarr; ' +
    stats.most_traveled.to + ' (' + stats.most_traveled.journeys + ')'
  );
}
panel.innerHTML = lines.join('<br>');
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::{CellVisit, Journey};
    use crate::domain::types::{CellId, SubscriberKey};
    use tempfile::tempdir;

    fn sample_journey() -> Journey {
        let key = SubscriberKey::from("IMSI:1");
        let visits = vec![
            CellVisit {
                cell_id: CellId::from("001001:0000001"),
                timestamp: 1_000_000_000,
                event_name: "Mobility.Handover.Notified".to_string(),
                subscriber_key: key.clone(),
            },
            CellVisit {
                cell_id: CellId::from("001001:0000002"),
                timestamp: 2_000_000_000,
                event_name: "Mobility.Handover.Notified".to_string(),
                subscriber_key: key.clone(),
            },
        ];
        Journey {
            subscriber_key: key,
            journey_id: "IMSI:1_1".to_string(),
            visits,
            start_time: 1_000_000_000,
            end_time: 2_000_000_000,
        }
    }

    #[test]
    fn test_write_map_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.html");

        let mut aggregator = FlowAggregator::new();
        aggregator.aggregate(&[sample_journey()]);
        let sites = CellSiteDirectory::sample();

        write_map_report(&path, &aggregator, &sites, &ReportOptions::default()).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("001001:0000001"));
        assert!(html.contains("Central London Tower 1"));
        assert!(html.contains("\"journeys\":1"));
        // No unresolved template tokens
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_markers_colored_by_traffic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.html");

        let mut aggregator = FlowAggregator::new();
        aggregator.aggregate(&[sample_journey()]);
        let sites = CellSiteDirectory::sample();

        write_map_report(&path, &aggregator, &sites, &ReportOptions::default()).unwrap();

        // Cell markers use the same traffic-ratio color scale as segments,
        // not a fixed fill
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("fillColor: color"));
        assert!(!html.contains("#3186cc"));
    }

    #[test]
    fn test_unknown_cells_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.html");

        let mut aggregator = FlowAggregator::new();
        aggregator.aggregate(&[sample_journey()]);
        // Empty directory: every cell and segment is unlocated
        let sites = CellSiteDirectory::new();

        write_map_report(&path, &aggregator, &sites, &ReportOptions::default()).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("var cells = [];"));
        assert!(html.contains("var segments = [];"));
        // Statistics still reflect the full aggregation
        assert!(html.contains("\"unique_segments\":1"));
    }

    #[test]
    fn test_explicit_center_used() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.html");

        let aggregator = FlowAggregator::new();
        let sites = CellSiteDirectory::sample();
        let options = ReportOptions { center: Some((48.85, 2.35)), zoom: 9 };

        write_map_report(&path, &aggregator, &sites, &options).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("[48.85, 2.35], 9"));
    }
}
