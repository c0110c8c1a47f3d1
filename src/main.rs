//! cellflow - population movement analysis from mobility handover events
//!
//! Offline batch replay: reads a JSONL event stream, reconstructs
//! per-subscriber journeys, aggregates them into segment/cell flows, and
//! renders an interactive movement map.
//!
//! Module structure:
//! - `domain/` - Core data types (Journey, CellVisit, Segment, EventRecord)
//! - `services/` - Computational core (SessionTracker, FlowAggregator)
//! - `io/` - Peripheral collaborators (events, sites, report, generator)
//! - `infra/` - Infrastructure (Config)

use anyhow::bail;
use cellflow::infra::Config;
use cellflow::io::{read_events, write_map_report, CellSiteDirectory, ReportOptions};
use cellflow::services::{FlowAggregator, SessionTracker};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// cellflow - aggregated population movement analysis
#[derive(Parser, Debug)]
#[command(name = "cellflow", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,

    /// Path to JSONL file containing mobility events
    #[arg(short, long)]
    events: String,

    /// Output HTML file for the movement map
    #[arg(short, long)]
    output: Option<String>,

    /// Path to the cell site directory (TOML)
    #[arg(long)]
    sites: Option<String>,

    /// Use the built-in sample cell sites instead of a sites file
    #[arg(long)]
    sample_sites: bool,

    /// Maximum inactivity gap (seconds) between visits in one journey
    #[arg(long)]
    max_gap_secs: Option<u64>,

    /// Number of segments in the top-segments table
    #[arg(long)]
    top: Option<usize>,

    /// Map center latitude (auto-calculated if not specified)
    #[arg(long)]
    center_lat: Option<f64>,

    /// Map center longitude (auto-calculated if not specified)
    #[arg(long)]
    center_lon: Option<f64>,

    /// Initial map zoom level
    #[arg(long)]
    zoom: Option<u8>,
}

fn main() -> anyhow::Result<()> {
    // Structured logging with configurable level via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut config = Config::load_from_path(&args.config);

    // CLI flags take precedence over file values
    if let Some(secs) = args.max_gap_secs {
        config.set_max_gap_secs(secs);
    }
    if let Some(sites) = args.sites {
        config.set_sites_file(sites);
    }
    if let Some(output) = args.output {
        config.set_report_output(output);
    }
    if let Some(top) = args.top {
        config.set_top_segments(top);
    }
    config.set_center(args.center_lat, args.center_lon);
    if let Some(zoom) = args.zoom {
        config.set_zoom(zoom);
    }

    info!(
        version = %env!("CARGO_PKG_VERSION"),
        git = %env!("GIT_HASH"),
        config_file = %config.config_file(),
        events_file = %args.events,
        max_gap_secs = %config.max_gap_secs(),
        report_output = %config.report_output(),
        "cellflow starting"
    );

    let sites = if args.sample_sites {
        CellSiteDirectory::sample()
    } else {
        match CellSiteDirectory::from_file(config.sites_file()) {
            Ok(directory) => directory,
            Err(e) => {
                warn!(error = %e, "sites_load_failed_using_sample");
                CellSiteDirectory::sample()
            }
        }
    };

    let events = read_events(&args.events)?;
    if events.is_empty() {
        bail!("no events found in {}", args.events);
    }

    let mut tracker = SessionTracker::new(config.max_gap_secs());
    for event in &events {
        tracker.ingest(event);
    }
    tracker.flush_all();

    let stats = tracker.statistics();
    info!(
        journeys = %stats.total_journeys,
        visits = %stats.total_visits,
        unique_subscribers = %stats.unique_subscribers,
        "replay_complete"
    );

    println!("Journey Statistics:");
    println!("  Total journeys: {}", stats.total_journeys);
    println!("  Total visits: {}", stats.total_visits);
    println!("  Average journey length: {:.2} visits", stats.avg_journey_length);
    println!("  Unique subscribers: {}", stats.unique_subscribers);

    if stats.total_journeys == 0 {
        bail!("no journeys were tracked; check that events carry subscriber and cell attributes");
    }

    let journeys = tracker.into_journeys();
    let mut aggregator = FlowAggregator::new();
    aggregator.aggregate(&journeys);

    let flow_stats = aggregator.statistics();
    println!("\nAggregation Statistics:");
    println!("  Unique segments: {}", flow_stats.total_unique_segments);
    println!("  Cell sites: {}", flow_stats.total_cells);
    println!("  Segment occurrences: {}", flow_stats.total_segment_occurrences);
    println!(
        "  Average journeys per segment: {:.2}",
        flow_stats.avg_journeys_per_segment
    );
    if let Some(most) = &flow_stats.most_traveled_segment {
        println!(
            "  Most traveled: {} -> {} ({} journeys)",
            most.from_cell, most.to_cell, most.journey_count
        );
    }

    let top = aggregator.top_segments(config.top_segments());
    if !top.is_empty() {
        println!("\nTop {} Most Traveled Segments:", top.len());
        for (rank, segment) in top.iter().enumerate() {
            println!(
                "  {}. {} -> {}: {} journeys, {} subscribers",
                rank + 1,
                segment.from_cell,
                segment.to_cell,
                segment.journey_count,
                segment.subscriber_count
            );
        }
    }

    let options = ReportOptions {
        center: match (config.center_lat(), config.center_lon()) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        },
        zoom: config.zoom(),
    };
    write_map_report(config.report_output(), &aggregator, &sites, &options)?;

    println!("\nMap saved to: {}", config.report_output());
    Ok(())
}
