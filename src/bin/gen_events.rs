//! gen-events - synthetic mobility event generator
//!
//! Produces a sorted JSONL event file suitable for replay with `cellflow`.
//!
//! Usage:
//!   gen-events --output sample_events.jsonl --subscribers 50
//!   gen-events --output big.jsonl --subscribers 2000 --seed 42

use cellflow::io::generator::{generate_events, GeneratorOptions, DEFAULT_CELLS};
use cellflow::io::write_events;
use chrono::{TimeZone, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// gen-events - generate sample mobility events for testing
#[derive(Parser, Debug)]
#[command(name = "gen-events", version, about)]
struct Args {
    /// Output JSONL file
    #[arg(short, long, default_value = "sample_events.jsonl")]
    output: String,

    /// Number of subscribers
    #[arg(short, long, default_value = "50")]
    subscribers: usize,

    /// Average number of events per subscriber
    #[arg(long, default_value = "10")]
    events_per_subscriber: usize,

    /// Cell site identifiers to move between (defaults to the sample sites)
    #[arg(long, num_args = 1..)]
    cells: Option<Vec<String>>,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    let args = Args::parse();

    let options = GeneratorOptions {
        subscribers: args.subscribers,
        events_per_subscriber: args.events_per_subscriber,
        cells: args
            .cells
            .unwrap_or_else(|| DEFAULT_CELLS.iter().map(|c| c.to_string()).collect()),
        seed: args.seed,
        ..GeneratorOptions::default()
    };

    let events = generate_events(&options);
    write_events(&args.output, &events)?;

    println!("Generated {} events for {} subscribers", events.len(), args.subscribers);
    println!("Events written to: {}", args.output);

    if let (Some(first), Some(last)) = (events.first(), events.last()) {
        let start = Utc.timestamp_nanos(first.ts);
        let end = Utc.timestamp_nanos(last.ts);
        println!("Time range: {} to {}", start, end);
        info!(start = %start, end = %end, "generation_complete");
    }

    Ok(())
}
