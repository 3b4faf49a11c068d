// Entry point and command-line flow.
//
// - `analyze` loads the processed dataset, computes the batch reports,
//   exports them as CSV plus a JSON summary and prints markdown previews.
// - `replay` feeds the same dataset one record per tick and prints the
//   live snapshot after every tick, wrapping around at the end.
mod classify;
mod config;
mod engine;
mod error;
mod interval;
mod loader;
mod normalize;
mod output;
mod replay;
mod reports;
mod snapshot;
mod tally;
mod types;
mod util;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::EngineConfig;
use engine::Engine;
use replay::ReplayDriver;
use snapshot::Snapshot;
use types::OutageRecord;

#[derive(Debug, Parser)]
#[command(name = "outage-report", version, about = "Outage normalization, reports and live replay")]
struct Cli {
    /// Processed dataset (JSON array of outage records).
    #[arg(long, global = true, default_value = "data/processed/outage_data.json")]
    input: PathBuf,

    /// JSON file with `location_aliases` and/or `cause_rules`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace. `RUST_LOG` wins if set.
    #[arg(long, global = true, default_value = "info", env = "OUTAGE_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute and export the batch reports.
    Analyze {
        #[arg(long, default_value = "reports")]
        out_dir: PathBuf,
    },
    /// Replay the dataset one record per tick.
    Replay {
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,
        /// Stop after this many ticks instead of cycling forever.
        #[arg(long)]
        ticks: Option<usize>,
    },
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn build_engine(config_path: Option<&Path>) -> anyhow::Result<Engine> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    Ok(Engine::new(&config)?)
}

fn load(path: &Path) -> anyhow::Result<Vec<OutageRecord>> {
    let (data, report) = loader::load_records(path)
        .with_context(|| format!("cannot load dataset {}", path.display()))?;
    println!(
        "Processing dataset... ({} records loaded, {} entries skipped)",
        util::format_int(report.loaded_rows),
        util::format_int(report.skipped_rows)
    );
    if report.defaulted_rows > 0 {
        println!(
            "Note: {} records had missing fields.",
            util::format_int(report.defaulted_rows)
        );
    }
    println!();
    Ok(data)
}

/// Compute every batch report, write the files and print previews.
fn handle_analyze(data: &[OutageRecord], engine: &Engine, out_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let all = reports::generate_all(data, engine);

    let file1 = out_dir.join("location_outage_summary.csv");
    output::write_csv(&file1, &all.locations)?;
    output::preview_table(1, "Outages by Location", Some("raw location names"), &all.locations, 5);
    println!("(Full table exported to {})", file1.display());

    let file1b = out_dir.join("location_outage_summary_canonical.csv");
    output::write_csv(&file1b, &all.canonical_locations)?;
    output::preview_table(
        2,
        "Outages by Municipality",
        Some("historical names merged"),
        &all.canonical_locations,
        5,
    );
    println!("(Full table exported to {})", file1b.display());

    let file2 = out_dir.join("monthly_duration_outage_data.csv");
    output::write_csv(&file2, &all.monthly)?;
    output::preview_table(3, "Total Outage Duration by Month", None, &all.monthly, 6);
    println!("(Full table exported to {})", file2.display());

    let file3 = out_dir.join("cause_by_location_matrix.csv");
    output::write_matrix_csv(&file3, &all.matrix)?;
    output::preview_matrix(4, "Outage Causes by Location", &all.matrix, 5);
    println!("(Full table exported to {})", file3.display());

    let file4 = out_dir.join("cause_frequency.csv");
    output::write_csv(&file4, &all.causes)?;
    output::preview_table(5, "Outage Causes", None, &all.causes, 5);
    println!("(Full table exported to {})", file4.display());

    let summary_path = out_dir.join("summary.json");
    output::write_json(&summary_path, &all.summary)?;
    println!("\nSummary Stats ({}):", summary_path.display());
    println!(
        "{{\"total_hours\": {}, \"invalid_durations\": {}, \"dropped_tags\": {}}}\n",
        util::format_number(all.summary.total_hours, 2),
        util::format_int(all.summary.invalid_durations),
        util::format_int(all.summary.dropped_tags)
    );
    Ok(())
}

fn print_snapshot(snap: &Snapshot) {
    println!("Events this cycle: {}", snap.events_in_cycle);
    if let Some(event) = &snap.latest_event {
        println!("Latest: {}", event);
    }
    output::preview_table_rows(&snap.cause_shares, snap.cause_shares.len());
    output::preview_table_rows(&snap.top_locations, snapshot::TOP_LOCATIONS);
}

fn handle_replay(data: &[OutageRecord], engine: &Engine, interval_ms: u64, ticks: Option<usize>) {
    let mut driver = ReplayDriver::new(data, engine, Duration::from_millis(interval_ms));
    driver.run(ticks, print_snapshot);
    let agg = driver.aggregator();
    println!(
        "Replay stopped: {} full cycles, {} events into the current one.",
        util::format_int(agg.cycle()),
        util::format_int(agg.cursor())
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);
    tracing::info!("outage-report v{} starting", env!("CARGO_PKG_VERSION"));

    let engine = build_engine(cli.config.as_deref())?;
    let data = load(&cli.input)?;

    match cli.command {
        Command::Analyze { out_dir } => handle_analyze(&data, &engine, &out_dir)?,
        Command::Replay { interval_ms, ticks } => handle_replay(&data, &engine, interval_ms, ticks),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_cli_parses_replay_flags() {
        let cli = Cli::try_parse_from([
            "outage-report",
            "replay",
            "--interval-ms",
            "10",
            "--ticks",
            "4",
            "--input",
            "x.json",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("x.json"));
        match cli.command {
            Command::Replay { interval_ms, ticks } => {
                assert_eq!(interval_ms, 10);
                assert_eq!(ticks, Some(4));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_build_engine_with_bad_pattern_fails() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"cause_rules": [{{"pattern": "[", "category": "Repair"}}]}}"#).unwrap();
        assert!(build_engine(Some(file.path())).is_err());
    }

    #[test]
    fn test_analyze_writes_all_files() {
        let dir = TempDir::new().unwrap();
        let engine = build_engine(None).unwrap();
        let data = vec![types::fixtures::record(
            "Nilsiä",
            (2024, 5, 2),
            "08:00",
            "10:30",
            &["Kaivuutyöt"],
        )];
        handle_analyze(&data, &engine, dir.path()).unwrap();
        for name in [
            "location_outage_summary.csv",
            "location_outage_summary_canonical.csv",
            "monthly_duration_outage_data.csv",
            "cause_by_location_matrix.csv",
            "cause_frequency.csv",
            "summary.json",
        ] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
    }
}
