use std::{collections::BTreeSet, path::PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use smartzone::{
    alerts::{AlertSummary, AlertThresholds, Severity},
    analytics::{self, RecordFilter},
    scenario::{Scenario, ScenarioLoader},
    sink::{self, CsvSink, JsonSink, RecordSink},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Runway wear simulator")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate one operating window and write the records
    Run(RunArgs),
    /// Summarise previously written records
    Report(ReportArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Scenario YAML file; built-in defaults when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    interval_minutes: Option<i64>,

    /// Window start, e.g. 2025-09-05T00:00:00
    #[arg(long)]
    start_time: Option<NaiveDateTime>,

    #[arg(long, default_value = "runway_data.csv")]
    csv: PathBuf,

    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ReportArgs {
    #[arg(long, default_value = "runway_data.csv")]
    csv: PathBuf,

    /// Only include these zones
    #[arg(long = "zone")]
    zones: Vec<u32>,

    /// Only include these aircraft types
    #[arg(long = "aircraft")]
    aircraft: Vec<String>,

    #[arg(long, default_value_t = 100.0)]
    stress: f64,

    #[arg(long, default_value_t = 2.0)]
    rubber_mm: f64,

    #[arg(long, default_value_t = 5.0)]
    cracks_mm: f64,

    #[arg(long, default_value_t = 10.0)]
    water_mm: f64,

    #[arg(long, default_value_t = 50.0)]
    fod_weight_g: f64,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Run(args) => run(args),
        Command::Report(args) => report(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut scenario = match &args.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::default(),
    };
    if let Some(interval) = args.interval_minutes {
        scenario.schedule.interval_minutes = interval;
    }
    if let Some(start) = args.start_time {
        scenario.schedule.start_time = start;
    }
    let seed = args.seed.or(scenario.seed).unwrap_or_else(|| {
        let seed: u64 = rand::random();
        tracing::info!(seed, "no seed configured, drew one from entropy");
        seed
    });

    let scheduler = scenario.build_scheduler()?;
    let mut ctx = scenario.build_context(seed)?;
    let records = scheduler.simulate_run(
        &mut ctx,
        scenario.schedule.start_time,
        scenario.schedule.interval_minutes,
    )?;

    CsvSink::new(&args.csv)
        .write(&records)
        .with_context(|| format!("Failed to write {}", args.csv.display()))?;
    if let Some(path) = &args.json {
        JsonSink::new(path)
            .write(&records)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let summary = analytics::overview(&records);
    println!(
        "Scenario '{}' (seed {}) produced {} records across {} zones, {} anomalies.",
        scenario.name, seed, summary.records, summary.zones, summary.anomalies
    );
    Ok(())
}

fn report(args: ReportArgs) -> Result<()> {
    let records = sink::load_csv(&args.csv)
        .with_context(|| format!("Failed to load {}", args.csv.display()))?;
    let filter = RecordFilter {
        zones: args.zones.iter().copied().collect::<BTreeSet<_>>(),
        aircraft: args.aircraft.iter().cloned().collect::<BTreeSet<_>>(),
        ..RecordFilter::default()
    };
    let selected: Vec<_> = filter.apply(&records).into_iter().cloned().collect();
    if selected.is_empty() {
        println!("No records match the selected filters.");
        return Ok(());
    }

    let thresholds = AlertThresholds {
        stress: args.stress,
        rubber_mm: args.rubber_mm,
        cracks_mm: args.cracks_mm,
        water_mm: args.water_mm,
        fod_weight_g: args.fod_weight_g,
    };

    let overview = analytics::overview(&selected);
    println!(
        "{} records, {} anomalies, mean stress {:.2}",
        overview.records,
        overview.anomalies,
        overview.mean_stress.unwrap_or_default()
    );

    println!("zone  flights  stress   fod_g  rubber  cracks  max_water  anomalies");
    for zone in analytics::zone_summaries(&selected) {
        println!(
            "{:>4}  {:>7}  {:>6.2}  {:>6.2}  {:>6.2}  {:>6.2}  {:>9.2}  {:>9}",
            zone.zone,
            zone.records,
            zone.mean_stress,
            zone.mean_fod_weight_g,
            zone.mean_rubber_mm,
            zone.mean_cracks_mm,
            zone.max_water_mm,
            zone.anomalies
        );
    }

    for (aircraft, stress) in analytics::aircraft_stress(&selected) {
        println!("{aircraft:>6}  mean stress {stress:.2}");
    }

    let alerts = AlertSummary::build(&selected, &thresholds);
    println!(
        "alerts: {} threshold, {} combined, top zone {}",
        alerts.threshold_alerts,
        alerts.combined_alerts,
        alerts
            .top_zone
            .map(|z| z.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    for severity in Severity::ALL {
        println!(
            "  {:<8} {}",
            severity.label(),
            alerts.severity_counts.get(&severity).copied().unwrap_or(0)
        );
    }
    Ok(())
}
