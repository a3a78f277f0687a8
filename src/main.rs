//! Equipment Health - sensor dashboard on the command line
//!
//! Loads a sensor table, rates the latest (or a selected) reading against
//! the fixed health bands and reports first failure-threshold breaches.
//!
//! # Usage
//!
//! ```bash
//! # Latest reading, text dashboard
//! equipment-health readings.csv
//!
//! # Reading nearest to 420 operating hours, one summary per component
//! equipment-health readings.csv --hour 420 --by-component
//!
//! # JSON output plus a multi-page export
//! equipment-health readings.csv --json --export report/
//!
//! # Pick operating hours interactively (type a number, `latest` or `quit`)
//! equipment-health readings.csv --interactive
//!
//! # Write a starter config with the built-in defaults
//! equipment-health --write-config health_config.toml
//! ```
//!
//! # Environment Variables
//!
//! - `EQUIPMENT_HEALTH_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use equipment_health::config::{HealthConfig, OutputFormat};
use equipment_health::interactive::run_interactive;
use equipment_health::processing::{summarize, summarize_by_component};
use equipment_health::report::{compose_pages, render_json, render_text, DirectorySink, ReportSink, SeriesOverview};
use equipment_health::sensors::SensorTable;
use equipment_health::types::Target;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "equipment-health")]
#[command(about = "Threshold-based health rating for equipment sensor readings")]
#[command(version)]
struct CliArgs {
    /// Sensor table (.xlsx or CSV with operating hours, temperature, vibration, pressure)
    #[arg(required_unless_present = "write_config")]
    file: Option<PathBuf>,

    /// Select the reading nearest to this operating-hour value
    #[arg(long, value_name = "HOURS", conflicts_with = "latest")]
    hour: Option<f64>,

    /// Select the last complete reading (default)
    #[arg(long)]
    latest: bool,

    /// Path to a TOML config file (overrides EQUIPMENT_HEALTH_CONFIG)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit JSON instead of the text dashboard
    #[arg(long)]
    json: bool,

    /// One summary per component type
    #[arg(long)]
    by_component: bool,

    /// Write a multi-page report into this directory
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Read selections from stdin and re-render after each one
    #[arg(short, long, conflicts_with = "json")]
    interactive: bool,

    /// Write the effective config to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Log as JSON lines instead of human-readable text
    #[arg(long)]
    log_json: bool,
}

impl CliArgs {
    fn target(&self) -> Target {
        match self.hour {
            Some(h) if !self.latest => Target::Hours(h),
            _ => Target::Latest,
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // Reports go to stdout; logs stay on stderr
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = HealthConfig::load_with_override(args.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(path) = &args.write_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let Some(file) = &args.file else {
        anyhow::bail!("No sensor table given");
    };

    let table = SensorTable::load(file, &config.input.load_config())
        .with_context(|| format!("Failed to load sensor table {}", file.display()))?;

    let readings = if config.input.sort_by_hours {
        table.sorted_by_hours()
    } else {
        table.into_readings()
    };

    let by_component = args.by_component || config.report.by_component;
    let target = args.target();

    info!(
        readings = readings.len(),
        %target,
        by_component,
        "Analyzing sensor table"
    );

    if args.interactive {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stats = run_interactive(&readings, by_component, target, stdin, tokio::io::stdout())
            .await
            .context("Interactive session failed")?;
        info!(requests = stats.requests, rendered = stats.rendered, "Done");
        return Ok(());
    }

    let summaries = if by_component {
        summarize_by_component(&readings, target)
    } else {
        summarize(&readings, target).map(|s| vec![s])
    }
    .context("Failed to summarize sensor table")?;

    let overview = SeriesOverview::compute(&readings, &config.trend);

    for summary in &summaries {
        if !summary.failures.is_empty() {
            warn!(
                component = summary.component_name(),
                failures = summary.failures.events().count(),
                "Failure thresholds crossed"
            );
        }
    }

    let format = if args.json { OutputFormat::Json } else { config.report.format };
    match format {
        OutputFormat::Text => print!("{}", render_text(&summaries, &overview)),
        OutputFormat::Json => println!(
            "{}",
            render_json(&summaries, &overview).context("Failed to encode JSON report")?
        ),
    }

    if let Some(dir) = args.export.as_ref().or(config.report.export_dir.as_ref()) {
        let pages = compose_pages(&summaries, &overview).context("Failed to compose report pages")?;
        let mut sink = DirectorySink::new(dir);
        let written = sink
            .write_pages(&pages)
            .with_context(|| format!("Failed to export report to {}", dir.display()))?;
        info!(sink = sink.sink_name(), pages = written, "Report export complete");
    }

    Ok(())
}
