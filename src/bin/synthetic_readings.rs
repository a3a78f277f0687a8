//! Synthetic Equipment Readings
//!
//! Generates a sensor table for demos and manual testing of the
//! `equipment-health` CLI. Each component runs healthy until a randomly
//! placed wear onset, then degrades: temperature and vibration climb while
//! pressure falls, eventually crossing the failure thresholds.
//!
//! # Usage
//! ```bash
//! ./synthetic-readings --hours 500 --seed 7 --output readings.csv
//! ./equipment-health readings.csv --by-component
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

// ============================================================================
// Equipment Constants
// ============================================================================

/// Healthy operating temperature (°C)
const BASE_TEMPERATURE: f64 = 60.0;
/// Temperature rise at full wear (°C)
const TEMPERATURE_RISE: f64 = 70.0;
/// Healthy vibration level (g)
const BASE_VIBRATION: f64 = 0.2;
/// Vibration rise at full wear (g)
const VIBRATION_RISE: f64 = 2.1;
/// Healthy discharge pressure (psi)
const BASE_PRESSURE: f64 = 330.0;
/// Pressure loss at full wear (psi)
const PRESSURE_DROP: f64 = 115.0;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "synthetic-readings")]
#[command(about = "Synthetic degrading-equipment sensor table for equipment-health")]
#[command(version)]
struct Args {
    /// Total operating hours covered by the table
    #[arg(short = 'H', long, default_value = "500")]
    hours: f64,

    /// Operating hours between consecutive readings
    #[arg(long, default_value = "1.0")]
    step: f64,

    /// Comma-separated component names
    #[arg(long, default_value = "pump,motor,gearbox", value_delimiter = ',')]
    components: Vec<String>,

    /// Fraction of sensor cells left blank, 0.0-1.0
    #[arg(long, default_value = "0.0")]
    missing_rate: f64,

    /// Add a Timestamp column starting at this time (one reading per step hours)
    #[arg(long, value_name = "YYYY-MM-DD HH:MM:SS")]
    start: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress the generation log on stderr
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================================
// Component Model
// ============================================================================

/// Degradation profile of one simulated component
struct ComponentProfile {
    name: String,
    /// Fraction of the run after which wear sets in
    wear_onset: f64,
    /// Per-component offset on healthy levels
    temperature_offset: f64,
    pressure_offset: f64,
}

impl ComponentProfile {
    fn random(name: &str, rng: &mut StdRng) -> Self {
        Self {
            name: name.trim().to_string(),
            wear_onset: rng.gen_range(0.45..0.8),
            temperature_offset: rng.gen_range(-5.0..5.0),
            pressure_offset: rng.gen_range(-8.0..8.0),
        }
    }

    /// Wear level in [0, 1] at run progress `p`.
    fn wear(&self, p: f64) -> f64 {
        if p <= self.wear_onset {
            0.0
        } else {
            ((p - self.wear_onset) / (1.0 - self.wear_onset)).powi(2).min(1.0)
        }
    }
}

struct NoiseModel {
    temperature: Normal<f64>,
    vibration: Normal<f64>,
    pressure: Normal<f64>,
}

impl NoiseModel {
    fn new() -> Result<Self> {
        Ok(Self {
            temperature: Normal::new(0.0, 1.5)?,
            vibration: Normal::new(0.0, 0.05)?,
            pressure: Normal::new(0.0, 3.0)?,
        })
    }
}

fn cell(value: f64, missing_rate: f64, rng: &mut StdRng) -> String {
    if missing_rate > 0.0 && rng.gen_bool(missing_rate) {
        String::new()
    } else {
        format!("{value:.3}")
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    anyhow::ensure!(args.hours > 0.0 && args.hours.is_finite(), "--hours must be positive");
    anyhow::ensure!(args.step > 0.0 && args.step.is_finite(), "--step must be positive");
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.missing_rate),
        "--missing-rate must be within 0.0-1.0"
    );
    anyhow::ensure!(!args.components.is_empty(), "at least one component is required");

    let start = args
        .start
        .as_deref()
        .map(|s| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .transpose()
        .context("--start must look like 2024-01-01 00:00:00")?;

    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let noise = NoiseModel::new()?;
    let profiles: Vec<ComponentProfile> = args
        .components
        .iter()
        .map(|name| ComponentProfile::random(name, &mut rng))
        .collect();

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);

    if start.is_some() {
        writeln!(out, "Timestamp,Component_Type,Operating_Hours,Temperature,Vibration,Pressure")?;
    } else {
        writeln!(out, "Component_Type,Operating_Hours,Temperature,Vibration,Pressure")?;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = (args.hours / args.step).floor() as u64;
    let mut rows = 0u64;
    for i in 0..=steps {
        #[allow(clippy::cast_precision_loss)]
        let hours = i as f64 * args.step;
        let progress = hours / args.hours;

        for profile in &profiles {
            let wear = profile.wear(progress);
            let temperature = BASE_TEMPERATURE
                + profile.temperature_offset
                + TEMPERATURE_RISE * wear
                + noise.temperature.sample(&mut rng);
            let vibration =
                (BASE_VIBRATION + VIBRATION_RISE * wear + noise.vibration.sample(&mut rng)).max(0.0);
            let pressure = BASE_PRESSURE + profile.pressure_offset - PRESSURE_DROP * wear
                + noise.pressure.sample(&mut rng);

            if let Some(t0) = start {
                #[allow(clippy::cast_possible_truncation)]
                let ts = t0 + chrono::Duration::seconds((hours * 3600.0).round() as i64);
                write!(out, "{},", ts.format("%Y-%m-%d %H:%M:%S"))?;
            }
            writeln!(
                out,
                "{},{:.3},{},{},{}",
                profile.name,
                hours,
                cell(temperature, args.missing_rate, &mut rng),
                cell(vibration, args.missing_rate, &mut rng),
                cell(pressure, args.missing_rate, &mut rng),
            )?;
            rows += 1;
        }
    }
    out.flush()?;

    if !args.quiet {
        eprintln!("Generated {rows} readings for {} component(s)", profiles.len());
        for p in &profiles {
            eprintln!(
                "  {:<12} wear onset at {:.0} h",
                p.name,
                p.wear_onset * args.hours
            );
        }
    }
    Ok(())
}
