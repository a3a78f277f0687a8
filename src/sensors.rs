//! Sensor Table Loader
//!
//! Parses equipment sensor tables into typed `Reading`s. Two input formats
//! are accepted: Excel workbooks (`.xlsx`, first worksheet, read with
//! `calamine`) and CSV text. Workbooks are recognized by their zip signature,
//! not the file extension. Column roles are detected from the header row:
//! matching is case-insensitive and ignores spaces, underscores, hyphens and a
//! trailing unit suffix such as `(psi)` or `[°C]`.
//!
//! | Role            | Accepted headers                                                  |
//! |-----------------|-------------------------------------------------------------------|
//! | operating hours | Operating_Hours, Operating Hours, Operating Hour, Hours, Hrs, Runtime |
//! | temperature     | Temperature, Temp                                                 |
//! | vibration       | Vibration, Vib                                                    |
//! | pressure        | Pressure, Pres (bar / kPa suffixes are converted to psi)          |
//! | component       | Component_Type, Component, Equipment                              |
//! | timestamp       | Timestamp, Time, DateTime, Date                                   |
//!
//! When the hours column is absent, operating hours are derived from the
//! timestamp column as elapsed hours since the earliest timestamp.
//!
//! # Usage
//!
//! ```ignore
//! use equipment_health::sensors::{LoadConfig, SensorTable};
//!
//! let table = SensorTable::load("readings.csv", &LoadConfig::default())?;
//! for reading in table.readings() {
//!     // Feed into the analysis pipeline
//! }
//! ```

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::Reading;

// ============================================================================
// Unit Conversion Constants
// ============================================================================

/// Bar to PSI
const BAR_TO_PSI: f64 = 14.5038;
/// Kilopascals to PSI
const KPA_TO_PSI: f64 = 0.145038;
/// Leading bytes of a zip container (xlsx workbooks)
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while loading a sensor table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unreadable table: {0}")]
    Format(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No data rows remain after filtering")]
    EmptyInput,

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// CSV Quote-Aware Parsing
// ============================================================================

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
/// Returns owned strings because quoted fields need unquoting.
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                // Escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

// ============================================================================
// Configuration
// ============================================================================

/// Row filtering and value normalization applied while loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Drop rows missing operating hours, temperature, vibration or pressure
    pub drop_incomplete: bool,
    /// Round numeric values to this many decimals
    pub round_decimals: Option<u32>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            drop_incomplete: true,
            round_decimals: Some(crate::config::defaults::ROUND_DECIMALS),
        }
    }
}

// ============================================================================
// Column Detection
// ============================================================================

/// Lowercase a header, drop a trailing unit suffix and separator characters.
fn normalize_header(header: &str) -> String {
    let base = header
        .split(['(', '['])
        .next()
        .unwrap_or(header);
    base.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '\t'))
        .flat_map(char::to_lowercase)
        .collect()
}

const HOURS_ALIASES: &[&str] = &["operatinghours", "operatinghour", "hours", "hrs", "runtime"];
const TEMPERATURE_ALIASES: &[&str] = &["temperature", "temp"];
const VIBRATION_ALIASES: &[&str] = &["vibration", "vib"];
const PRESSURE_ALIASES: &[&str] = &["pressure", "pres"];
const COMPONENT_ALIASES: &[&str] = &["componenttype", "component", "equipment"];
const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "time", "datetime", "date"];

/// Column indices for each role, detected from the header row
#[derive(Debug, Clone, PartialEq)]
struct ColumnMap {
    hours: Option<usize>,
    temperature: Option<usize>,
    vibration: Option<usize>,
    pressure: Option<usize>,
    component: Option<usize>,
    timestamp: Option<usize>,
    /// Multiplier bringing the pressure column to psi
    pressure_scale: f64,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            hours: None,
            temperature: None,
            vibration: None,
            pressure: None,
            component: None,
            timestamp: None,
            pressure_scale: 1.0,
        }
    }
}

impl ColumnMap {
    fn from_header(columns: &[String]) -> Self {
        let mut map = Self::default();

        for (idx, raw) in columns.iter().enumerate() {
            let name = normalize_header(raw);
            let slot = if HOURS_ALIASES.contains(&name.as_str()) {
                &mut map.hours
            } else if TEMPERATURE_ALIASES.contains(&name.as_str()) {
                &mut map.temperature
            } else if VIBRATION_ALIASES.contains(&name.as_str()) {
                &mut map.vibration
            } else if PRESSURE_ALIASES.contains(&name.as_str()) {
                if map.pressure.is_none() {
                    let lower = raw.to_lowercase();
                    if lower.contains("kpa") {
                        map.pressure_scale = KPA_TO_PSI;
                    } else if lower.contains("bar") {
                        map.pressure_scale = BAR_TO_PSI;
                    }
                }
                &mut map.pressure
            } else if COMPONENT_ALIASES.contains(&name.as_str()) {
                &mut map.component
            } else if TIMESTAMP_ALIASES.contains(&name.as_str()) {
                &mut map.timestamp
            } else {
                continue;
            };

            if slot.is_none() {
                *slot = Some(idx);
            } else {
                tracing::debug!(column = %raw.trim(), "Duplicate column role, keeping the first");
            }
        }

        map
    }

    fn validate(&self) -> Result<(), LoadError> {
        let mut missing = Vec::new();
        if self.hours.is_none() && self.timestamp.is_none() {
            missing.push("Operating_Hours".to_string());
        }
        for (idx, name) in [
            (self.temperature, "Temperature"),
            (self.vibration, "Vibration"),
            (self.pressure, "Pressure"),
        ] {
            if idx.is_none() {
                missing.push(name.to_string());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoadError::MissingColumns(missing))
        }
    }

    fn derives_hours(&self) -> bool {
        self.hours.is_none() && self.timestamp.is_some()
    }

    /// Summary of detected columns for logging
    fn summary(&self) -> String {
        let mut found = vec!["temperature", "vibration", "pressure"];
        if self.hours.is_some() {
            found.push("hours");
        }
        if self.component.is_some() {
            found.push("component");
        }
        if self.timestamp.is_some() {
            found.push("timestamp");
        }
        found.join(", ")
    }
}

// ============================================================================
// Loaded Table
// ============================================================================

/// Load statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// File path, or `<memory>` for in-memory input
    pub source: String,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    /// Operating hours were derived from timestamps
    pub derived_hours: bool,
    pub columns_found: String,
}

/// A fully-loaded, immutable sensor table
#[derive(Debug, Clone)]
pub struct SensorTable {
    readings: Vec<Reading>,
    pub stats: LoadStats,
}

impl SensorTable {
    /// Load an `.xlsx` workbook or CSV file from disk.
    pub fn load(path: impl AsRef<Path>, config: &LoadConfig) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut table = Self::from_bytes(&bytes, config)?;
        table.stats.source = path.display().to_string();

        tracing::info!(
            file = %table.stats.source,
            readings = table.stats.rows_kept,
            dropped = table.stats.rows_dropped,
            derived_hours = table.stats.derived_hours,
            "Sensor table loaded"
        );
        Ok(table)
    }

    /// Parse raw file contents: a workbook when zip-signed, CSV text otherwise.
    pub fn from_bytes(bytes: &[u8], config: &LoadConfig) -> Result<Self, LoadError> {
        if bytes.starts_with(ZIP_MAGIC) {
            return Self::from_records(workbook_records(bytes)?, config);
        }
        let text = std::str::from_utf8(bytes)
            .map_err(|e| LoadError::Format(format!("input is not UTF-8 text ({e})")))?;
        Self::parse(text, config)
    }

    /// Parse CSV text.
    pub fn parse(text: &str, config: &LoadConfig) -> Result<Self, LoadError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let records = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(csv_split)
            .collect();
        Self::from_records(records, config)
    }

    /// Build the table from header-first rows of cell text.
    fn from_records(records: Vec<Vec<String>>, config: &LoadConfig) -> Result<Self, LoadError> {
        let mut records = records.into_iter();
        let columns = records
            .next()
            .ok_or_else(|| LoadError::Format("no header row".to_string()))?;
        if columns.iter().all(|c| c.trim().is_empty()) {
            return Err(LoadError::Format("header row has no columns".to_string()));
        }

        let col_map = ColumnMap::from_header(&columns);
        col_map.validate()?;
        tracing::debug!(columns = %col_map.summary(), "Detected sensor columns");

        let mut readings: Vec<Reading> = records
            .enumerate()
            .map(|(row, fields)| parse_row(row, &fields, &col_map, config))
            .collect();
        let rows_read = readings.len();

        let derived_hours = col_map.derives_hours();
        if derived_hours {
            derive_hours(&mut readings, config.round_decimals);
        }

        if config.drop_incomplete {
            readings.retain(Reading::is_complete);
        }
        let rows_kept = readings.len();

        if readings.is_empty() {
            return Err(LoadError::EmptyInput);
        }

        if rows_kept < rows_read {
            tracing::warn!(
                dropped = rows_read - rows_kept,
                kept = rows_kept,
                "Dropped incomplete sensor rows"
            );
        }

        Ok(Self {
            readings,
            stats: LoadStats {
                source: "<memory>".to_string(),
                rows_read,
                rows_kept,
                rows_dropped: rows_read - rows_kept,
                derived_hours,
                columns_found: col_map.summary(),
            },
        })
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn into_readings(self) -> Vec<Reading> {
        self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Copy of the readings stably sorted by operating hours (missing last).
    pub fn sorted_by_hours(&self) -> Vec<Reading> {
        let mut sorted = self.readings.clone();
        sorted.sort_by(|a, b| match (a.hours(), b.hours()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        sorted
    }

    /// Distinct component identifiers in first-appearance order.
    pub fn components(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for c in self.readings.iter().filter_map(|r| r.component_type.as_deref()) {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        seen
    }

    /// Smallest and largest operating-hour values.
    pub fn hours_range(&self) -> Option<(f64, f64)> {
        self.readings
            .iter()
            .filter_map(Reading::hours)
            .fold(None, |acc, h| match acc {
                None => Some((h, h)),
                Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
            })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Cell text of the first worksheet, blank rows skipped.
fn workbook_records(bytes: &[u8]) -> Result<Vec<Vec<String>>, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Format(format!("unreadable workbook ({e})")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Format("workbook has no worksheets".to_string()))?
        .map_err(|e| LoadError::Format(format!("unreadable worksheet ({e})")))?;

    Ok(range
        .rows()
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| cells.iter().map(cell_text).collect())
        .collect())
}

/// Render a workbook cell the way the CSV path would see it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_row(row: usize, owned: &[String], col_map: &ColumnMap, config: &LoadConfig) -> Reading {
    let fields: Vec<&str> = owned.iter().map(String::as_str).collect();
    let round = |v: f64| round_to(v, config.round_decimals);

    let component_type = col_map
        .component
        .and_then(|i| fields.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
        .map(str::to_string);

    let timestamp = col_map
        .timestamp
        .and_then(|i| fields.get(i))
        .and_then(|s| parse_datetime_string(s).ok());

    Reading {
        row,
        operating_hours: get_f64(&fields, col_map.hours).map(round),
        temperature: get_f64(&fields, col_map.temperature).map(round),
        vibration: get_f64(&fields, col_map.vibration).map(round),
        pressure: get_f64(&fields, col_map.pressure)
            .map(|v| v * col_map.pressure_scale)
            .map(round),
        component_type,
        timestamp,
    }
}

/// Fill operating hours as elapsed time since the earliest timestamp.
fn derive_hours(readings: &mut [Reading], decimals: Option<u32>) {
    let Some(origin) = readings.iter().filter_map(|r| r.timestamp).min() else {
        return;
    };
    for reading in readings.iter_mut() {
        reading.operating_hours = reading.timestamp.map(|ts| {
            #[allow(clippy::cast_precision_loss)]
            let hours = (ts - origin).num_milliseconds() as f64 / 3_600_000.0;
            round_to(hours, decimals)
        });
    }
}

fn round_to(value: f64, decimals: Option<u32>) -> f64 {
    match decimals {
        Some(d) => {
            let factor = 10_f64.powi(i32::try_from(d).unwrap_or(i32::MAX));
            let rounded = (value * factor).round() / factor;
            if rounded.is_finite() {
                rounded
            } else {
                value
            }
        }
        None => value,
    }
}

/// Parse the datetime formats commonly found in sensor exports
fn parse_datetime_string(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim().trim_matches('"');

    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Err("Empty timestamp".to_string());
    }

    // Unix epoch (seconds, or milliseconds when very large)
    if let Ok(epoch) = s.parse::<i64>() {
        let secs = if epoch > 10_000_000_000 { epoch / 1000 } else { epoch };
        return chrono::DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| format!("Epoch out of range: '{s}'"));
    }

    // ISO 8601 with timezone
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.naive_utc());
    }

    for fmt in &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    if let Some(dt) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt);
    }

    Err(format!("Cannot parse timestamp: '{s}'"))
}

/// Get an f64 field from a CSV row by optional column index.
/// Empty, `NaN`, `null`, `-`, non-finite and unparsable cells are missing.
fn get_f64(fields: &[&str], idx: Option<usize>) -> Option<f64> {
    let s = fields.get(idx?)?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") || s == "-" {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
