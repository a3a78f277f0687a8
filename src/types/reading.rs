//! Sensor reading types: Quantity, Reading, Target

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Measured Quantities
// ============================================================================

/// A physical quantity measured on every reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantity {
    Temperature,
    Vibration,
    Pressure,
}

impl Quantity {
    /// All quantities in presentation order.
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Vibration, Self::Pressure];

    /// Display unit.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Vibration => "g",
            Self::Pressure => "psi",
        }
    }

    /// Canonical column name in input tables.
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Vibration => "Vibration",
            Self::Pressure => "Pressure",
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

// ============================================================================
// Reading
// ============================================================================

/// One row of the source table.
///
/// Numeric fields are `None` when the cell was missing or not numeric. The
/// loader may drop such rows up front; the pipeline stages still tolerate them
/// (the failure detector skips the missing quantity, the snapshot selector
/// skips the whole row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// 0-based data-row position in the source table
    pub row: usize,
    /// Operating hours, the ordering key
    pub operating_hours: Option<f64>,
    /// Temperature (°C)
    pub temperature: Option<f64>,
    /// Vibration (g)
    pub vibration: Option<f64>,
    /// Pressure (psi)
    pub pressure: Option<f64>,
    /// Component identifier partitioning the table into independent series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    /// Acquisition timestamp, when the table has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl Reading {
    /// Build a fully populated reading.
    pub const fn new(row: usize, operating_hours: f64, temperature: f64, vibration: f64, pressure: f64) -> Self {
        Self {
            row,
            operating_hours: Some(operating_hours),
            temperature: Some(temperature),
            vibration: Some(vibration),
            pressure: Some(pressure),
            component_type: None,
            timestamp: None,
        }
    }

    /// Attach a component identifier.
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component_type = Some(component.into());
        self
    }

    /// Value of `quantity`, or `None` if missing or NaN.
    pub fn value(&self, quantity: Quantity) -> Option<f64> {
        let raw = match quantity {
            Quantity::Temperature => self.temperature,
            Quantity::Vibration => self.vibration,
            Quantity::Pressure => self.pressure,
        };
        raw.filter(|v| !v.is_nan())
    }

    /// Operating hours, or `None` if missing or not finite.
    pub fn hours(&self) -> Option<f64> {
        self.operating_hours.filter(|h| h.is_finite())
    }

    /// True when operating hours and all three quantities are usable.
    pub fn is_complete(&self) -> bool {
        self.hours().is_some() && Quantity::ALL.iter().all(|&q| self.value(q).is_some())
    }
}

// ============================================================================
// Selection Target
// ============================================================================

/// Reference point used to pick the snapshot row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Target {
    /// Last complete reading in table order
    #[default]
    Latest,
    /// Reading nearest to this operating-hour value
    Hours(f64),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") || s.eq_ignore_ascii_case("last") {
            return Ok(Self::Latest);
        }
        s.parse::<f64>()
            .map(Self::Hours)
            .map_err(|_| format!("expected an operating-hour value or 'latest', got '{s}'"))
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Hours(h) => write!(f, "{h} h"),
        }
    }
}
