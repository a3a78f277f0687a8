//! Threshold tables, severity levels and absolute breach limits

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::Quantity;

/// Absolute safety limits used by the failure detector
pub mod breach_limits {
    /// Temperature at or above this is a failure (°C)
    pub const TEMPERATURE_MAX: f64 = 120.0;
    /// Vibration at or above this is a failure (g)
    pub const VIBRATION_MAX: f64 = 2.0;
    /// Pressure at or below this is a failure (psi)
    pub const PRESSURE_MIN: f64 = 230.0;
}

// ============================================================================
// Severity
// ============================================================================

/// Severity of a health band. Ordered from best to worst.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Good,
    Fair,
    Poor,
    Alarm,
    Critical,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Alarm => "alarm",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Threshold Tables
// ============================================================================

/// Which side of a band bound counts as "inside" the band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Higher is worse: a band admits values at or below its bound
    Ascending,
    /// Lower is worse: a band admits values at or above its bound
    Descending,
}

impl Direction {
    /// Whether a band with `bound` admits `value`.
    pub fn admits(self, bound: f64, value: f64) -> bool {
        match self {
            Self::Ascending => bound >= value,
            Self::Descending => bound <= value,
        }
    }
}

/// One (bound, score, label) entry of a threshold table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ThresholdBand {
    pub bound: f64,
    /// Health score, 0-100
    pub score: u8,
    pub label: &'static str,
    pub severity: Severity,
}

impl ThresholdBand {
    pub const fn new(bound: f64, score: u8, severity: Severity) -> Self {
        Self {
            bound,
            score,
            label: severity.label(),
            severity,
        }
    }
}

/// Errors raised when building a custom threshold table
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("threshold table for {0} has no bands")]
    Empty(Quantity),
    #[error("band {index} of the {quantity} table has a non-finite bound")]
    NonFiniteBound { quantity: Quantity, index: usize },
    #[error("band {index} of the {quantity} table has score {score} (must be 0-100)")]
    ScoreOutOfRange { quantity: Quantity, index: usize, score: u8 },
    #[error("band {index} of the {quantity} table breaks the {direction:?} bound order")]
    NotMonotonic {
        quantity: Quantity,
        index: usize,
        direction: Direction,
    },
}

/// Ordered band list for a quantity. First admitting band wins.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThresholdTable {
    pub quantity: Quantity,
    pub direction: Direction,
    pub bands: Cow<'static, [ThresholdBand]>,
}

impl ThresholdTable {
    /// Build a table, rejecting bound orders that would leave bands unreachable.
    pub fn new(
        quantity: Quantity,
        direction: Direction,
        bands: Vec<ThresholdBand>,
    ) -> Result<Self, ThresholdError> {
        if bands.is_empty() {
            return Err(ThresholdError::Empty(quantity));
        }
        for (index, band) in bands.iter().enumerate() {
            if !band.bound.is_finite() {
                return Err(ThresholdError::NonFiniteBound { quantity, index });
            }
            if band.score > 100 {
                return Err(ThresholdError::ScoreOutOfRange {
                    quantity,
                    index,
                    score: band.score,
                });
            }
        }
        for (index, pair) in bands.windows(2).enumerate() {
            let ordered = match direction {
                Direction::Ascending => pair[0].bound < pair[1].bound,
                Direction::Descending => pair[0].bound > pair[1].bound,
            };
            if !ordered {
                return Err(ThresholdError::NotMonotonic {
                    quantity,
                    index: index + 1,
                    direction,
                });
            }
        }
        Ok(Self {
            quantity,
            direction,
            bands: Cow::Owned(bands),
        })
    }
}

/// Temperature (°C): higher is worse.
pub static TEMPERATURE_TABLE: ThresholdTable = ThresholdTable {
    quantity: Quantity::Temperature,
    direction: Direction::Ascending,
    bands: Cow::Borrowed(&[
        ThresholdBand::new(70.0, 100, Severity::Good),
        ThresholdBand::new(80.0, 75, Severity::Fair),
        ThresholdBand::new(100.0, 45, Severity::Poor),
        ThresholdBand::new(120.0, 15, Severity::Alarm),
    ]),
};

/// Vibration (g): higher is worse.
pub static VIBRATION_TABLE: ThresholdTable = ThresholdTable {
    quantity: Quantity::Vibration,
    direction: Direction::Ascending,
    bands: Cow::Borrowed(&[
        ThresholdBand::new(0.4, 100, Severity::Good),
        ThresholdBand::new(1.0, 75, Severity::Fair),
        ThresholdBand::new(1.5, 45, Severity::Poor),
        ThresholdBand::new(2.0, 15, Severity::Alarm),
    ]),
};

/// Pressure (psi): lower is worse.
pub static PRESSURE_TABLE: ThresholdTable = ThresholdTable {
    quantity: Quantity::Pressure,
    direction: Direction::Descending,
    bands: Cow::Borrowed(&[
        ThresholdBand::new(320.0, 100, Severity::Good),
        ThresholdBand::new(290.0, 75, Severity::Fair),
        ThresholdBand::new(260.0, 45, Severity::Poor),
        ThresholdBand::new(230.0, 15, Severity::Alarm),
    ]),
};

/// Built-in table for `quantity`.
pub fn table_for(quantity: Quantity) -> &'static ThresholdTable {
    match quantity {
        Quantity::Temperature => &TEMPERATURE_TABLE,
        Quantity::Vibration => &VIBRATION_TABLE,
        Quantity::Pressure => &PRESSURE_TABLE,
    }
}
