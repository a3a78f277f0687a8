//! Gauge ranges, zones and severity colors

use serde::Serialize;

use crate::types::{table_for, Direction, Quantity, Severity};

impl Severity {
    /// Display color of a health band.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Good => "green",
            Self::Fair => "yellow",
            Self::Poor => "orange",
            Self::Alarm => "red",
            Self::Critical => "black",
        }
    }
}

/// Colored span of a gauge dial
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GaugeZone {
    pub from: f64,
    pub to: f64,
    pub color: &'static str,
}

const fn zone(from: f64, to: f64, color: &'static str) -> GaugeZone {
    GaugeZone { from, to, color }
}

/// Display range and zones of a quantity's gauge
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GaugeSpec {
    pub quantity: Quantity,
    pub min: f64,
    pub max: f64,
    pub zones: &'static [GaugeZone],
}

static TEMPERATURE_GAUGE: GaugeSpec = GaugeSpec {
    quantity: Quantity::Temperature,
    min: 0.0,
    max: 150.0,
    zones: &[
        zone(0.0, 70.0, "green"),
        zone(70.0, 80.0, "yellow"),
        zone(80.0, 100.0, "orange"),
        zone(100.0, 120.0, "red"),
        zone(120.0, 150.0, "black"),
    ],
};

static VIBRATION_GAUGE: GaugeSpec = GaugeSpec {
    quantity: Quantity::Vibration,
    min: 0.0,
    max: 2.5,
    zones: &[
        zone(0.0, 0.4, "green"),
        zone(0.4, 1.0, "yellow"),
        zone(1.0, 1.5, "orange"),
        zone(1.5, 2.0, "red"),
        zone(2.0, 2.5, "black"),
    ],
};

// Low pressure is the failure side, so the dial runs black to green.
static PRESSURE_GAUGE: GaugeSpec = GaugeSpec {
    quantity: Quantity::Pressure,
    min: 0.0,
    max: 400.0,
    zones: &[
        zone(0.0, 230.0, "black"),
        zone(230.0, 260.0, "red"),
        zone(260.0, 290.0, "orange"),
        zone(290.0, 320.0, "yellow"),
        zone(320.0, 400.0, "green"),
    ],
};

pub fn gauge_for(quantity: Quantity) -> &'static GaugeSpec {
    match quantity {
        Quantity::Temperature => &TEMPERATURE_GAUGE,
        Quantity::Vibration => &VIBRATION_GAUGE,
        Quantity::Pressure => &PRESSURE_GAUGE,
    }
}

/// Zone containing `value`; values off the dial map to the nearest end zone.
///
/// Zone edges belong to the healthier side, matching the band tables.
pub fn zone_at(spec: &GaugeSpec, value: f64) -> Option<&'static GaugeZone> {
    if value.is_nan() {
        return None;
    }
    let v = value.clamp(spec.min, spec.max);
    let upper_inclusive = table_for(spec.quantity).direction == Direction::Ascending;
    spec.zones
        .iter()
        .find(|z| {
            if upper_inclusive {
                v > z.from && v <= z.to
            } else {
                v >= z.from && v < z.to
            }
        })
        .or_else(|| {
            if v <= spec.min {
                spec.zones.first()
            } else {
                spec.zones.last()
            }
        })
}

/// Fixed-width text bar with a needle at `value`, e.g. `[======|-------]`.
pub fn render_bar(spec: &GaugeSpec, value: f64, width: usize) -> String {
    let width = width.max(2);
    if value.is_nan() {
        return format!("[{}]", "?".repeat(width));
    }
    let span = spec.max - spec.min;
    let fraction = ((value - spec.min) / span).clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let needle = ((fraction * (width - 1) as f64).round() as usize).min(width - 1);

    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for i in 0..width {
        bar.push(match i.cmp(&needle) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => '|',
            std::cmp::Ordering::Greater => '-',
        });
    }
    bar.push(']');
    bar
}
