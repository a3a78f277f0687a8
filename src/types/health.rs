//! Pipeline outputs: ratings, failure events and health summaries

use serde::Serialize;

use super::{Quantity, Reading, Severity};

/// Result of classifying one value against a threshold table
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HealthRating {
    /// Health score, 0-100
    pub score: u8,
    pub label: &'static str,
    pub severity: Severity,
}

impl HealthRating {
    /// Rating used when no band admits the value.
    pub const fn fallback() -> Self {
        Self {
            score: 0,
            label: Severity::Critical.label(),
            severity: Severity::Critical,
        }
    }
}

/// First reading whose value crossed an absolute safety limit
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FailureEvent {
    pub quantity: Quantity,
    /// Position within the sequence handed to the detector
    pub reading_index: usize,
    pub value: f64,
}

/// At most one failure event per quantity
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct FailureReport {
    pub temperature: Option<FailureEvent>,
    pub vibration: Option<FailureEvent>,
    pub pressure: Option<FailureEvent>,
}

impl FailureReport {
    pub const fn get(&self, quantity: Quantity) -> Option<&FailureEvent> {
        match quantity {
            Quantity::Temperature => self.temperature.as_ref(),
            Quantity::Vibration => self.vibration.as_ref(),
            Quantity::Pressure => self.pressure.as_ref(),
        }
    }

    pub(crate) fn set(&mut self, event: FailureEvent) {
        let slot = match event.quantity {
            Quantity::Temperature => &mut self.temperature,
            Quantity::Vibration => &mut self.vibration,
            Quantity::Pressure => &mut self.pressure,
        };
        *slot = Some(event);
    }

    /// Events in quantity order.
    pub fn events(&self) -> impl Iterator<Item = &FailureEvent> {
        Quantity::ALL.into_iter().filter_map(|q| self.get(q))
    }

    pub const fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.vibration.is_none() && self.pressure.is_none()
    }
}

/// Health picture of one component (or of the whole table)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthSummary {
    /// `None` for the whole table or rows without a component
    pub component: Option<String>,
    /// Index of the selected reading within the partition
    pub selected_index: usize,
    pub reading: Reading,
    pub temperature: HealthRating,
    pub vibration: HealthRating,
    pub pressure: HealthRating,
    pub failures: FailureReport,
    /// Worst severity of the three ratings
    pub overall: Severity,
    /// Number of readings in the partition
    pub readings_considered: usize,
}

impl HealthSummary {
    pub const fn rating(&self, quantity: Quantity) -> &HealthRating {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Vibration => &self.vibration,
            Quantity::Pressure => &self.pressure,
        }
    }

    /// Display name of the partition.
    pub fn component_name(&self) -> &str {
        self.component.as_deref().unwrap_or("all readings")
    }
}
