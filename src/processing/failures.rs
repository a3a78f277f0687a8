//! First-breach failure detection

use crate::types::{breach_limits, FailureEvent, FailureReport, Quantity, Reading};

/// Whether `value` crosses the absolute safety limit of `quantity`.
pub fn is_breach(quantity: Quantity, value: f64) -> bool {
    match quantity {
        Quantity::Temperature => value >= breach_limits::TEMPERATURE_MAX,
        Quantity::Vibration => value >= breach_limits::VIBRATION_MAX,
        Quantity::Pressure => value <= breach_limits::PRESSURE_MIN,
    }
}

/// Scan `readings` in order and record the first breach of each quantity.
///
/// Missing values are skipped for that quantity only.
pub fn detect_failures(readings: &[Reading]) -> FailureReport {
    let mut report = FailureReport::default();
    for quantity in Quantity::ALL {
        let first = readings.iter().enumerate().find_map(|(reading_index, r)| {
            r.value(quantity)
                .filter(|&v| is_breach(quantity, v))
                .map(|value| FailureEvent {
                    quantity,
                    reading_index,
                    value,
                })
        });
        if let Some(event) = first {
            report.set(event);
        }
    }
    report
}
