//! Band classification of a single value

use crate::types::{table_for, HealthRating, Quantity, ThresholdTable};

/// Map `value` onto the first band of `table` that admits it.
///
/// Total: NaN and values beyond the last band resolve to the critical
/// fallback (score 0).
pub fn classify(value: f64, table: &ThresholdTable) -> HealthRating {
    if value.is_nan() {
        return HealthRating::fallback();
    }
    table
        .bands
        .iter()
        .find(|band| table.direction.admits(band.bound, value))
        .map_or_else(HealthRating::fallback, |band| HealthRating {
            score: band.score.min(100),
            label: band.label,
            severity: band.severity,
        })
}

/// Classify against the built-in table for `quantity`.
pub fn rate(quantity: Quantity, value: f64) -> HealthRating {
    classify(value, table_for(quantity))
}
