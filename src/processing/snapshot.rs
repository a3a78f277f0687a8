//! Snapshot selection: the reading that represents the current state

use serde::Serialize;

use super::AnalysisError;
use crate::types::{Reading, Target};

/// A selected reading and its position in the input sequence
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Snapshot<'a> {
    pub index: usize,
    pub reading: &'a Reading,
}

/// Pick the complete reading that best matches `target`.
///
/// `Latest` returns the last complete reading in table order. `Hours(t)`
/// returns the complete reading whose operating hours are nearest to `t`,
/// preferring the earliest row on ties. A NaN target behaves like `Latest`;
/// infinite targets are clamped to the observed hour range.
pub fn select(readings: &[Reading], target: Target) -> Result<Snapshot<'_>, AnalysisError> {
    let candidates = readings
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_complete())
        .filter_map(|(i, r)| r.hours().map(|h| (i, r, h)));

    let target_hours = match target {
        Target::Hours(t) if !t.is_nan() => t,
        _ => {
            return candidates
                .last()
                .map(|(index, reading, _)| Snapshot { index, reading })
                .ok_or_else(|| AnalysisError::empty(None));
        }
    };

    let collected: Vec<_> = candidates.collect();
    if collected.is_empty() {
        return Err(AnalysisError::empty(None));
    }
    let (min_h, max_h) = collected
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, _, h)| (lo.min(h), hi.max(h)));
    let t = target_hours.clamp(min_h, max_h);

    let mut best: Option<(usize, &Reading, f64)> = None;
    for (i, r, h) in collected {
        let distance = (h - t).abs();
        // Strict comparison keeps the earliest row on ties
        if best.map_or(true, |(_, _, d)| distance < d) {
            best = Some((i, r, distance));
        }
    }

    best.map(|(index, reading, _)| Snapshot { index, reading })
        .ok_or_else(|| AnalysisError::empty(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Vec<Reading> {
        vec![
            Reading::new(0, 10.0, 60.0, 0.2, 310.0),
            Reading::new(1, 20.0, 75.0, 0.5, 300.0),
            Reading::new(2, 30.0, 125.0, 2.1, 220.0),
        ]
    }

    #[test]
    fn test_nearest_hour() {
        let readings = scenario();
        let snap = select(&readings, Target::Hours(22.0)).unwrap();
        assert_eq!(snap.index, 1);
        assert_eq!(snap.reading.operating_hours, Some(20.0));
    }

    #[test]
    fn test_latest_is_last_complete_row() {
        let mut readings = scenario();
        readings[2].temperature = None;
        let snap = select(&readings, Target::Latest).unwrap();
        assert_eq!(snap.index, 1);
    }

    #[test]
    fn test_tie_prefers_earliest_row() {
        let readings = scenario();
        let snap = select(&readings, Target::Hours(15.0)).unwrap();
        assert_eq!(snap.index, 0);
    }

    #[test]
    fn test_unsorted_hours() {
        let readings = vec![
            Reading::new(0, 50.0, 60.0, 0.2, 310.0),
            Reading::new(1, 5.0, 60.0, 0.2, 310.0),
            Reading::new(2, 30.0, 60.0, 0.2, 310.0),
        ];
        assert_eq!(select(&readings, Target::Hours(4.0)).unwrap().index, 1);
        assert_eq!(select(&readings, Target::Latest).unwrap().index, 2);
    }

    #[test]
    fn test_non_finite_targets() {
        let readings = scenario();
        assert_eq!(select(&readings, Target::Hours(f64::NAN)).unwrap().index, 2);
        assert_eq!(select(&readings, Target::Hours(f64::INFINITY)).unwrap().index, 2);
        assert_eq!(select(&readings, Target::Hours(f64::NEG_INFINITY)).unwrap().index, 0);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(
            select(&[], Target::Latest),
            Err(AnalysisError::EmptyInput { .. })
        ));
        let mut r = Reading::new(0, 1.0, 60.0, 0.2, 310.0);
        r.pressure = None;
        assert!(select(&[r], Target::Hours(1.0)).is_err());
    }

    #[test]
    fn test_result_is_member_of_input() {
        let readings = scenario();
        for t in [0.0, 12.0, 25.0, 29.0, 1e9] {
            let snap = select(&readings, Target::Hours(t)).unwrap();
            assert!(std::ptr::eq(snap.reading, &readings[snap.index]));
        }
    }
}
