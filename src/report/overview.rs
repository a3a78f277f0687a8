//! Whole-table trend overview: smoothed series and failure markers

use serde::Serialize;

use crate::config::TrendConfig;
use crate::processing::{detect_failures, lowess};
use crate::types::{Quantity, Reading};

/// One reading on the trend chart: the raw value and the smoothed curve at its hour
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TrendPoint {
    /// Index into the analyzed readings
    pub reading_index: usize,
    pub operating_hours: f64,
    pub value: f64,
    pub smoothed: f64,
}

/// One quantity's smoothed trend
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendSummary {
    pub quantity: Quantity,
    /// Points entering the smoother (finite hours and value)
    pub points: usize,
    /// Smoothed value at the lowest operating hour
    pub first: Option<f64>,
    /// Smoothed value at the highest operating hour
    pub last: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Chart series ordered by operating hours
    pub series: Vec<TrendPoint>,
}

/// First breach of a quantity, located on the hours axis
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FailureMarker {
    pub quantity: Quantity,
    pub reading_index: usize,
    pub operating_hours: Option<f64>,
    pub value: f64,
}

/// Trend and failure view of the full table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesOverview {
    pub readings: usize,
    pub hours_range: Option<(f64, f64)>,
    pub trends: Vec<TrendSummary>,
    pub failures: Vec<FailureMarker>,
}

impl SeriesOverview {
    pub fn compute(readings: &[Reading], trend: &TrendConfig) -> Self {
        let hours_range = readings
            .iter()
            .filter_map(Reading::hours)
            .fold(None, |acc: Option<(f64, f64)>, h| {
                Some(acc.map_or((h, h), |(lo, hi)| (lo.min(h), hi.max(h))))
            });

        let trends = Quantity::ALL
            .into_iter()
            .map(|quantity| summarize_trend(readings, quantity, trend))
            .collect();

        let report = detect_failures(readings);
        let failures = report
            .events()
            .map(|e| FailureMarker {
                quantity: e.quantity,
                reading_index: e.reading_index,
                operating_hours: readings.get(e.reading_index).and_then(Reading::hours),
                value: e.value,
            })
            .collect();

        Self {
            readings: readings.len(),
            hours_range,
            trends,
            failures,
        }
    }

    pub fn trend(&self, quantity: Quantity) -> Option<&TrendSummary> {
        self.trends.iter().find(|t| t.quantity == quantity)
    }

    pub fn failure(&self, quantity: Quantity) -> Option<&FailureMarker> {
        self.failures.iter().find(|f| f.quantity == quantity)
    }
}

fn summarize_trend(readings: &[Reading], quantity: Quantity, trend: &TrendConfig) -> TrendSummary {
    let mut raw: Vec<(usize, f64, f64)> = readings
        .iter()
        .enumerate()
        .filter_map(|(i, r)| Some((i, r.hours()?, r.value(quantity)?)))
        .collect();
    let (xs, ys): (Vec<f64>, Vec<f64>) = raw.iter().map(|&(_, x, y)| (x, y)).unzip();
    let curve = lowess(&xs, &ys, trend);

    // Same stable order the smoother uses, so raw and smoothed points pair up
    raw.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut summary = TrendSummary {
        quantity,
        points: curve.len(),
        first: None,
        last: None,
        min: None,
        max: None,
        series: Vec::with_capacity(curve.len()),
    };
    for ((reading_index, hours, value), (_, y)) in raw.into_iter().zip(curve) {
        summary.first.get_or_insert(y);
        summary.last = Some(y);
        summary.min = Some(summary.min.map_or(y, |m| m.min(y)));
        summary.max = Some(summary.max.map_or(y, |m| m.max(y)));
        summary.series.push(TrendPoint {
            reading_index,
            operating_hours: hours,
            value,
            smoothed: y,
        });
    }
    summary
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
    fn test_overview_markers() {
        let overview = SeriesOverview::compute(&scenario(), &TrendConfig::default());
        assert_eq!(overview.readings, 3);
        assert_eq!(overview.hours_range, Some((10.0, 30.0)));
        assert_eq!(overview.failures.len(), 3);
        let t = overview.failure(Quantity::Temperature).unwrap();
        assert_eq!(t.operating_hours, Some(30.0));
        assert_eq!(t.value, 125.0);
    }

    #[test]
    fn test_trend_summary_bounds() {
        let readings: Vec<Reading> = (0..100)
            .map(|i| {
                let h = f64::from(i);
                Reading::new(i as usize, h, 60.0 + 0.5 * h, 0.2, 310.0)
            })
            .collect();
        let overview = SeriesOverview::compute(&readings, &TrendConfig { frac: 0.2, iterations: 2 });
        let t = overview.trend(Quantity::Temperature).unwrap();
        assert_eq!(t.points, 100);
        assert!((t.first.unwrap() - 60.0).abs() < 1e-6);
        assert!((t.last.unwrap() - 109.5).abs() < 1e-6);
        assert!(t.min <= t.first && t.max >= t.last);
        assert!(overview.failures.is_empty());
    }

    #[test]
    fn test_missing_values_excluded_from_trend() {
        let mut readings = scenario();
        readings[1].vibration = None;
        let overview = SeriesOverview::compute(&readings, &TrendConfig::default());
        assert_eq!(overview.trend(Quantity::Vibration).unwrap().points, 2);
        assert_eq!(overview.trend(Quantity::Temperature).unwrap().points, 3);
    }

    #[test]
    fn test_series_pairs_raw_and_smoothed() {
        // Out of hour order on purpose
        let readings = vec![
            Reading::new(0, 30.0, 125.0, 2.1, 220.0),
            Reading::new(1, 10.0, 60.0, 0.2, 310.0),
            Reading::new(2, 20.0, 75.0, 0.5, 300.0),
        ];
        let overview = SeriesOverview::compute(&readings, &TrendConfig { frac: 1.0, iterations: 0 });
        let t = overview.trend(Quantity::Temperature).unwrap();

        assert_eq!(t.series.len(), t.points);
        let hours: Vec<f64> = t.series.iter().map(|p| p.operating_hours).collect();
        assert_eq!(hours, vec![10.0, 20.0, 30.0]);
        let rows: Vec<usize> = t.series.iter().map(|p| p.reading_index).collect();
        assert_eq!(rows, vec![1, 2, 0]);
        let raw: Vec<f64> = t.series.iter().map(|p| p.value).collect();
        assert_eq!(raw, vec![60.0, 75.0, 125.0]);
        assert_eq!(t.series.first().map(|p| p.smoothed), t.first);
        assert_eq!(t.series.last().map(|p| p.smoothed), t.last);
    }

    #[test]
    fn test_empty_table() {
        let overview = SeriesOverview::compute(&[], &TrendConfig::default());
        assert_eq!(overview.hours_range, None);
        assert!(overview
            .trends
            .iter()
            .all(|t| t.points == 0 && t.first.is_none() && t.series.is_empty()));
    }
}
