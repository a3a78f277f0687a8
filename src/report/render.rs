//! Text dashboard and JSON rendering

use serde::Serialize;
use std::fmt::Write;

use super::gauge::{gauge_for, render_bar, zone_at};
use super::overview::SeriesOverview;
use crate::config::defaults::GAUGE_BAR_WIDTH;
use crate::types::{HealthSummary, Quantity};

/// Full dashboard: trend overview followed by one block per summary.
pub fn render_text(summaries: &[HealthSummary], overview: &SeriesOverview) -> String {
    let mut out = String::new();
    out.push_str("=== Equipment Health Report ===\n");
    match overview.hours_range {
        Some((lo, hi)) => {
            let _ = writeln!(out, "Readings: {} (operating hours {lo:.1} - {hi:.1})", overview.readings);
        }
        None => {
            let _ = writeln!(out, "Readings: {}", overview.readings);
        }
    }

    out.push_str("\n--- Sensor Performance ---\n");
    for trend in &overview.trends {
        let q = trend.quantity;
        let _ = write!(out, "{:<12}", q.to_string());
        match (trend.first, trend.last, trend.min, trend.max) {
            (Some(first), Some(last), Some(min), Some(max)) => {
                let _ = write!(
                    out,
                    "trend {first:.2} -> {last:.2} {} (range {min:.2}-{max:.2}, {} pts)",
                    q.unit(),
                    trend.points
                );
            }
            _ => out.push_str("no data"),
        }
        if let Some(marker) = overview.failure(q) {
            let at = marker
                .operating_hours
                .map_or_else(|| format!("row {}", marker.reading_index), |h| format!("{h:.1} h"));
            let _ = write!(out, "  FAILURE at {at}: {:.3} {}", marker.value, q.unit());
        }
        out.push('\n');
    }

    for summary in summaries {
        out.push('\n');
        out.push_str(&render_summary(summary));
    }
    out
}

/// Gauges and health ratings of a single summary.
pub fn render_summary(summary: &HealthSummary) -> String {
    let mut out = String::new();
    let r = &summary.reading;
    let _ = writeln!(out, "=== {} ===", summary.component_name());
    let hours = r.hours().map_or_else(|| "?".to_string(), |h| format!("{h:.1}"));
    let _ = writeln!(
        out,
        "Selected reading: {hours} h (row {}, {} of {} readings)",
        r.row,
        summary.selected_index + 1,
        summary.readings_considered
    );
    if let Some(ts) = r.timestamp {
        let _ = writeln!(out, "Timestamp: {}", ts.format("%Y-%m-%d %H:%M:%S"));
    }

    out.push_str("\nLive Performance Gauges\n");
    for q in Quantity::ALL {
        let spec = gauge_for(q);
        let value = r.value(q).unwrap_or(f64::NAN);
        let zone = zone_at(spec, value).map_or("-", |z| z.color);
        let _ = writeln!(
            out,
            "  {:<12}{:>9.3} {:<3} {} {}",
            q.to_string(),
            value,
            q.unit(),
            render_bar(spec, value, GAUGE_BAR_WIDTH),
            zone
        );
    }

    out.push_str("\nComponent Health Ratings\n");
    for q in Quantity::ALL {
        let rating = summary.rating(q);
        let _ = writeln!(
            out,
            "  {:<12}{:>3}/100  {:<8} ({})",
            q.to_string(),
            rating.score,
            rating.label,
            rating.severity.color()
        );
    }
    let _ = writeln!(out, "  Overall: {}", summary.overall.label().to_uppercase());

    if summary.failures.is_empty() {
        out.push_str("\nNo failure thresholds crossed\n");
    } else {
        out.push_str("\nFailures\n");
        for event in summary.failures.events() {
            let _ = writeln!(
                out,
                "  {} first breached at reading {}: {:.3} {}",
                event.quantity,
                event.reading_index,
                event.value,
                event.quantity.unit()
            );
        }
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    overview: &'a SeriesOverview,
    summaries: &'a [HealthSummary],
}

/// Pretty-printed JSON of the overview and summaries.
pub fn render_json(summaries: &[HealthSummary], overview: &SeriesOverview) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport { overview, summaries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrendConfig;
    use crate::processing::summarize;
    use crate::types::{Reading, Target};

    fn scenario() -> Vec<Reading> {
        vec![
            Reading::new(0, 10.0, 60.0, 0.2, 310.0),
            Reading::new(1, 20.0, 75.0, 0.5, 300.0),
            Reading::new(2, 30.0, 125.0, 2.1, 220.0),
        ]
    }

    #[test]
    fn test_text_report_sections() {
        let readings = scenario();
        let summary = summarize(&readings, Target::Latest).unwrap();
        let overview = SeriesOverview::compute(&readings, &TrendConfig::default());
        let text = render_text(&[summary], &overview);

        assert!(text.contains("Equipment Health Report"));
        assert!(text.contains("operating hours 10.0 - 30.0"));
        assert!(text.contains("FAILURE at 30.0 h: 125.000"));
        assert!(text.contains("=== all readings ==="));
        assert!(text.contains("Overall: CRITICAL"));
        assert!(text.contains("(black)"));
    }

    #[test]
    fn test_summary_at_selected_hour() {
        let summary = summarize(&scenario(), Target::Hours(22.0)).unwrap();
        let text = render_summary(&summary);
        assert!(text.contains("Selected reading: 20.0 h (row 1, 2 of 3 readings)"));
        assert!(text.contains(" 75/100  fair"));
        assert!(text.contains("Overall: FAIR"));
    }

    #[test]
    fn test_json_report() {
        let readings = scenario();
        let summary = summarize(&readings, Target::Latest).unwrap();
        let overview = SeriesOverview::compute(&readings, &TrendConfig::default());
        let json = render_json(&[summary], &overview).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summaries"][0]["temperature"]["label"], "critical");
        assert_eq!(value["summaries"][0]["overall"], "critical");
        assert_eq!(value["summaries"][0]["failures"]["pressure"]["reading_index"], 2);
        assert_eq!(value["overview"]["failures"].as_array().map(Vec::len), Some(3));
    }
}
