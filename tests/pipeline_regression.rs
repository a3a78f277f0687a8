//! Pipeline Regression Tests
//!
//! Runs the full analysis pipeline (selection, classification, failure
//! detection, aggregation) on small hand-checked tables and asserts on the
//! exact ratings, indices and error messages a dashboard would show.

use equipment_health::processing::{summarize, summarize_by_component};
use equipment_health::report::{render_json, render_text, SeriesOverview};
use equipment_health::{
    classify, detect_failures, select, AnalysisError, Quantity, Reading, Severity, Target,
    TrendConfig,
};

/// Three readings that end in a breach of every limit.
fn degrading_pump() -> Vec<Reading> {
    vec![
        Reading::new(0, 10.0, 60.0, 0.2, 310.0),
        Reading::new(1, 20.0, 75.0, 0.5, 300.0),
        Reading::new(2, 30.0, 125.0, 2.1, 220.0),
    ]
}

fn two_components() -> Vec<Reading> {
    vec![
        Reading::new(0, 10.0, 62.0, 0.25, 335.0).with_component("pump"),
        Reading::new(1, 10.0, 72.0, 0.50, 318.0).with_component("motor"),
        Reading::new(2, 20.0, 64.0, 0.27, 333.0).with_component("pump"),
        Reading::new(3, 20.0, 85.0, 0.90, 300.0).with_component("motor"),
        Reading::new(4, 30.0, 66.0, 0.30, 330.0).with_component("pump"),
        Reading::new(5, 30.0, 122.0, 1.80, 262.0).with_component("motor"),
    ]
}

// ============================================================================
// Degrading Pump Scenario
// ============================================================================

#[test]
fn failures_reported_at_first_breach() {
    let report = detect_failures(&degrading_pump());

    for quantity in Quantity::ALL {
        let event = report
            .get(quantity)
            .unwrap_or_else(|| panic!("{quantity} failure should be detected"));
        assert_eq!(event.reading_index, 2, "{quantity} breach is on the last reading");
    }
    assert_eq!(report.temperature.as_ref().map(|e| e.value), Some(125.0));
    assert_eq!(report.vibration.as_ref().map(|e| e.value), Some(2.1));
    assert_eq!(report.pressure.as_ref().map(|e| e.value), Some(220.0));
}

#[test]
fn breached_temperature_is_critical() {
    let rating = classify(125.0, equipment_health::types::table_for(Quantity::Temperature));
    assert_eq!(rating.score, 0);
    assert_eq!(rating.label, "critical");
    assert_eq!(rating.severity, Severity::Critical);
}

#[test]
fn nearest_hour_selection_prefers_closer_row() {
    let readings = degrading_pump();
    let snapshot = select(&readings, Target::Hours(22.0)).expect("table is not empty");
    assert_eq!(snapshot.index, 1, "20 h is 2 h away, 30 h is 8 h away");
    assert_eq!(snapshot.reading.operating_hours, Some(20.0));
}

#[test]
fn latest_summary_rates_every_quantity_critical() {
    let summary = summarize(&degrading_pump(), Target::Latest).expect("summary");

    assert_eq!(summary.selected_index, 2);
    assert_eq!(summary.overall, Severity::Critical);
    for quantity in Quantity::ALL {
        assert_eq!(summary.rating(quantity).score, 0, "{quantity} should score 0");
    }
    assert_eq!(summary.failures.events().count(), 3);
    assert_eq!(summary.readings_considered, 3);
}

#[test]
fn summary_at_hour_uses_selected_reading_but_whole_history_for_failures() {
    let summary = summarize(&degrading_pump(), Target::Hours(22.0)).expect("summary");

    // 75 °C, 0.5 g, 300 psi
    assert_eq!(summary.temperature.score, 75);
    assert_eq!(summary.vibration.score, 75);
    assert_eq!(summary.pressure.score, 75);
    assert_eq!(summary.overall, Severity::Fair);
    assert!(
        !summary.failures.is_empty(),
        "failures cover the whole table, not just the selected reading"
    );
}

#[test]
fn repeated_runs_are_identical() {
    let readings = degrading_pump();
    let first = summarize(&readings, Target::Hours(17.5)).expect("summary");
    for _ in 0..5 {
        assert_eq!(summarize(&readings, Target::Hours(17.5)).expect("summary"), first);
    }
}

// ============================================================================
// Empty Input
// ============================================================================

#[test]
fn empty_table_is_an_error() {
    let err = select(&[], Target::Latest).expect_err("empty table has no snapshot");
    assert!(matches!(err, AnalysisError::EmptyInput { .. }));

    let err = summarize(&[], Target::Hours(5.0)).expect_err("empty table has no summary");
    assert_eq!(err.to_string(), "No complete readings available for the table");
}

#[test]
fn table_of_incomplete_rows_is_an_error() {
    let mut row = Reading::new(0, 10.0, 60.0, 0.2, 310.0);
    row.pressure = None;
    assert!(summarize(&[row], Target::Latest).is_err());
}

// ============================================================================
// Per-Component Reports
// ============================================================================

#[test]
fn components_are_summarized_independently() {
    let summaries = summarize_by_component(&two_components(), Target::Latest).expect("summaries");

    let names: Vec<&str> = summaries.iter().map(|s| s.component_name()).collect();
    assert_eq!(names, vec!["pump", "motor"], "first-appearance order");

    let pump = &summaries[0];
    assert_eq!(pump.overall, Severity::Good);
    assert!(pump.failures.is_empty());

    let motor = &summaries[1];
    assert_eq!(motor.temperature.severity, Severity::Critical);
    let breach = motor.failures.temperature.as_ref().expect("motor overheated");
    assert_eq!(breach.reading_index, 2, "index within the motor partition");
    assert!(motor.failures.vibration.is_none());
    assert!(motor.failures.pressure.is_none());
}

#[test]
fn component_selection_at_hour() {
    let summaries =
        summarize_by_component(&two_components(), Target::Hours(22.0)).expect("summaries");
    let motor = &summaries[1];
    assert_eq!(motor.reading.operating_hours, Some(20.0));
    // 85 °C sits in the 80-100 band
    assert_eq!(motor.temperature.score, 45);
    assert_eq!(motor.overall, Severity::Poor);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn text_report_shows_failures_and_ratings() {
    let readings = degrading_pump();
    let summary = summarize(&readings, Target::Latest).expect("summary");
    let overview = SeriesOverview::compute(&readings, &TrendConfig::default());
    let text = render_text(&[summary], &overview);

    assert!(text.contains("=== Equipment Health Report ==="));
    assert!(text.contains("FAILURE at 30.0 h"));
    assert!(text.contains("Overall: CRITICAL"));
}

#[test]
fn json_report_is_valid_json() {
    let readings = two_components();
    let summaries = summarize_by_component(&readings, Target::Latest).expect("summaries");
    let overview = SeriesOverview::compute(&readings, &TrendConfig::default());
    let json = render_json(&summaries, &overview).expect("encode");

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    let summaries = value["summaries"].as_array().expect("summaries array");
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1]["overall"], "critical");
}
