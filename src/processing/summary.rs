//! Report aggregation: one `HealthSummary` per entity

use tracing::debug;

use super::{classify, detect_failures, select, AnalysisError};
use crate::types::{table_for, HealthSummary, Quantity, Reading, Target};

/// Readings belonging to one component, in table order
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub component: Option<String>,
    pub readings: Vec<Reading>,
}

/// Split readings by `component_type`, keeping first-appearance order.
///
/// Rows without a component share one partition with `component: None`.
pub fn partition_by_component(readings: &[Reading]) -> Vec<Partition> {
    let mut partitions: Vec<Partition> = Vec::new();
    for reading in readings {
        let key = reading.component_type.as_deref();
        match partitions.iter_mut().find(|p| p.component.as_deref() == key) {
            Some(p) => p.readings.push(reading.clone()),
            None => partitions.push(Partition {
                component: key.map(str::to_string),
                readings: vec![reading.clone()],
            }),
        }
    }
    partitions
}

fn summarize_partition(
    component: Option<&str>,
    readings: &[Reading],
    target: Target,
) -> Result<HealthSummary, AnalysisError> {
    let snapshot = select(readings, target).map_err(|_| AnalysisError::empty(component))?;
    let reading = snapshot.reading;

    // Complete readings carry all three values; NaN here would classify as critical
    let rating_of = |q: Quantity| classify(reading.value(q).unwrap_or(f64::NAN), table_for(q));
    let temperature = rating_of(Quantity::Temperature);
    let vibration = rating_of(Quantity::Vibration);
    let pressure = rating_of(Quantity::Pressure);
    let overall = temperature.severity.max(vibration.severity).max(pressure.severity);

    let failures = detect_failures(readings);

    debug!(
        component = component.unwrap_or("-"),
        selected_index = snapshot.index,
        overall = %overall,
        failures = failures.events().count(),
        "Partition summarized"
    );

    Ok(HealthSummary {
        component: component.map(str::to_string),
        selected_index: snapshot.index,
        reading: reading.clone(),
        temperature,
        vibration,
        pressure,
        failures,
        overall,
        readings_considered: readings.len(),
    })
}

/// Summarize the whole table as one entity.
pub fn summarize(readings: &[Reading], target: Target) -> Result<HealthSummary, AnalysisError> {
    summarize_partition(None, readings, target)
}

/// Summarize each component independently.
///
/// Falls back to a single whole-table summary when no row carries a
/// component. An empty partition fails the whole request.
pub fn summarize_by_component(
    readings: &[Reading],
    target: Target,
) -> Result<Vec<HealthSummary>, AnalysisError> {
    if readings.iter().all(|r| r.component_type.is_none()) {
        return summarize(readings, target).map(|s| vec![s]);
    }
    partition_by_component(readings)
        .iter()
        .map(|p| match p.component.as_deref() {
            Some(c) => summarize_partition(Some(c), &p.readings, target),
            None => summarize_partition(None, &p.readings, target)
                .map_err(|_| AnalysisError::unlabelled()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn scenario() -> Vec<Reading> {
        vec![
            Reading::new(0, 10.0, 60.0, 0.2, 310.0),
            Reading::new(1, 20.0, 75.0, 0.5, 300.0),
            Reading::new(2, 30.0, 125.0, 2.1, 220.0),
        ]
    }

    #[test]
    fn test_summarize_latest_scenario() {
        let summary = summarize(&scenario(), Target::Latest).unwrap();
        assert_eq!(summary.selected_index, 2);
        assert_eq!(summary.temperature.score, 0);
        assert_eq!(summary.temperature.label, "critical");
        assert_eq!(summary.overall, Severity::Critical);
        assert_eq!(summary.failures.events().count(), 3);
        assert_eq!(summary.readings_considered, 3);
    }

    #[test]
    fn test_summarize_at_hour() {
        let summary = summarize(&scenario(), Target::Hours(22.0)).unwrap();
        assert_eq!(summary.reading.operating_hours, Some(20.0));
        assert_eq!(summary.temperature.label, "fair");
        assert_eq!(summary.vibration.label, "fair");
        assert_eq!(summary.pressure.label, "fair");
        assert_eq!(summary.overall, Severity::Fair);
        // Failures cover the whole partition, not just the selected row
        assert_eq!(summary.failures.temperature.map(|e| e.reading_index), Some(2));
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let readings = scenario();
        assert_eq!(
            summarize(&readings, Target::Hours(12.0)),
            summarize(&readings, Target::Hours(12.0))
        );
    }

    #[test]
    fn test_empty_propagates() {
        assert!(matches!(
            summarize(&[], Target::Latest),
            Err(AnalysisError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_partitions_keep_first_appearance_order() {
        let readings = vec![
            Reading::new(0, 1.0, 60.0, 0.2, 310.0).with_component("pump"),
            Reading::new(1, 1.0, 90.0, 0.2, 310.0).with_component("motor"),
            Reading::new(2, 2.0, 61.0, 0.2, 310.0).with_component("pump"),
            Reading::new(3, 2.0, 62.0, 0.2, 310.0),
        ];
        let parts = partition_by_component(&readings);
        let names: Vec<_> = parts.iter().map(|p| p.component.as_deref()).collect();
        assert_eq!(names, vec![Some("pump"), Some("motor"), None]);
        assert_eq!(parts[0].readings.len(), 2);

        let summaries = summarize_by_component(&readings, Target::Latest).unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[1].temperature.label, "poor");
        assert_eq!(summaries[0].selected_index, 1);
    }

    #[test]
    fn test_no_components_yields_single_summary() {
        let summaries = summarize_by_component(&scenario(), Target::Latest).unwrap();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].component.is_none());
    }

    #[test]
    fn test_empty_partition_names_component() {
        let mut broken = Reading::new(1, 1.0, 60.0, 0.2, 310.0).with_component("fan");
        broken.vibration = None;
        let readings = vec![Reading::new(0, 1.0, 60.0, 0.2, 310.0).with_component("pump"), broken];
        let err = summarize_by_component(&readings, Target::Latest).unwrap_err();
        assert_eq!(err.to_string(), "No complete readings available for component 'fan'");
    }

    #[test]
    fn test_empty_unlabelled_partition_is_named() {
        let mut untagged = Reading::new(1, 2.0, 60.0, 0.2, 310.0);
        untagged.pressure = None;
        let readings = vec![Reading::new(0, 1.0, 60.0, 0.2, 310.0).with_component("pump"), untagged];
        let err = summarize_by_component(&readings, Target::Latest).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No complete readings available for readings without a component"
        );

        // Whole-table requests keep naming the table
        let err = summarize(&readings[1..], Target::Latest).unwrap_err();
        assert_eq!(err.to_string(), "No complete readings available for the table");
    }
}
