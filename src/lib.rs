//! Equipment Health: threshold-based health rating for equipment sensor data
//!
//! Loads a table of sensor readings (temperature, vibration, pressure over
//! operating hours), flags the first breach of each absolute safety limit,
//! and rates a selected reading against fixed health bands.
//!
//! ## Architecture
//!
//! - **Types**: readings, threshold tables, ratings and summaries
//! - **Processing**: band classifier, failure detector, snapshot selector,
//!   report aggregator, LOWESS trend smoother
//! - **Sensors**: xlsx/CSV table loader with header alias detection
//! - **Report**: gauges, text/JSON rendering, multi-page export
//! - **Interactive**: cancel-and-replace selection loop

pub mod config;
pub mod types;
pub mod processing;
pub mod sensors;
pub mod report;
pub mod interactive;

// Re-export run configuration
pub use config::{HealthConfig, TrendConfig};

// Re-export commonly used types
pub use types::{
    FailureEvent, FailureReport, HealthRating, HealthSummary, Quantity, Reading, Severity,
    Target, ThresholdTable,
};

// Re-export the analysis pipeline
pub use processing::{
    classify, detect_failures, lowess, select, summarize, summarize_by_component,
    AnalysisError, Snapshot, TrendCurve,
};

// Re-export loader
pub use sensors::{LoadConfig, LoadError, SensorTable};
