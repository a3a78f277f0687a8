//! Health analysis pipeline
//!
//! Pure, synchronous stages over a fully-loaded table:
//! - `classifier`: scalar value + threshold table -> `HealthRating`
//! - `failures`: first absolute-limit breach per quantity
//! - `snapshot`: nearest-row selection for a `Target`
//! - `summary`: composes the above per component
//! - `trend`: LOWESS smoothing for the trend view

mod classifier;
mod failures;
mod snapshot;
mod summary;
pub mod trend;

pub use classifier::{classify, rate};
pub use failures::{detect_failures, is_breach};
pub use snapshot::{select, Snapshot};
pub use summary::{partition_by_component, summarize, summarize_by_component, Partition};
pub use trend::{lowess, TrendCurve};

use thiserror::Error;

/// Errors raised by the analysis stages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No complete readings available for {partition}")]
    EmptyInput { partition: String },
}

impl AnalysisError {
    pub(crate) fn empty(component: Option<&str>) -> Self {
        Self::EmptyInput {
            partition: component.map_or_else(|| "the table".to_string(), |c| format!("component '{c}'")),
        }
    }

    /// Rows without a component in a table where other rows have one.
    pub(crate) fn unlabelled() -> Self {
        Self::EmptyInput {
            partition: "readings without a component".to_string(),
        }
    }
}
