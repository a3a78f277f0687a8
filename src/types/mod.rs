//! Shared data structures for the equipment health pipeline
//!
//! This module defines the core types passed between pipeline stages:
//! - Ingestion: `Reading`, `Quantity`, `Target`
//! - Classification policy: `ThresholdTable`, `ThresholdBand`, `Severity`
//! - Outputs: `HealthRating`, `FailureEvent`, `FailureReport`, `HealthSummary`

mod reading;
// Public so the breach limits stay reachable as `types::thresholds::breach_limits`.
pub mod thresholds;
mod health;

pub use reading::*;
pub use thresholds::*;
pub use health::*;
