//! Presentation layer
//!
//! Turns `HealthSummary` values into dashboard output. The analysis core
//! never deals with colors, gauge ranges or file layout; those live here:
//! - `gauge`: severity colors and per-quantity gauge zones
//! - `overview`: whole-table trend and failure markers
//! - `render`: text dashboard and JSON encoding
//! - `export`: multi-page export through a `ReportSink`

mod export;
mod gauge;
mod overview;
mod render;

pub use export::{compose_pages, DirectorySink, ExportError, MemorySink, ReportPage, ReportSink};
pub use gauge::{gauge_for, render_bar, zone_at, GaugeSpec, GaugeZone};
pub use overview::{FailureMarker, SeriesOverview, TrendPoint, TrendSummary};
pub use render::{render_json, render_summary, render_text};
