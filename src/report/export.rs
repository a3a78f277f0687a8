//! Multi-page report export
//!
//! `ReportSink` abstracts where composed pages end up, so the CLI and the
//! tests can swap destinations without touching the composition code:
//! - `DirectorySink`: one file per page under a directory
//! - `MemorySink`: keeps pages in memory

use std::fmt::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use super::overview::{SeriesOverview, TrendSummary};
use super::render::{render_json, render_summary, render_text};
use crate::types::HealthSummary;

/// One named page of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    /// File-name-safe page name including extension
    pub name: String,
    pub content: String,
}

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for composed report pages
pub trait ReportSink {
    /// Write all pages, returning how many were written.
    fn write_pages(&mut self, pages: &[ReportPage]) -> Result<usize, ExportError>;

    /// Sink name for logging
    fn sink_name(&self) -> &'static str;
}

/// Build the export pages: overview, one page per summary, one chart-data
/// CSV per quantity, and a JSON page.
pub fn compose_pages(
    summaries: &[HealthSummary],
    overview: &SeriesOverview,
) -> Result<Vec<ReportPage>, ExportError> {
    let mut pages = Vec::with_capacity(summaries.len() + overview.trends.len() + 2);
    pages.push(ReportPage {
        name: "00_overview.txt".to_string(),
        content: render_text(&[], overview),
    });
    for (i, summary) in summaries.iter().enumerate() {
        pages.push(ReportPage {
            name: format!("{:02}_{}.txt", i + 1, page_slug(summary.component_name())),
            content: render_summary(summary),
        });
    }
    for trend in &overview.trends {
        pages.push(ReportPage {
            name: format!("trend_{}.csv", page_slug(trend.quantity.column_name())),
            content: trend_csv(trend, overview),
        });
    }
    pages.push(ReportPage {
        name: "report.json".to_string(),
        content: render_json(summaries, overview)?,
    });
    Ok(pages)
}

/// Raw and smoothed series of one quantity; the first breach is flagged.
fn trend_csv(trend: &TrendSummary, overview: &SeriesOverview) -> String {
    let breach = overview.failure(trend.quantity).map(|m| m.reading_index);
    let mut out = String::from("operating_hours,value,smoothed,failure\n");
    for p in &trend.series {
        let failure = breach == Some(p.reading_index);
        let _ = writeln!(out, "{},{},{},{failure}", p.operating_hours, p.value, p.smoothed);
    }
    out
}

/// Lowercase ASCII alphanumerics; everything else collapses to `_`.
fn page_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        "component".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes each page as a file under `dir`, creating it if needed
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportSink for DirectorySink {
    fn write_pages(&mut self, pages: &[ReportPage]) -> Result<usize, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        for page in pages {
            let path = self.dir.join(&page.name);
            std::fs::write(&path, &page.content).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), bytes = page.content.len(), "Wrote report page");
        }
        info!(dir = %self.dir.display(), pages = pages.len(), "Report exported");
        Ok(pages.len())
    }

    fn sink_name(&self) -> &'static str {
        "directory"
    }
}

/// Collects pages in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub pages: Vec<ReportPage>,
}

impl ReportSink for MemorySink {
    fn write_pages(&mut self, pages: &[ReportPage]) -> Result<usize, ExportError> {
        self.pages.extend_from_slice(pages);
        Ok(pages.len())
    }

    fn sink_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrendConfig;
    use crate::processing::summarize_by_component;
    use crate::types::{Reading, Target};

    fn readings() -> Vec<Reading> {
        vec![
            Reading::new(0, 1.0, 60.0, 0.2, 330.0).with_component("Gear Box #2"),
            Reading::new(1, 1.0, 90.0, 0.3, 310.0).with_component("pump"),
            Reading::new(2, 2.0, 125.0, 0.2, 300.0).with_component("Gear Box #2"),
        ]
    }

    fn pages() -> Vec<ReportPage> {
        let readings = readings();
        let summaries = summarize_by_component(&readings, Target::Latest).unwrap();
        let overview = SeriesOverview::compute(&readings, &TrendConfig::default());
        compose_pages(&summaries, &overview).unwrap()
    }

    #[test]
    fn test_page_names() {
        let names: Vec<String> = pages().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "00_overview.txt",
                "01_gear_box_2.txt",
                "02_pump.txt",
                "trend_temperature.csv",
                "trend_vibration.csv",
                "trend_pressure.csv",
                "report.json",
            ]
        );
    }

    #[test]
    fn test_trend_page_rows() {
        let pages = pages();
        let temp = pages.iter().find(|p| p.name == "trend_temperature.csv").unwrap();
        let mut lines = temp.content.lines();
        assert_eq!(lines.next(), Some("operating_hours,value,smoothed,failure"));

        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), readings().len(), "one row per valid reading");
        assert!(rows[0].starts_with("1,60,"));
        // 125 °C at 2 h is the temperature breach
        assert!(rows[2].starts_with("2,125,") && rows[2].ends_with(",true"), "{}", rows[2]);
        assert_eq!(rows.iter().filter(|r| r.ends_with(",true")).count(), 1);
    }

    #[test]
    fn test_page_slug() {
        assert_eq!(page_slug("Main Pump"), "main_pump");
        assert_eq!(page_slug("--"), "component");
        assert_eq!(page_slug("all readings"), "all_readings");
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::default();
        let written = sink.write_pages(&pages()).unwrap();
        assert_eq!(written, 7);
        assert!(sink.pages[1].content.contains("=== Gear Box #2 ==="));
        assert_eq!(sink.sink_name(), "memory");
    }

    #[test]
    fn test_directory_sink_writes_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("nested/report");
        let mut sink = DirectorySink::new(&dir);
        sink.write_pages(&pages()).unwrap();

        let overview = std::fs::read_to_string(dir.join("00_overview.txt")).unwrap();
        assert!(overview.contains("FAILURE at 2.0 h"));
        let json = std::fs::read_to_string(dir.join("report.json")).unwrap();
        assert!(json.contains("\"summaries\""));
    }
}
