//! Séance PDF Creator
//!
//! Renders classroom observation reports: a header with the session date,
//! one framed block per observation with its grouped ratings on a three-level
//! Likert scale, and a `page/total` footer. Fonts are embedded TrueType when
//! one is found, with the built-in Helvetica faces as fallback.

pub mod assets;
pub mod config;
pub mod document;
pub mod fonts;
pub mod geometry;
pub mod likert;
pub mod observation;
pub mod report;
pub mod typography;

// Re-export commonly used functions and types
pub use config::ReportOptions;
pub use fonts::FontContext;
pub use observation::{Level, Observation, ObservableRow, RatedObservable};
pub use report::{report_filename, RenderedReport, ReportRenderer};

use anyhow::Result;
use chrono::NaiveDate;

/// Render a report with the default options.
pub fn render(observations: &[Observation], report_date: NaiveDate) -> Result<Vec<u8>> {
    render_with_options(observations, report_date, &ReportOptions::default())
}

/// Render a report. Fonts and assets are resolved for this call only; hosts
/// rendering repeatedly should keep a [`ReportRenderer`] instead.
pub fn render_with_options(
    observations: &[Observation],
    report_date: NaiveDate,
    options: &ReportOptions,
) -> Result<Vec<u8>> {
    let renderer = ReportRenderer::new(options.clone());
    Ok(renderer.render(observations, report_date)?.bytes)
}
