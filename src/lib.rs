//! # qms-report
//!
//! A paginating PDF report engine for quality-management exports:
//! non-conformances, corrective actions, audit schedules and performance
//! indicators.
//!
//! Rows arrive already flattened (dates formatted, foreign keys resolved to
//! names). The engine picks a body layout from the report kind, sizes the
//! columns from a sample of the rows, and flows everything onto pages with
//! an explicit cursor. Every unit (table row, list box, text line) is
//! checked against the bottom of the page before it is drawn, so nothing
//! is cut in half silently.
//!
//! ## Architecture
//!
//! ```text
//! (report type, rows, options)
//!       ↓
//!   [model]    — rows, report kinds, options
//!       ↓
//!   [report]   — assembly: header, title, body, summary, appendix
//!       ↓
//!   [layout]   — canvas, page cursor, column widths, page breaks
//!       ↓
//!   [pdf]      — serialize to PDF bytes
//! ```

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod report;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDateTime;

pub use error::{PdfError, ReportError};
pub use model::{
    file_name, CellValue, ExportFormat, PageSize, RenderOptions, ReportJob, ReportKind, ReportRow,
    Strategy,
};
pub use report::{RenderStats, RenderedReport, ReportRenderer};

/// Render `rows` as a PDF report of type `report_type`.
///
/// This is the primary entry point. Empty `rows` is not an error: the
/// report carries a "no data" placeholder instead of a body.
pub fn export_pdf(
    report_type: &str,
    rows: &[ReportRow],
    options: &RenderOptions,
) -> Result<Vec<u8>, ReportError> {
    ReportRenderer::new(options.clone()).export(report_type, rows)
}

/// A finished export: the file name the host should save under and the bytes.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub pages: usize,
}

impl ExportArtifact {
    /// Bytes as standard base64, for hosts that hand files around as text.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Export a parsed job, stamped with `generated_at`.
pub fn export_job(job: &ReportJob, generated_at: NaiveDateTime) -> Result<ExportArtifact, ReportError> {
    let report_type = job.label().ok_or(ReportError::MissingReportType)?;
    let report = ReportRenderer::new(job.options.clone())
        .generated_at(generated_at)
        .render(report_type, &job.rows)?;
    let bytes = report.to_pdf()?;
    Ok(ExportArtifact {
        file_name: file_name(report_type, generated_at.date(), ExportFormat::Pdf),
        bytes,
        pages: report.stats.pages,
    })
}

/// Export a job described as JSON (`{ reportType, rows, options }`),
/// stamped with the local time.
pub fn export_json(json: &str) -> Result<ExportArtifact, ReportError> {
    let job: ReportJob = serde_json::from_str(json)?;
    export_job(&job, chrono::Local::now().naive_local())
}
