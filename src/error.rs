//! Structured error types for the report engine.
//!
//! Empty input is not an error: it renders a "no data" page. Malformed rows
//! are tolerated with fallback values. What remains is bad job input and
//! failures while serializing the document.

use thiserror::Error;

/// The unified error type returned by all public export functions.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse as a report job.
    #[error("failed to parse report job: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A job arrived without a report type, neither top-level nor in options.
    #[error("report job has no report type")]
    MissingReportType,

    /// An option value that would make layout meaningless (e.g. a margin
    /// wider than half the page).
    #[error("invalid option `{name}`: {message}")]
    InvalidOption { name: &'static str, message: String },

    /// Document serialization failed. Carries the report type for diagnostics.
    #[error("failed to export \"{report_type}\": {message}")]
    Export {
        report_type: String,
        message: String,
        #[source]
        source: Option<PdfError>,
    },
}

/// Failures raised by the PDF writer while drawing or finalizing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PdfError {
    #[error("document has no pages")]
    NoPages,
    #[error("non-finite {what} on page {page}")]
    NonFinite { what: &'static str, page: usize },
}

impl ReportError {
    /// Wrap a writer failure with the report type being exported.
    pub fn export(report_type: &str, source: PdfError) -> Self {
        ReportError::Export {
            report_type: report_type.to_string(),
            message: source.to_string(),
            source: Some(source),
        }
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report job schema. Expected { reportType, rows, options }.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_error_names_report_type() {
        let err = ReportError::export("Corrective Actions", PdfError::NoPages);
        let msg = err.to_string();
        assert!(msg.contains("Corrective Actions"));
        assert!(msg.contains("no pages"));
    }

    #[test]
    fn parse_error_carries_hint() {
        let err: ReportError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,")
            .unwrap_err()
            .into();
        match &err {
            ReportError::Parse { hint, .. } => assert!(!hint.is_empty()),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(err.to_string().contains("Hint"));
    }
}
