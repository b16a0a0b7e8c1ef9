//! # Report Model
//!
//! The input side of the engine: report rows, the closed set of report
//! kinds, and the options bag. Rows arrive already flattened by upstream
//! transforms (dates formatted, foreign keys resolved to names); the engine
//! only ever reads them.

use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display value for missing keys and nulls.
pub const FALLBACK_VALUE: &str = "N/A";

/// Reports with at most this many rows use the simple list, unless the
/// kind forces a strategy.
pub const LIST_ROW_THRESHOLD: usize = 5;

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// The string drawn for this value.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => FALLBACK_VALUE.to_string(),
            CellValue::Bool(true) => "Yes".to_string(),
            CellValue::Bool(false) => "No".to_string(),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Nested arrays and objects are not scalar; they are kept as their JSON
/// text rather than rejected.
impl From<serde_json::Value> for CellValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            serde_json::Value::String(s) => CellValue::Text(s),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(CellValue::from)
    }
}

/// One flattened record, keys in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRow {
    fields: Vec<(String, CellValue)>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace, keeping the original position of an existing key.
    pub fn insert(&mut self, key: &str, value: impl Into<CellValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Display string for `key`, with the fallback for missing or null values.
    pub fn display(&self, key: &str) -> String {
        self.get(key)
            .map(CellValue::display)
            .unwrap_or_else(|| FALLBACK_VALUE.to_string())
    }

    /// Display string for `key`, or None when missing, null or blank.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            CellValue::Null => None,
            value => {
                let s = value.display();
                if s.trim().is_empty() {
                    None
                } else {
                    Some(s)
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for ReportRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = ReportRow::new();
        for (k, v) in iter {
            let key: String = k.into();
            row.insert(&key, v);
        }
        row
    }
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct ReportRowVisitor;

impl<'de> Visitor<'de> for ReportRowVisitor {
    type Value = ReportRow;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping column keys to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ReportRow, A::Error> {
        let mut row = ReportRow::new();
        while let Some((key, value)) = access.next_entry::<String, CellValue>()? {
            row.insert(&key, value);
        }
        Ok(row)
    }
}

impl<'de> Deserialize<'de> for ReportRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ReportRowVisitor)
    }
}

/// How the body of a report is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// Fixed-column grid under a colored header band.
    Tabular,
    /// One bordered box per record with `label: value` pairs.
    SimpleList,
}

const NON_CONFORMANCE_COLUMNS: &[&str] = &[
    "code",
    "title",
    "department",
    "iso_requirement",
    "status",
    "responsible",
    "occurrence_date",
];

const CORRECTIVE_ACTION_COLUMNS: &[&str] = &[
    "code",
    "title",
    "nc_code",
    "department",
    "responsible",
    "deadline",
    "status",
];

const AUDIT_COLUMNS: &[&str] = &[
    "code",
    "title",
    "department",
    "iso_requirement",
    "auditor",
    "scheduled_date",
    "status",
];

const INDICATOR_COLUMNS: &[&str] = &["indicator", "target", "actual", "period", "status"];

/// The closed set of report kinds, resolved once from the caller's label.
///
/// Labels are matched exactly, including the legacy Portuguese labels the
/// front end still sends. Anything else is `Other` and gets the generic
/// row-count rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    FullNonConformance,
    NonConformances,
    CorrectiveActions,
    PerformanceIndicators,
    AuditSchedule,
    Other(String),
}

impl ReportKind {
    const LABELS: &'static [(&'static str, ReportKind)] = &[
        ("Full Non-Conformance Report", ReportKind::FullNonConformance),
        ("Não Conformidades Completo", ReportKind::FullNonConformance),
        ("Non-Conformances", ReportKind::NonConformances),
        ("Não Conformidades", ReportKind::NonConformances),
        ("Corrective Actions", ReportKind::CorrectiveActions),
        ("Ações Corretivas", ReportKind::CorrectiveActions),
        ("Performance Indicators", ReportKind::PerformanceIndicators),
        ("Indicadores de Desempenho", ReportKind::PerformanceIndicators),
        ("Audit Schedule", ReportKind::AuditSchedule),
        ("Cronograma de Auditorias", ReportKind::AuditSchedule),
    ];

    /// Resolve a display label by exact match.
    pub fn from_label(label: &str) -> Self {
        Self::LABELS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, kind)| kind.clone())
            .unwrap_or_else(|| ReportKind::Other(label.to_string()))
    }

    /// Canonical English label.
    pub fn label(&self) -> &str {
        match self {
            ReportKind::FullNonConformance => "Full Non-Conformance Report",
            ReportKind::NonConformances => "Non-Conformances",
            ReportKind::CorrectiveActions => "Corrective Actions",
            ReportKind::PerformanceIndicators => "Performance Indicators",
            ReportKind::AuditSchedule => "Audit Schedule",
            ReportKind::Other(label) => label,
        }
    }

    /// Pick the body strategy for `row_count` rows.
    pub fn strategy(&self, row_count: usize) -> Strategy {
        match self {
            ReportKind::FullNonConformance | ReportKind::CorrectiveActions => Strategy::Tabular,
            ReportKind::PerformanceIndicators => Strategy::SimpleList,
            _ if row_count <= LIST_ROW_THRESHOLD => Strategy::SimpleList,
            _ => Strategy::Tabular,
        }
    }

    /// Columns a tabular body may show, in order. `id` is never among them.
    pub fn priority_columns(&self) -> &'static [&'static str] {
        match self {
            ReportKind::CorrectiveActions => CORRECTIVE_ACTION_COLUMNS,
            ReportKind::AuditSchedule => AUDIT_COLUMNS,
            ReportKind::PerformanceIndicators => INDICATOR_COLUMNS,
            _ => NON_CONFORMANCE_COLUMNS,
        }
    }

    /// Wide tabular kinds are laid out on landscape pages.
    pub fn prefers_landscape(&self) -> bool {
        matches!(
            self,
            ReportKind::FullNonConformance | ReportKind::CorrectiveActions
        )
    }

    /// Only the full non-conformance report appends per-record detail pages.
    pub fn has_detail_appendix(&self) -> bool {
        matches!(self, ReportKind::FullNonConformance)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Turn a column key into a header label: `iso_requirement` → `ISO Requirement`.
pub fn column_label(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !word.is_empty() {
            words.push(std::mem::take(&mut word));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        word.push(ch);
    }
    if !word.is_empty() {
        words.push(word);
    }

    words
        .iter()
        .map(|w| {
            let lower = w.to_lowercase();
            match lower.as_str() {
                "id" | "iso" | "nc" | "kpi" | "ca" => lower.to_uppercase(),
                _ => {
                    let mut chars = lower.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Standard page sizes, in millimetres (portrait).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    Letter,
    Legal,
}

impl PageSize {
    /// Returns (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A3 => (297.0, 420.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }

    /// (width, height) for the given orientation.
    pub fn oriented(&self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.dimensions();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Rendering options for one export call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Brand band at the top of every page.
    pub show_header: bool,
    /// "Page i of N" footer on every page.
    pub show_footer: bool,
    /// Landscape pages regardless of report kind.
    pub force_landscape: bool,
    /// Break long tokens at punctuation before splitting characters.
    pub improve_line_breaks: bool,
    /// Fallback report label when the job carries none.
    pub report_type: Option<String>,
    /// Page margin in millimetres.
    pub margin: f64,
    /// Text in the header band.
    pub company_name: String,
    /// `#RRGGBB` brand color for bands and table headers.
    pub brand_color: String,
    pub page_size: PageSize,
    /// Record count and status breakdown after the body.
    pub include_summary: bool,
    /// Per-record detail pages for the full non-conformance report.
    pub include_details: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_header: true,
            show_footer: true,
            force_landscape: false,
            improve_line_breaks: true,
            report_type: None,
            margin: 15.0,
            company_name: "Quality Management System".to_string(),
            brand_color: "#1F4E79".to_string(),
            page_size: PageSize::A4,
            include_summary: true,
            include_details: true,
        }
    }
}

/// Output format, used for file naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Pdf,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

/// `{report type with whitespace runs as _}_{YYYYMMDD}.{ext}`
pub fn file_name(report_type: &str, date: NaiveDate, format: ExportFormat) -> String {
    let mut stem = String::with_capacity(report_type.len());
    let mut in_space = false;
    for ch in report_type.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(ch);
            in_space = false;
        }
    }
    format!(
        "{}_{}.{}",
        stem,
        date.format("%Y%m%d"),
        format.extension()
    )
}

/// A complete export request as JSON: `{ reportType, rows, options }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportJob {
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    #[serde(default)]
    pub options: RenderOptions,
}

impl ReportJob {
    /// The label to export under: top-level first, then the options.
    /// Outer whitespace is trimmed, the same way the renderer trims it.
    pub fn label(&self) -> Option<&str> {
        self.report_type
            .as_deref()
            .or(self.options.report_type.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}
