//! # Report Assembly
//!
//! Turns `(report type, rows, options)` into drawn pages:
//!
//! ```text
//! page header → title → metadata box → body (table or list)
//!   → summary → detail appendix → footers ("Page i of N")
//! ```
//!
//! The report kind is resolved once from the label; everything downstream
//! asks the kind, never the label. Footers are stamped in a second pass
//! because the page total is only known when assembly is done.

pub mod chrome;
pub mod detail;
pub mod list;
pub mod table;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::ReportError;
use crate::font::StandardFont;
use crate::layout::columns::ColumnSpec;
use crate::layout::{Canvas, Page, PageCursor, PageSetup, RegionKind};
use crate::model::{Orientation, RenderOptions, ReportKind, ReportRow, Strategy};
use crate::pdf::{DocumentInfo, PdfWriter};
use crate::style::{Color, Theme};
use crate::text::WrapOptions;

pub use table::visible_columns;

pub(crate) const HEADER_BAND_HEIGHT: f64 = 12.0;
pub(crate) const HEADER_GAP: f64 = 4.0;
pub(crate) const FOOTER_RESERVE: f64 = 10.0;
pub(crate) const SECTION_GAP: f64 = 6.0;
pub(crate) const BODY_SIZE: f64 = 9.0;

/// Smallest content area a page may be left with after margins.
const MIN_CONTENT_EXTENT: f64 = 60.0;

/// Everything the renderers need besides the canvas.
pub(crate) struct RenderContext<'a> {
    pub options: &'a RenderOptions,
    pub kind: &'a ReportKind,
    /// The label the caller asked for, used in titles and headers.
    pub report_type: &'a str,
    pub theme: Theme,
    pub wrap: WrapOptions,
}

/// Counters describing a finished layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderStats {
    pub rows: usize,
    pub pages: usize,
    /// Pages used by the detail appendix.
    pub detail_pages: usize,
    /// Table cells cut short to fit a page.
    pub truncated_cells: usize,
}

/// A laid-out report, ready to inspect or serialize.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub report_type: String,
    pub kind: ReportKind,
    /// None when there were no rows to draw.
    pub strategy: Option<Strategy>,
    /// Visible table columns; empty for list and empty reports.
    pub columns: Vec<ColumnSpec>,
    pub pages: Vec<Page>,
    pub stats: RenderStats,
    pub generated_at: NaiveDateTime,
    author: String,
}

impl RenderedReport {
    /// Serialize the pages to PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>, ReportError> {
        let info = DocumentInfo {
            title: Some(self.report_type.clone()),
            author: Some(self.author.clone()),
            subject: Some(format!("{} records", self.stats.rows)),
            created: Some(self.generated_at),
        };
        let bytes = PdfWriter::new()
            .write(&self.pages, &info)
            .map_err(|e| ReportError::export(&self.report_type, e))?;
        log::info!(
            "exported \"{}\": {} rows, {} pages, {} bytes",
            self.report_type,
            self.stats.rows,
            self.stats.pages,
            bytes.len()
        );
        Ok(bytes)
    }

    /// Pages carrying at least one region of the given kind.
    pub fn pages_with(&self, pred: impl Fn(&RegionKind) -> bool) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.regions.iter().any(|r| pred(&r.kind)))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Lays out reports with a fixed set of options.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    options: RenderOptions,
    generated_at: NaiveDateTime,
}

impl ReportRenderer {
    /// A renderer stamping reports with the local time.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            generated_at: chrono::Local::now().naive_local(),
        }
    }

    /// Override the generation timestamp shown in the metadata box.
    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = at;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Lay out `rows` as a report of type `report_type`. Outer whitespace
    /// of the label is ignored; the rest must match a known label exactly.
    pub fn render(&self, report_type: &str, rows: &[ReportRow]) -> Result<RenderedReport, ReportError> {
        let report_type = report_type.trim();
        if report_type.is_empty() {
            return Err(ReportError::MissingReportType);
        }
        let kind = ReportKind::from_label(report_type);
        let options = &self.options;

        let orientation = if options.force_landscape || kind.prefers_landscape() {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        self.check_margin(orientation)?;

        let brand = Color::from_hex(&options.brand_color).unwrap_or_else(|| {
            log::warn!("invalid brand color {:?}, using default", options.brand_color);
            Theme::default().brand
        });
        let ctx = RenderContext {
            options,
            kind: &kind,
            report_type,
            theme: Theme::with_brand(brand),
            wrap: WrapOptions {
                break_at_punctuation: options.improve_line_breaks,
            },
        };

        let mut canvas = Canvas::new(PageSetup {
            size: options.page_size,
            margin: options.margin,
            footer_reserve: if options.show_footer { FOOTER_RESERVE } else { 0.0 },
        });

        let cursor = canvas.start_page(orientation, |c, cur| chrome::page_header(c, &ctx, cur));
        let cursor = chrome::title(&mut canvas, &ctx, cursor);
        let cursor = chrome::metadata_box(&mut canvas, &ctx, cursor, self.generated_at, rows.len());

        let mut stats = RenderStats {
            rows: rows.len(),
            ..RenderStats::default()
        };
        let mut columns = Vec::new();
        let strategy = if rows.is_empty() {
            chrome::no_data(&mut canvas, &ctx, cursor);
            None
        } else {
            let strategy = kind.strategy(rows.len());
            log::debug!("{}: {} rows, {:?} body", report_type, rows.len(), strategy);
            let cursor = match strategy {
                Strategy::Tabular => {
                    let outcome = table::render(&mut canvas, &ctx, rows, cursor);
                    columns = outcome.columns;
                    stats.truncated_cells = outcome.truncated_cells;
                    outcome.cursor
                }
                Strategy::SimpleList => list::render(&mut canvas, &ctx, rows, cursor),
            };
            if options.include_summary {
                summary(&mut canvas, &ctx, rows, cursor.advance(SECTION_GAP));
            }
            if kind.has_detail_appendix() && options.include_details {
                stats.detail_pages = detail::render_appendix(&mut canvas, &ctx, rows);
            }
            Some(strategy)
        };

        if options.show_footer {
            chrome::stamp_footers(&mut canvas, &ctx);
        }
        stats.pages = canvas.page_count();

        Ok(RenderedReport {
            report_type: report_type.to_string(),
            kind: kind.clone(),
            strategy,
            columns,
            pages: canvas.into_pages(),
            stats,
            generated_at: self.generated_at,
            author: options.company_name.clone(),
        })
    }

    /// Lay out and serialize in one step.
    pub fn export(&self, report_type: &str, rows: &[ReportRow]) -> Result<Vec<u8>, ReportError> {
        self.render(report_type, rows)?.to_pdf()
    }

    fn check_margin(&self, orientation: Orientation) -> Result<(), ReportError> {
        let margin = self.options.margin;
        let (w, h) = self.options.page_size.oriented(orientation);
        if !margin.is_finite() || margin < 0.0 {
            return Err(ReportError::InvalidOption {
                name: "margin",
                message: format!("{margin} is not a non-negative length"),
            });
        }
        if w.min(h) - 2.0 * margin < MIN_CONTENT_EXTENT {
            return Err(ReportError::InvalidOption {
                name: "margin",
                message: format!(
                    "{margin}mm leaves less than {MIN_CONTENT_EXTENT}mm of a {w}x{h}mm page"
                ),
            });
        }
        Ok(())
    }
}

/// Record count plus a per-status breakdown when rows carry a status.
/// Placed line by line; each page segment is its own `Summary` region.
fn summary(canvas: &mut Canvas, ctx: &RenderContext<'_>, rows: &[ReportRow], cursor: PageCursor) -> PageCursor {
    let mut lines = vec![format!("Total records: {}", rows.len())];
    let mut by_status: Vec<(String, usize)> = Vec::new();
    for row in rows.iter().filter(|r| r.contains_key("status")) {
        let status = row.display("status");
        match by_status.iter_mut().find(|(s, _)| *s == status) {
            Some((_, n)) => *n += 1,
            None => by_status.push((status, 1)),
        }
    }
    if !by_status.is_empty() {
        lines.push("By status:".to_string());
        lines.extend(by_status.iter().map(|(s, n)| format!("    {s}: {n}")));
    }

    let x = canvas.margin();
    let width = canvas.content_width();
    let bottom = canvas.bottom_limit();

    canvas.scoped(|c| {
        c.set_font(StandardFont::Helvetica, BODY_SIZE);
        let lh = c.line_height();
        // Keep the banner with the first two lines.
        let lead = chrome::banner_height() + 2.0 + lines.len().min(2) as f64 * lh;
        let mut cursor = c.ensure_space(cursor, lead, bottom, |c, cur| chrome::page_header(c, ctx, cur));
        let mut top = cursor.y;
        cursor = chrome::section_banner(c, ctx, cursor, "Summary");

        c.set_text_color(ctx.theme.text);
        for line in &lines {
            if cursor.y + lh > bottom && !c.is_fresh(cursor) {
                c.mark(RegionKind::Summary, x, top, width, cursor.y - top);
                cursor = c.next_page(cursor, |c, cur| chrome::page_header(c, ctx, cur));
                top = cursor.y;
            }
            c.text(x, cursor.y + chrome::ascent(BODY_SIZE), line);
            cursor = cursor.advance(lh);
        }
        c.mark(RegionKind::Summary, x, top, width, cursor.y - top);
        cursor
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap()
    }

    #[test]
    fn empty_label_is_rejected() {
        let r = ReportRenderer::new(RenderOptions::default()).generated_at(at());
        assert!(matches!(r.render("  ", &[]), Err(ReportError::MissingReportType)));
    }

    #[test]
    fn oversized_margin_is_rejected() {
        let options = RenderOptions {
            margin: 90.0,
            ..RenderOptions::default()
        };
        let err = ReportRenderer::new(options).render("Audit Schedule", &[]);
        assert!(matches!(err, Err(ReportError::InvalidOption { name: "margin", .. })));
        let options = RenderOptions {
            margin: f64::NAN,
            ..RenderOptions::default()
        };
        assert!(ReportRenderer::new(options).render("Audit Schedule", &[]).is_err());
    }

    #[test]
    fn metadata_shows_timestamp() {
        let report = ReportRenderer::new(RenderOptions::default())
            .generated_at(at())
            .render("Audit Schedule", &[])
            .unwrap();
        assert!(report.pages[0].texts().contains(&"04/05/2026 09:30"));
    }

    #[test]
    fn summary_breaks_down_by_status() {
        let rows: Vec<ReportRow> = ["Open", "Closed", "Open"]
            .iter()
            .map(|s| ReportRow::new().with("code", "X").with("status", *s))
            .collect();
        let report = ReportRenderer::new(RenderOptions::default())
            .generated_at(at())
            .render("Audit Schedule", &rows)
            .unwrap();
        let texts = report.pages[0].texts();
        assert!(texts.contains(&"Total records: 3"));
        assert!(texts.contains(&"    Open: 2"));
        assert!(texts.contains(&"    Closed: 1"));
    }

    #[test]
    fn invalid_brand_color_falls_back() {
        let options = RenderOptions {
            brand_color: "teal".to_string(),
            ..RenderOptions::default()
        };
        let report = ReportRenderer::new(options)
            .generated_at(at())
            .render("Corrective Actions", &[])
            .unwrap();
        assert_eq!(report.stats.pages, 1);
    }
}
