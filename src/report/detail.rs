//! Detail appendix of the full non-conformance report: every record
//! starts on a fresh portrait page with an info box, followed by its
//! free-text sections. Long sections flow onto continuation pages line by
//! line.

use crate::font::StandardFont;
use crate::layout::{Canvas, PageCursor, RectStyle, RegionKind};
use crate::model::{column_label, Orientation, ReportRow};
use crate::text::{truncate_lines, wrap_with};

use super::chrome::{self, ascent};
use super::{RenderContext, BODY_SIZE, SECTION_GAP};

const INFO_FIELDS: &[&str] = &[
    "code",
    "title",
    "status",
    "department",
    "responsible",
    "iso_requirement",
    "occurrence_date",
];

/// Free-text sections, by row key and heading.
pub const TEXT_SECTIONS: &[(&str, &str)] = &[
    ("description", "Description"),
    ("immediate_actions", "Immediate Actions"),
    ("root_cause", "Root Cause Analysis"),
    ("corrective_action", "Corrective Action"),
];

/// Shown in place of an empty section.
pub const NOT_PROVIDED: &str = "Not provided.";

const INFO_PAD: f64 = 3.0;
const INFO_LABEL_WIDTH: f64 = 42.0;
const INFO_MAX_LINES: usize = 3;
const HEADING_SIZE: f64 = 10.0;

/// Append one detail sheet per row. Returns the number of pages added.
pub(crate) fn render_appendix(canvas: &mut Canvas, ctx: &RenderContext<'_>, rows: &[ReportRow]) -> usize {
    let first = canvas.page_count();
    for (index, row) in rows.iter().enumerate() {
        let cursor = canvas.start_page(Orientation::Portrait, |c, cur| {
            chrome::page_header(c, ctx, cur)
        });
        let banner = format!(
            "Record {} of {}: {}",
            index + 1,
            rows.len(),
            row.display("code")
        );
        let cursor = chrome::section_banner(canvas, ctx, cursor, &banner);
        let mut cursor = info_box(canvas, ctx, row, index, cursor);
        for (key, heading) in TEXT_SECTIONS {
            cursor = text_section(canvas, ctx, cursor, heading, row.text(key).as_deref());
        }
    }
    let added = canvas.page_count() - first;
    log::debug!("detail appendix: {} records on {} pages", rows.len(), added);
    added
}

fn info_box(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    row: &ReportRow,
    index: usize,
    cursor: PageCursor,
) -> PageCursor {
    let x = canvas.margin();
    let width = canvas.content_width();
    let value_width = width - 2.0 * INFO_PAD - INFO_LABEL_WIDTH;

    canvas.scoped(|c| {
        c.set_font(StandardFont::Helvetica, BODY_SIZE);
        let metrics = c.metrics();
        let lh = metrics.line_height();

        let entries: Vec<(String, Vec<String>)> = INFO_FIELDS
            .iter()
            .map(|key| {
                let mut lines: Vec<String> =
                    wrap_with(&row.display(key), value_width, &metrics, ctx.wrap).collect();
                truncate_lines(&mut lines, INFO_MAX_LINES, value_width, &metrics);
                (format!("{}:", column_label(key)), lines)
            })
            .collect();

        let line_count: usize = entries.iter().map(|(_, lines)| lines.len()).sum();
        let height = 2.0 * INFO_PAD + line_count as f64 * lh;

        c.set_fill_color(ctx.theme.panel);
        c.set_stroke_color(ctx.theme.border);
        c.set_line_width(0.3);
        c.rect(x, cursor.y, width, height, RectStyle::FillStroke);

        c.set_text_color(ctx.theme.text);
        let mut y = cursor.y + INFO_PAD;
        for (label, lines) in &entries {
            c.set_font(StandardFont::HelveticaBold, BODY_SIZE);
            c.text(x + INFO_PAD, y + ascent(BODY_SIZE), label);
            c.set_font(StandardFont::Helvetica, BODY_SIZE);
            for line in lines {
                c.text(x + INFO_PAD + INFO_LABEL_WIDTH, y + ascent(BODY_SIZE), line);
                y += lh;
            }
        }

        c.mark(RegionKind::DetailRecord(index), x, cursor.y, width, height);
        cursor.advance(height + SECTION_GAP)
    })
}

/// A heading followed by wrapped text, placed one line at a time.
fn text_section(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    cursor: PageCursor,
    heading: &str,
    text: Option<&str>,
) -> PageCursor {
    let x = canvas.margin();
    let width = canvas.content_width();
    let bottom = canvas.bottom_limit();

    canvas.scoped(|c| {
        c.set_font(StandardFont::Helvetica, BODY_SIZE);
        let body = c.metrics();
        let lh = body.line_height();

        c.set_font(StandardFont::HelveticaBold, HEADING_SIZE);
        let heading_h = c.line_height() + 1.5;

        // Keep the heading with at least one line of its text.
        let mut cursor = c.ensure_space(cursor, heading_h + lh, bottom, |c, cur| {
            chrome::page_header(c, ctx, cur)
        });
        c.set_text_color(ctx.theme.brand);
        c.text(x, cursor.y + ascent(HEADING_SIZE), heading);
        c.set_stroke_color(ctx.theme.brand);
        c.set_line_width(0.3);
        c.line(x, cursor.y + heading_h - 0.5, x + width, cursor.y + heading_h - 0.5);
        cursor = cursor.advance(heading_h + 1.0);

        let (content, font, color) = match text {
            Some(t) => (t, StandardFont::Helvetica, ctx.theme.text),
            None => (NOT_PROVIDED, StandardFont::HelveticaOblique, ctx.theme.muted),
        };
        c.set_font(font, BODY_SIZE);
        c.set_text_color(color);
        for line in wrap_with(content, width, &body, ctx.wrap) {
            cursor = c.ensure_space(cursor, lh, bottom, |c, cur| chrome::page_header(c, ctx, cur));
            c.text(x, cursor.y + ascent(BODY_SIZE), &line);
            cursor = cursor.advance(lh);
        }
        cursor.advance(SECTION_GAP / 2.0)
    })
}
