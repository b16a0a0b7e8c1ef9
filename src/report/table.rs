//! Tabular body: a brand-colored header row repeated on every page,
//! zebra-striped body rows whose height follows the tallest wrapped cell.

use crate::font::StandardFont;
use crate::layout::columns::{allocate_with, ColumnPolicy, ColumnSpec};
use crate::layout::{Canvas, PageCursor, RectStyle, RegionKind};
use crate::model::{column_label, ReportKind, ReportRow};
use crate::style::TextAlign;
use crate::text::{fit_with_ellipsis, truncate_lines, wrap_with, Measure};

use super::chrome::{self, ascent};
use super::RenderContext;

pub(crate) const TABLE_SIZE: f64 = 8.0;
const CELL_PAD_X: f64 = 1.5;
const CELL_PAD_Y: f64 = 1.5;
const MAX_HEADER_LINES: usize = 2;
/// Absorbs rounding between a column's allocated width and its label width.
const LABEL_FIT_TOLERANCE: f64 = 1e-6;
const CENTERED_KEYS: &[&str] = &["code", "status"];

/// Never shown as a column or list field.
pub const HIDDEN_KEY: &str = "id";

/// What the table renderer leaves behind.
pub(crate) struct TableOutcome {
    pub cursor: PageCursor,
    pub columns: Vec<ColumnSpec>,
    pub truncated_cells: usize,
}

struct TableLayout {
    x: f64,
    width: f64,
    columns: Vec<ColumnSpec>,
    header_lines: Vec<Vec<String>>,
    header_height: f64,
    line_height: f64,
}

/// Keys shown as columns: the kind's priority keys present in the sampled
/// rows, or the first row's keys when none are. `id` is never shown.
pub fn visible_columns(kind: &ReportKind, rows: &[ReportRow], sample_size: usize) -> Vec<String> {
    let sample = &rows[..rows.len().min(sample_size.max(1))];
    let present: Vec<String> = kind
        .priority_columns()
        .iter()
        .filter(|key| **key != HIDDEN_KEY)
        .filter(|key| sample.iter().any(|row| row.contains_key(key)))
        .map(|key| key.to_string())
        .collect();
    if !present.is_empty() {
        return present;
    }
    rows.first()
        .map(|row| {
            row.keys()
                .filter(|k| *k != HIDDEN_KEY)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn column_align(key: &str) -> TextAlign {
    if CENTERED_KEYS.contains(&key) {
        TextAlign::Center
    } else {
        TextAlign::Left
    }
}

fn build_layout(canvas: &mut Canvas, ctx: &RenderContext<'_>, rows: &[ReportRow]) -> TableLayout {
    let policy = ColumnPolicy {
        cell_padding: 2.0 * CELL_PAD_X,
        ..ColumnPolicy::default()
    };
    let keys = visible_columns(ctx.kind, rows, policy.sample_size);
    let labels: Vec<String> = keys.iter().map(|k| column_label(k)).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    let samples: Vec<Vec<String>> = rows
        .iter()
        .take(policy.sample_size)
        .map(|row| keys.iter().map(|k| row.display(k)).collect())
        .collect();

    let x = canvas.margin();
    let width = canvas.content_width();

    canvas.scoped(|c| {
        c.set_font(StandardFont::HelveticaBold, TABLE_SIZE);
        let bold = c.metrics();
        c.set_font(StandardFont::Helvetica, TABLE_SIZE);
        let body = c.metrics();
        let widths = allocate_with(&label_refs, width, &samples, &bold, &body, policy);

        let columns: Vec<ColumnSpec> = keys
            .iter()
            .zip(labels.iter().cloned())
            .zip(widths)
            .map(|((key, label), width)| ColumnSpec {
                key: key.clone(),
                label,
                width,
                align: column_align(key),
            })
            .collect();

        let header_lines: Vec<Vec<String>> = columns
            .iter()
            .map(|col| header_label_lines(&col.label, col.width - 2.0 * CELL_PAD_X, &bold, ctx))
            .collect();
        let line_height = body.line_height();
        let max_lines = header_lines.iter().map(Vec::len).max().unwrap_or(1).max(1);

        TableLayout {
            x,
            width: columns.iter().map(|c| c.width).sum(),
            columns,
            header_lines,
            header_height: max_lines as f64 * line_height + 2.0 * CELL_PAD_Y,
            line_height,
        }
    })
}

/// Header labels get at most two lines; the second is shortened if needed.
fn header_label_lines<M: Measure>(
    label: &str,
    width: f64,
    measure: &M,
    ctx: &RenderContext<'_>,
) -> Vec<String> {
    let mut lines: Vec<String> = wrap_with(label, width + LABEL_FIT_TOLERANCE, measure, ctx.wrap).collect();
    if lines.len() > MAX_HEADER_LINES {
        let rest = lines[MAX_HEADER_LINES - 1..].join(" ");
        lines.truncate(MAX_HEADER_LINES - 1);
        lines.push(fit_with_ellipsis(&rest, width, measure));
    }
    lines
}

fn draw_header(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    layout: &TableLayout,
    cursor: PageCursor,
) -> PageCursor {
    let y = cursor.y;
    canvas.scoped(|c| {
        c.set_fill_color(ctx.theme.brand);
        c.rect(layout.x, y, layout.width, layout.header_height, RectStyle::Fill);
        c.set_font(StandardFont::HelveticaBold, TABLE_SIZE);
        c.set_text_color(ctx.theme.on_brand);

        let lines_max = layout.header_lines.iter().map(Vec::len).max().unwrap_or(1);
        let mut col_x = layout.x;
        for (col, lines) in layout.columns.iter().zip(&layout.header_lines) {
            // Shorter labels sit vertically centred against the tallest.
            let offset = (lines_max - lines.len()) as f64 * layout.line_height / 2.0;
            for (j, line) in lines.iter().enumerate() {
                let baseline =
                    y + CELL_PAD_Y + offset + ascent(TABLE_SIZE) + j as f64 * layout.line_height;
                c.text_aligned(
                    col_x + CELL_PAD_X,
                    baseline,
                    col.width - 2.0 * CELL_PAD_X,
                    line,
                    TextAlign::Center,
                );
            }
            col_x += col.width;
        }
    });
    canvas.mark(RegionKind::TableHeader, layout.x, y, layout.width, layout.header_height);
    cursor.advance(layout.header_height)
}

/// Fixed content of a continuation page: page header, then the header row.
fn redraw_page(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    layout: &TableLayout,
    cursor: PageCursor,
) -> PageCursor {
    let cursor = chrome::page_header(canvas, ctx, cursor);
    draw_header(canvas, ctx, layout, cursor)
}

/// Draw every row as a table starting at `cursor`.
pub(crate) fn render(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    rows: &[ReportRow],
    cursor: PageCursor,
) -> TableOutcome {
    let layout = build_layout(canvas, ctx, rows);
    let bottom = canvas.bottom_limit();
    let lh = layout.line_height;

    // A row may never need more lines than a continuation page holds.
    let page_top = canvas.margin() + chrome::header_height(ctx) + layout.header_height;
    let capacity = bottom - page_top - 2.0 * CELL_PAD_Y;
    let max_lines = ((capacity / lh).floor() as usize).max(1);

    let first_row = lh + 2.0 * CELL_PAD_Y;
    let cursor = canvas.ensure_space(cursor, layout.header_height + first_row, bottom, |c, cur| {
        chrome::page_header(c, ctx, cur)
    });
    let mut cursor = draw_header(canvas, ctx, &layout, cursor);
    let mut truncated_cells = 0;

    let metrics = canvas.scoped(|c| {
        c.set_font(StandardFont::Helvetica, TABLE_SIZE);
        c.metrics()
    });

    for (index, row) in rows.iter().enumerate() {
        let mut cells: Vec<Vec<String>> = layout
            .columns
            .iter()
            .map(|col| {
                wrap_with(
                    &row.display(&col.key),
                    col.width - 2.0 * CELL_PAD_X,
                    &metrics,
                    ctx.wrap,
                )
                .collect()
            })
            .collect();

        for (cell, col) in cells.iter_mut().zip(&layout.columns) {
            let needed = cell.len();
            if truncate_lines(cell, max_lines, col.width - 2.0 * CELL_PAD_X, &metrics) {
                log::warn!(
                    "row {}: `{}` needs {} lines, truncated to {}",
                    index + 1,
                    col.key,
                    needed,
                    max_lines
                );
                truncated_cells += 1;
            }
        }

        let line_count = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let height = line_count as f64 * lh + 2.0 * CELL_PAD_Y;

        cursor = canvas.ensure_space(cursor, height, bottom, |c, cur| {
            redraw_page(c, ctx, &layout, cur)
        });
        draw_row(canvas, ctx, &layout, &cells, index, cursor.y, height);
        cursor = cursor.advance(height);
    }

    TableOutcome {
        cursor,
        columns: layout.columns,
        truncated_cells,
    }
}

fn draw_row(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    layout: &TableLayout,
    cells: &[Vec<String>],
    index: usize,
    top: f64,
    height: f64,
) {
    canvas.scoped(|c| {
        if index % 2 == 1 {
            c.set_fill_color(ctx.theme.zebra);
            c.rect(layout.x, top, layout.width, height, RectStyle::Fill);
        }
        c.set_stroke_color(ctx.theme.border);
        c.set_line_width(0.1);
        c.line(layout.x, top + height, layout.x + layout.width, top + height);

        c.set_font(StandardFont::Helvetica, TABLE_SIZE);
        c.set_text_color(ctx.theme.text);
        let mut col_x = layout.x;
        for (col, lines) in layout.columns.iter().zip(cells) {
            for (j, line) in lines.iter().enumerate() {
                let baseline = top + CELL_PAD_Y + ascent(TABLE_SIZE) + j as f64 * layout.line_height;
                c.text_aligned(
                    col_x + CELL_PAD_X,
                    baseline,
                    col.width - 2.0 * CELL_PAD_X,
                    line,
                    col.align,
                );
            }
            col_x += col.width;
        }
    });
    canvas.mark(RegionKind::TableRow(index), layout.x, top, layout.width, height);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nc_row(i: usize) -> ReportRow {
        ReportRow::new()
            .with("id", i as i64)
            .with("code", format!("NC-{i:03}"))
            .with("title", "Calibration overdue")
            .with("status", "Open")
            .with("internal_notes", "not a priority column")
    }

    #[test]
    fn priority_columns_filtered_to_present_keys() {
        let rows = vec![nc_row(1), nc_row(2)];
        let cols = visible_columns(&ReportKind::FullNonConformance, &rows, 10);
        assert_eq!(cols, vec!["code", "title", "status"]);
    }

    #[test]
    fn falls_back_to_first_row_keys_without_id() {
        let rows = vec![ReportRow::new()
            .with("id", 1i64)
            .with("supplier", "ACME")
            .with("score", 87.5)];
        let cols = visible_columns(&ReportKind::Other("Suppliers".into()), &rows, 10);
        assert_eq!(cols, vec!["supplier", "score"]);
    }

    #[test]
    fn label_driven_columns_keep_one_header_line() {
        use crate::layout::PageSetup;
        use crate::model::{Orientation, RenderOptions};
        use crate::style::Theme;
        use crate::text::WrapOptions;

        let options = RenderOptions::default();
        let kind = ReportKind::AuditSchedule;
        let ctx = RenderContext {
            options: &options,
            kind: &kind,
            report_type: "Audit Schedule",
            theme: Theme::default(),
            wrap: WrapOptions::default(),
        };
        let rows: Vec<ReportRow> = (0..6)
            .map(|_| {
                kind.priority_columns()
                    .iter()
                    .fold(ReportRow::new(), |row, key| row.with(key, "x"))
            })
            .collect();
        let mut canvas = Canvas::new(PageSetup {
            size: options.page_size,
            margin: options.margin,
            footer_reserve: 10.0,
        });
        canvas.add_page(Orientation::Portrait);

        let layout = build_layout(&mut canvas, &ctx, &rows);
        assert_eq!(layout.columns.len(), 7);
        for (col, lines) in layout.columns.iter().zip(&layout.header_lines) {
            assert_eq!(lines.len(), 1, "{} wrapped: {lines:?}", col.label);
        }
    }

    #[test]
    fn code_and_status_are_centred() {
        assert_eq!(column_align("code"), TextAlign::Center);
        assert_eq!(column_align("status"), TextAlign::Center);
        assert_eq!(column_align("title"), TextAlign::Left);
    }
}
