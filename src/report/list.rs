//! Simple-list body: one bordered box per record, a `label: value` line per
//! field. Boxes are kept whole when they fit a page; a box taller than a
//! page is drawn in segments, line by line.

use crate::font::{StandardFont, TextMetrics};
use crate::layout::page_break::{decide_break, BreakDecision};
use crate::layout::{Canvas, PageCursor, RectStyle, RegionKind};
use crate::model::{column_label, ReportRow};
use crate::text::wrap_with;

use super::chrome::{self, ascent};
use super::table::HIDDEN_KEY;
use super::{RenderContext, BODY_SIZE};

const BOX_PAD: f64 = 3.0;
const BOX_GAP: f64 = 3.0;
const LABEL_GAP: f64 = 2.0;
/// Labels never take more than this share of the box width.
const MAX_LABEL_SHARE: f64 = 0.4;
/// A box is not split when fewer lines would stay on the current page.
const MIN_ORPHAN_LINES: usize = 2;

/// One visual line of a box: an optional label fragment and a value fragment.
#[derive(Debug, Clone, PartialEq)]
struct BoxLine {
    label: Option<String>,
    value: String,
}

/// Lay out the fields of `row` as box lines.
fn box_lines(
    row: &ReportRow,
    ctx: &RenderContext<'_>,
    label_metrics: &TextMetrics,
    value_metrics: &TextMetrics,
    inner_width: f64,
) -> (f64, Vec<BoxLine>) {
    let fields: Vec<(String, String)> = row
        .iter()
        .filter(|(key, _)| *key != HIDDEN_KEY)
        .map(|(key, value)| (format!("{}:", column_label(key)), value.display()))
        .collect();

    let label_width = fields
        .iter()
        .map(|(label, _)| label_metrics.text_width(label))
        .fold(0.0, f64::max)
        .min(inner_width * MAX_LABEL_SHARE);
    let value_width = inner_width - label_width - LABEL_GAP;

    let mut lines = Vec::new();
    for (label, value) in &fields {
        let label_lines: Vec<String> = wrap_with(label, label_width, label_metrics, ctx.wrap).collect();
        let value_lines: Vec<String> = wrap_with(value, value_width, value_metrics, ctx.wrap).collect();
        let count = label_lines.len().max(value_lines.len());
        for j in 0..count {
            lines.push(BoxLine {
                label: label_lines.get(j).cloned(),
                value: value_lines.get(j).cloned().unwrap_or_default(),
            });
        }
    }
    (label_width, lines)
}

/// Draw one box per row starting at `cursor`.
pub(crate) fn render(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    rows: &[ReportRow],
    mut cursor: PageCursor,
) -> PageCursor {
    let x = canvas.margin();
    let width = canvas.content_width();
    let inner_width = width - 2.0 * BOX_PAD;
    let bottom = canvas.bottom_limit();

    let label_metrics = TextMetrics::new(StandardFont::HelveticaBold, BODY_SIZE);
    let value_metrics = TextMetrics::new(StandardFont::Helvetica, BODY_SIZE);
    let lh = value_metrics.line_height();

    for (index, row) in rows.iter().enumerate() {
        let (label_width, lines) = box_lines(row, ctx, &label_metrics, &value_metrics, inner_width);
        let lines = if lines.is_empty() {
            vec![BoxLine {
                label: None,
                value: String::new(),
            }]
        } else {
            lines
        };

        let mut rest: &[BoxLine] = &lines;
        while !rest.is_empty() {
            let heights = vec![lh; rest.len()];
            let remaining = bottom - cursor.y;
            let decision = decide_break(
                remaining,
                2.0 * BOX_PAD,
                &heights,
                MIN_ORPHAN_LINES,
                canvas.is_fresh(cursor),
            );
            let take = match decision {
                BreakDecision::Place => rest.len(),
                BreakDecision::Split {
                    items_on_current_page,
                } => items_on_current_page,
                BreakDecision::MoveToNextPage => {
                    cursor = canvas.next_page(cursor, |c, cur| chrome::page_header(c, ctx, cur));
                    continue;
                }
            };

            let (segment, tail) = rest.split_at(take);
            let height = 2.0 * BOX_PAD + segment.len() as f64 * lh;
            draw_segment(canvas, ctx, segment, x, cursor.y, width, label_width, height);
            canvas.mark(RegionKind::ListBox(index), x, cursor.y, width, height);
            cursor = cursor.advance(height);
            rest = tail;

            if !rest.is_empty() {
                log::debug!("list box {} continues on the next page", index + 1);
                cursor = canvas.next_page(cursor, |c, cur| chrome::page_header(c, ctx, cur));
            }
        }
        cursor = cursor.advance(BOX_GAP);
    }
    cursor
}

#[allow(clippy::too_many_arguments)]
fn draw_segment(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    lines: &[BoxLine],
    x: f64,
    y: f64,
    width: f64,
    label_width: f64,
    height: f64,
) {
    canvas.scoped(|c| {
        c.set_fill_color(ctx.theme.panel);
        c.set_stroke_color(ctx.theme.border);
        c.set_line_width(0.3);
        c.rect(x, y, width, height, RectStyle::FillStroke);

        c.set_text_color(ctx.theme.text);
        c.set_font(StandardFont::Helvetica, BODY_SIZE);
        let lh = c.line_height();
        for (j, line) in lines.iter().enumerate() {
            let baseline = y + BOX_PAD + ascent(BODY_SIZE) + j as f64 * lh;
            if let Some(label) = &line.label {
                c.set_font(StandardFont::HelveticaBold, BODY_SIZE);
                c.text(x + BOX_PAD, baseline, label);
            }
            c.set_font(StandardFont::Helvetica, BODY_SIZE);
            c.text(x + BOX_PAD + label_width + LABEL_GAP, baseline, &line.value);
        }
    });
}
