//! Page furniture shared by every report: the brand band at the top of
//! each page, title, metadata box, section banners, the empty-report
//! placeholder and the footer stamped once the page count is known.

use chrono::NaiveDateTime;

use crate::font::StandardFont;
use crate::layout::{Canvas, PageCursor, RectStyle, RegionKind, PT_PER_MM};
use crate::style::TextAlign;
use crate::text::{fit_with_ellipsis, truncate_lines, wrap_with};

use super::{
    RenderContext, BODY_SIZE, FOOTER_RESERVE, HEADER_BAND_HEIGHT, HEADER_GAP, SECTION_GAP,
};

const COMPANY_SIZE: f64 = 11.0;
const TITLE_SIZE: f64 = 16.0;
const BANNER_SIZE: f64 = 10.0;
const BANNER_HEIGHT: f64 = 8.0;
const FOOTER_SIZE: f64 = 8.0;
const BOX_PADDING: f64 = 4.0;
const NO_DATA_HEIGHT: f64 = 32.0;
const MAX_TITLE_LINES: usize = 3;

/// Timestamp format used in the metadata box.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Baseline that vertically centres a single line of `size_pt` text in a
/// box starting at `top`.
pub(crate) fn centered_baseline(top: f64, height: f64, size_pt: f64) -> f64 {
    let cap = 0.7 * size_pt / PT_PER_MM;
    top + (height + cap) / 2.0
}

/// Distance from the top of a line box to its baseline.
pub(crate) fn ascent(size_pt: f64) -> f64 {
    0.8 * size_pt / PT_PER_MM
}

/// Height of the fixed block `page_header` draws.
pub(crate) fn header_height(ctx: &RenderContext<'_>) -> f64 {
    if ctx.options.show_header {
        HEADER_BAND_HEIGHT + HEADER_GAP
    } else {
        0.0
    }
}

/// Brand band with the company name and report type. Redrawn on every page.
pub(crate) fn page_header(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    cursor: PageCursor,
) -> PageCursor {
    if !ctx.options.show_header {
        return cursor;
    }
    let x = canvas.margin();
    let width = canvas.content_width();
    let y = cursor.y;

    canvas.scoped(|c| {
        c.set_fill_color(ctx.theme.brand);
        c.rect(x, y, width, HEADER_BAND_HEIGHT, RectStyle::Fill);

        c.set_text_color(ctx.theme.on_brand);
        c.set_font(StandardFont::HelveticaBold, COMPANY_SIZE);
        let half = width / 2.0 - BOX_PADDING;
        let company = fit_with_ellipsis(&ctx.options.company_name, half, &c.metrics());
        c.text(
            x + BOX_PADDING,
            centered_baseline(y, HEADER_BAND_HEIGHT, COMPANY_SIZE),
            &company,
        );

        c.set_font(StandardFont::Helvetica, BODY_SIZE);
        let label = fit_with_ellipsis(ctx.report_type, half, &c.metrics());
        c.text_aligned(
            x + width / 2.0,
            centered_baseline(y, HEADER_BAND_HEIGHT, BODY_SIZE),
            half,
            &label,
            TextAlign::Right,
        );
    });
    canvas.mark(RegionKind::PageHeader, x, y, width, HEADER_BAND_HEIGHT);
    cursor.advance(HEADER_BAND_HEIGHT + HEADER_GAP)
}

/// Report title, wrapped to the content width and cut to
/// `MAX_TITLE_LINES`.
pub(crate) fn title(canvas: &mut Canvas, ctx: &RenderContext<'_>, cursor: PageCursor) -> PageCursor {
    let x = canvas.margin();
    let width = canvas.content_width();
    canvas.scoped(|c| {
        c.set_font(StandardFont::HelveticaBold, TITLE_SIZE);
        c.set_text_color(ctx.theme.brand);
        let metrics = c.metrics();
        let lh = metrics.line_height();
        let mut lines: Vec<String> = wrap_with(ctx.report_type, width, &metrics, ctx.wrap).collect();
        if truncate_lines(&mut lines, MAX_TITLE_LINES, width, &metrics) {
            log::warn!("report title cut to {} lines", MAX_TITLE_LINES);
        }
        for (i, line) in lines.iter().enumerate() {
            c.text(x, cursor.y + ascent(TITLE_SIZE) + i as f64 * lh, line);
        }
        let height = lines.len() as f64 * lh;
        c.mark(RegionKind::Title, x, cursor.y, width, height);
        cursor.advance(height + SECTION_GAP / 2.0)
    })
}

/// Panel with the generation timestamp and record count.
pub(crate) fn metadata_box(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    cursor: PageCursor,
    generated_at: NaiveDateTime,
    record_count: usize,
) -> PageCursor {
    let x = canvas.margin();
    let width = canvas.content_width();
    let entries = [
        ("Generated:", generated_at.format(TIMESTAMP_FORMAT).to_string()),
        ("Records:", record_count.to_string()),
        ("Report type:", ctx.report_type.to_string()),
    ];

    let bottom = canvas.bottom_limit();

    canvas.scoped(|c| {
        c.set_font(StandardFont::Helvetica, BODY_SIZE);
        let lh = c.line_height();
        let height = 2.0 * BOX_PADDING + entries.len() as f64 * lh;
        let cursor = c.ensure_space(cursor, height, bottom, |c, cur| page_header(c, ctx, cur));

        c.set_fill_color(ctx.theme.panel);
        c.set_stroke_color(ctx.theme.border);
        c.rect(x, cursor.y, width, height, RectStyle::FillStroke);

        c.set_font(StandardFont::HelveticaBold, BODY_SIZE);
        let label_w = entries
            .iter()
            .map(|(label, _)| c.text_width(label))
            .fold(0.0, f64::max)
            + 2.0;

        for (i, (label, value)) in entries.iter().enumerate() {
            let baseline = cursor.y + BOX_PADDING + ascent(BODY_SIZE) + i as f64 * lh;
            c.set_font(StandardFont::HelveticaBold, BODY_SIZE);
            c.set_text_color(ctx.theme.text);
            c.text(x + BOX_PADDING, baseline, label);
            c.set_font(StandardFont::Helvetica, BODY_SIZE);
            let room = width - 2.0 * BOX_PADDING - label_w;
            let value = fit_with_ellipsis(value, room, &c.metrics());
            c.text(x + BOX_PADDING + label_w, baseline, &value);
        }

        c.mark(RegionKind::MetadataBox, x, cursor.y, width, height);
        cursor.advance(height + SECTION_GAP)
    })
}

/// Height of a section banner.
pub(crate) fn banner_height() -> f64 {
    BANNER_HEIGHT
}

/// Brand-colored band introducing a section. The caller guarantees space.
pub(crate) fn section_banner(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    cursor: PageCursor,
    text: &str,
) -> PageCursor {
    let x = canvas.margin();
    let width = canvas.content_width();
    canvas.scoped(|c| {
        c.set_fill_color(ctx.theme.brand);
        c.rect(x, cursor.y, width, BANNER_HEIGHT, RectStyle::Fill);
        c.set_font(StandardFont::HelveticaBold, BANNER_SIZE);
        c.set_text_color(ctx.theme.on_brand);
        let text = fit_with_ellipsis(text, width - 2.0 * BOX_PADDING, &c.metrics());
        c.text(
            x + BOX_PADDING,
            centered_baseline(cursor.y, BANNER_HEIGHT, BANNER_SIZE),
            &text,
        );
    });
    canvas.mark(RegionKind::SectionBanner, x, cursor.y, width, BANNER_HEIGHT);
    cursor.advance(BANNER_HEIGHT + 2.0)
}

/// Placeholder drawn instead of a body when there are no rows.
pub(crate) fn no_data(canvas: &mut Canvas, ctx: &RenderContext<'_>, cursor: PageCursor) -> PageCursor {
    let x = canvas.margin();
    let width = canvas.content_width();
    let bottom = canvas.bottom_limit();
    let cursor = canvas.ensure_space(cursor, NO_DATA_HEIGHT, bottom, |c, cur| {
        page_header(c, ctx, cur)
    });
    let y = cursor.y;
    canvas.scoped(|c| {
        c.set_fill_color(ctx.theme.panel);
        c.set_stroke_color(ctx.theme.border);
        c.set_line_width(0.4);
        c.rect(x, y, width, NO_DATA_HEIGHT, RectStyle::FillStroke);

        c.set_font(StandardFont::HelveticaBold, 12.0);
        c.set_text_color(ctx.theme.muted);
        c.text_aligned(x, y + 14.0, width, "No data available", TextAlign::Center);
        c.set_font(StandardFont::HelveticaOblique, BODY_SIZE);
        c.text_aligned(
            x,
            y + 22.0,
            width,
            "No records matched the selected filters.",
            TextAlign::Center,
        );
    });
    canvas.mark(RegionKind::NoData, x, y, width, NO_DATA_HEIGHT);
    cursor.advance(NO_DATA_HEIGHT + SECTION_GAP)
}

/// Stamp "Page i of N" on every page. Runs after assembly.
pub(crate) fn stamp_footers(canvas: &mut Canvas, ctx: &RenderContext<'_>) {
    let total = canvas.page_count();
    for index in 0..total {
        canvas.select_page(index);
        let x = canvas.margin();
        let width = canvas.content_width();
        let top = canvas.page_height() - canvas.margin() - FOOTER_RESERVE + 2.0;
        let baseline = canvas.page_height() - canvas.margin() - 1.5;

        canvas.scoped(|c| {
            c.set_stroke_color(ctx.theme.border);
            c.set_line_width(0.3);
            c.line(x, top, x + width, top);
            c.set_font(StandardFont::Helvetica, FOOTER_SIZE);
            c.set_text_color(ctx.theme.muted);
            let left = fit_with_ellipsis(&ctx.options.company_name, width * 0.6, &c.metrics());
            c.text(x, baseline, &left);
            c.text_aligned(
                x,
                baseline,
                width,
                &format!("Page {} of {}", index + 1, total),
                TextAlign::Right,
            );
        });
        canvas.mark(RegionKind::Footer, x, top, width, baseline - top);
    }
}
