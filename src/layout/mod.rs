//! # Page Layout
//!
//! The canvas reports are drawn onto. It owns the pages, the draw commands
//! on each page and the current graphics state; renderers move a
//! [`PageCursor`] down the page and ask [`Canvas::ensure_space`] for a new
//! page when the next unit would cross the bottom limit.
//!
//! All coordinates are millimetres from the top-left corner of the page.
//! The PDF writer flips the y axis and converts to points.
//!
//! Besides draw commands, every page records [`Region`]s: the rectangles
//! occupied by logical units (table rows, list boxes, footers). They cost
//! nothing to keep and make pagination observable without parsing the PDF.

pub mod columns;
pub mod page_break;

use serde::Serialize;

use crate::font::{StandardFont, TextMetrics};
use crate::model::{Orientation, PageSize};
use crate::style::{Color, GraphicsState, TextAlign};

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Tolerance for "is the cursor still at the top of a fresh page".
const FRESH_EPSILON: f64 = 1e-6;

/// Vertical position on a page. Copied freely; advanced monotonically
/// within a page and reset by a page break.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageCursor {
    /// Distance from the top edge, in millimetres.
    pub y: f64,
    /// Zero-based index of the page the cursor is on.
    pub page_index: usize,
}

impl PageCursor {
    /// Move down by `dy`.
    pub fn advance(self, dy: f64) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }
}

/// A single drawing command. Colors and fonts are captured from the
/// graphics state at the time the command was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        /// Stroke color and line width.
        stroke: Option<(Color, f64)>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },
    /// A single line of text; `y` is the baseline.
    Text {
        x: f64,
        y: f64,
        text: String,
        font: StandardFont,
        size: f64,
        color: Color,
    },
}

/// Fill/stroke selection for [`Canvas::rect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectStyle {
    Fill,
    Stroke,
    FillStroke,
}

/// The logical unit a region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegionKind {
    PageHeader,
    Title,
    MetadataBox,
    SectionBanner,
    TableHeader,
    /// A body row of a table, by row index.
    TableRow(usize),
    /// One segment of a list box, by row index.
    ListBox(usize),
    NoData,
    Summary,
    /// The info box opening a detail page, by row index.
    DetailRecord(usize),
    Footer,
}

/// A rectangle occupied by a logical unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub kind: RegionKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A fully drawn page.
#[derive(Debug, Clone)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
    pub ops: Vec<DrawOp>,
    pub regions: Vec<Region>,
}

impl Page {
    /// Regions matching `pred`, in drawing order.
    pub fn regions_where(&self, pred: impl Fn(&RegionKind) -> bool) -> Vec<Region> {
        self.regions.iter().filter(|r| pred(&r.kind)).copied().collect()
    }

    /// All text drawn on the page, one entry per text command.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Where each page starts its content and where it must stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub size: PageSize,
    /// Margin on all four sides, in millimetres.
    pub margin: f64,
    /// Space kept free above the bottom margin for the footer.
    pub footer_reserve: f64,
}

/// Pages plus the current drawing state.
pub struct Canvas {
    setup: PageSetup,
    pages: Vec<Page>,
    current: usize,
    state: GraphicsState,
    /// Cursor handed out right after the last page start and redraw.
    fresh_top: Option<PageCursor>,
}

impl Canvas {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            pages: Vec::new(),
            current: 0,
            state: GraphicsState::default(),
            fresh_top: None,
        }
    }

    pub fn setup(&self) -> PageSetup {
        self.setup
    }

    pub fn margin(&self) -> f64 {
        self.setup.margin
    }

    // ── Pages ──────────────────────────────────────────────────────

    /// Append a blank page and make it current. Returns a cursor at the top
    /// margin.
    pub fn add_page(&mut self, orientation: Orientation) -> PageCursor {
        let (width, height) = self.setup.size.oriented(orientation);
        self.pages.push(Page {
            width,
            height,
            orientation,
            ops: Vec::new(),
            regions: Vec::new(),
        });
        self.current = self.pages.len() - 1;
        PageCursor {
            y: self.setup.margin,
            page_index: self.current,
        }
    }

    /// Start a page, run `redraw` for its fixed content and remember the
    /// resulting cursor as the fresh top of that page.
    pub fn start_page<F>(&mut self, orientation: Orientation, mut redraw: F) -> PageCursor
    where
        F: FnMut(&mut Canvas, PageCursor) -> PageCursor,
    {
        let top = self.add_page(orientation);
        let cursor = redraw(self, top);
        self.fresh_top = Some(cursor);
        cursor
    }

    /// True when nothing has been placed below the page's fixed content.
    pub fn is_fresh(&self, cursor: PageCursor) -> bool {
        match self.fresh_top {
            Some(top) => top.page_index == cursor.page_index && cursor.y <= top.y + FRESH_EPSILON,
            None => false,
        }
    }

    /// Guarantee `needed` millimetres below `cursor` before `bottom_limit`.
    ///
    /// When the unit doesn't fit, a new page with the current page's
    /// orientation is started, `redraw` repaints its fixed content (page
    /// header, table header row) and the cursor below it is returned.
    /// A cursor already at the top of a fresh page is returned unchanged
    /// even if the unit is taller than the page, so this never produces an
    /// empty page.
    pub fn ensure_space<F>(
        &mut self,
        cursor: PageCursor,
        needed: f64,
        bottom_limit: f64,
        redraw: F,
    ) -> PageCursor
    where
        F: FnMut(&mut Canvas, PageCursor) -> PageCursor,
    {
        if cursor.y + needed <= bottom_limit || self.is_fresh(cursor) {
            return cursor;
        }
        log::debug!(
            "page break after page {} ({:.1}mm needed at y={:.1}mm, limit {:.1}mm)",
            cursor.page_index + 1,
            needed,
            cursor.y,
            bottom_limit
        );
        self.next_page(cursor, redraw)
    }

    /// Unconditionally continue on a new page with the orientation of the
    /// page `cursor` is on.
    pub fn next_page<F>(&mut self, cursor: PageCursor, redraw: F) -> PageCursor
    where
        F: FnMut(&mut Canvas, PageCursor) -> PageCursor,
    {
        let orientation = self
            .pages
            .get(cursor.page_index)
            .map(|p| p.orientation)
            .unwrap_or_default();
        self.start_page(orientation, redraw)
    }

    /// Lowest y content may reach on the current page.
    pub fn bottom_limit(&self) -> f64 {
        self.page_height() - self.setup.margin - self.setup.footer_reserve
    }

    pub fn page_width(&self) -> f64 {
        self.pages.get(self.current).map(|p| p.width).unwrap_or_else(|| {
            self.setup.size.dimensions().0
        })
    }

    pub fn page_height(&self) -> f64 {
        self.pages.get(self.current).map(|p| p.height).unwrap_or_else(|| {
            self.setup.size.dimensions().1
        })
    }

    /// Page width minus both side margins.
    pub fn content_width(&self) -> f64 {
        (self.page_width() - 2.0 * self.setup.margin).max(0.0)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    /// Make an existing page current, for second-pass stamping.
    pub fn select_page(&mut self, index: usize) {
        if index < self.pages.len() {
            self.current = index;
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    // ── Graphics state ─────────────────────────────────────────────

    pub fn state(&self) -> GraphicsState {
        self.state
    }

    pub fn set_font(&mut self, font: StandardFont, size: f64) {
        self.state.font = font;
        self.state.font_size = size;
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.state.text_color = color;
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    /// Run `f` and restore the graphics state afterwards.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        let saved = self.state;
        let result = f(self);
        self.state = saved;
        result
    }

    /// Metrics of the current font, for measuring and wrapping.
    pub fn metrics(&self) -> TextMetrics {
        TextMetrics::new(self.state.font, self.state.font_size)
    }

    pub fn text_width(&self, text: &str) -> f64 {
        self.metrics().text_width(text)
    }

    pub fn line_height(&self) -> f64 {
        self.metrics().line_height()
    }

    // ── Drawing ────────────────────────────────────────────────────

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.get_mut(self.current) {
            page.ops.push(op);
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: RectStyle) {
        let fill = matches!(style, RectStyle::Fill | RectStyle::FillStroke)
            .then_some(self.state.fill_color);
        let stroke = matches!(style, RectStyle::Stroke | RectStyle::FillStroke)
            .then_some((self.state.stroke_color, self.state.line_width));
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: self.state.stroke_color,
            width: self.state.line_width,
        });
    }

    /// Draw one line of text with its baseline at `y`.
    pub fn text(&mut self, x: f64, y: f64, text: &str) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font: self.state.font,
            size: self.state.font_size,
            color: self.state.text_color,
        });
    }

    /// Draw one line of text aligned inside `[x, x + width]`.
    pub fn text_aligned(&mut self, x: f64, y: f64, width: f64, text: &str, align: TextAlign) {
        let text_w = self.text_width(text);
        let x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x + (width - text_w) / 2.0,
            TextAlign::Right => x + width - text_w,
        };
        self.text(x, y, text);
    }

    /// Record the rectangle of a logical unit on the current page.
    pub fn mark(&mut self, kind: RegionKind, x: f64, y: f64, width: f64, height: f64) {
        if let Some(page) = self.pages.get_mut(self.current) {
            page.regions.push(Region {
                kind,
                x,
                y,
                width,
                height,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(PageSetup {
            size: PageSize::A4,
            margin: 15.0,
            footer_reserve: 10.0,
        })
    }

    fn no_redraw(_: &mut Canvas, c: PageCursor) -> PageCursor {
        c
    }

    #[test]
    fn ensure_space_keeps_cursor_when_unit_fits() {
        let mut c = canvas();
        let top = c.start_page(Orientation::Portrait, no_redraw);
        let cursor = top.advance(100.0);
        let after = c.ensure_space(cursor, 50.0, c.bottom_limit(), no_redraw);
        assert_eq!(after, cursor);
        assert_eq!(c.page_count(), 1);
    }

    #[test]
    fn ensure_space_breaks_and_redraws() {
        let mut c = canvas();
        let top = c.start_page(Orientation::Landscape, no_redraw);
        let cursor = top.advance(150.0);
        let limit = c.bottom_limit();
        let after = c.ensure_space(cursor, 40.0, limit, |canvas, cur| {
            canvas.mark(RegionKind::TableHeader, 15.0, cur.y, 10.0, 8.0);
            cur.advance(8.0)
        });
        assert_eq!(c.page_count(), 2);
        assert_eq!(after.page_index, 1);
        assert!((after.y - 23.0).abs() < 1e-9);
        assert_eq!(c.pages()[1].orientation, Orientation::Landscape);
        assert_eq!(c.pages()[1].regions.len(), 1);
    }

    #[test]
    fn fresh_page_never_breaks_again() {
        let mut c = canvas();
        let top = c.start_page(Orientation::Portrait, no_redraw);
        let limit = c.bottom_limit();
        let after = c.ensure_space(top, 10_000.0, limit, no_redraw);
        assert_eq!(after, top);
        assert_eq!(c.page_count(), 1);
    }

    #[test]
    fn scoped_restores_state() {
        let mut c = canvas();
        c.add_page(Orientation::Portrait);
        let before = c.state();
        c.scoped(|c| {
            c.set_font(StandardFont::HelveticaBold, 14.0);
            c.set_fill_color(Color::BLACK);
            c.text(20.0, 20.0, "inside");
        });
        assert_eq!(c.state(), before);
        match &c.pages()[0].ops[0] {
            DrawOp::Text { font, size, .. } => {
                assert_eq!(*font, StandardFont::HelveticaBold);
                assert_eq!(*size, 14.0);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn landscape_content_width() {
        let mut c = canvas();
        c.add_page(Orientation::Landscape);
        assert!((c.content_width() - 267.0).abs() < 1e-9);
        assert!((c.bottom_limit() - 185.0).abs() < 1e-9);
    }

    #[test]
    fn centered_text_is_offset() {
        let mut c = canvas();
        c.add_page(Orientation::Portrait);
        let w = c.text_width("OPEN");
        c.text_aligned(10.0, 10.0, 40.0, "OPEN", TextAlign::Center);
        match &c.pages()[0].ops[0] {
            DrawOp::Text { x, .. } => assert!((x - (10.0 + (40.0 - w) / 2.0)).abs() < 1e-9),
            other => panic!("unexpected op {other:?}"),
        }
    }
}
