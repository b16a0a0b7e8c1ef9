//! # Font Management
//!
//! Reports are set in the standard Helvetica faces, which every PDF viewer
//! ships and which need no embedding. Measurement uses the AFM widths in
//! [`metrics`], so wrapping decisions match what the viewer draws.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::layout::PT_PER_MM;
use crate::text::Measure;

/// The standard PDF fonts the engine draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    /// Every face, in resource order (`/F1`..`/F4`).
    pub const ALL: [StandardFont; 4] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
    ];

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Resource name used inside content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "F1",
            Self::HelveticaBold => "F2",
            Self::HelveticaOblique => "F3",
            Self::HelveticaBoldOblique => "F4",
        }
    }

    /// Oblique faces reuse the upright widths.
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, Self::HelveticaBold | Self::HelveticaBoldOblique)
    }
}

/// A font at a size. Measures text in millimetres.
///
/// This is the "current font" a caller captures from the canvas before
/// wrapping or measuring; it is a plain value, so the canvas can keep
/// changing state while lines are produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub font: StandardFont,
    /// Size in points.
    pub size: f64,
}

impl TextMetrics {
    pub fn new(font: StandardFont, size: f64) -> Self {
        Self { font, size }
    }

    /// Width of `text` in millimetres.
    pub fn text_width(&self, text: &str) -> f64 {
        self.font.metrics().measure_string(text, self.size, 0.0) / PT_PER_MM
    }

    /// Baseline-to-baseline distance in millimetres.
    pub fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT_FACTOR / PT_PER_MM
    }
}

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

impl Measure for TextMetrics {
    fn width(&self, text: &str) -> f64 {
        self.text_width(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_in_millimetres() {
        let m = TextMetrics::new(StandardFont::Helvetica, 10.0);
        // 10 spaces at 10pt = 27.8pt
        let w = m.text_width("          ");
        assert!((w - 27.8 / PT_PER_MM).abs() < 1e-9);
    }

    #[test]
    fn oblique_shares_upright_widths() {
        let upright = TextMetrics::new(StandardFont::Helvetica, 9.0);
        let oblique = TextMetrics::new(StandardFont::HelveticaOblique, 9.0);
        assert_eq!(upright.text_width("Audit"), oblique.text_width("Audit"));
    }

    #[test]
    fn line_height_scales_with_size() {
        let small = TextMetrics::new(StandardFont::Helvetica, 8.0);
        let large = TextMetrics::new(StandardFont::Helvetica, 16.0);
        assert!((large.line_height() - 2.0 * small.line_height()).abs() < 1e-9);
    }
}
