//! # Style
//!
//! Colors, the report palette, and the graphics state that draw commands
//! are stamped with. The graphics state only changes through `Canvas`
//! setters; renderers that touch it run inside `Canvas::scoped` so it is
//! restored when they return.

use serde::{Deserialize, Serialize};

use crate::font::StandardFont;

/// An RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Build from 0-255 channel values.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Parse `#RRGGBB` or `RRGGBB`. Returns None for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_u8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Mix toward white. `amount` 0.0 keeps the color, 1.0 yields white.
    pub fn lighten(&self, amount: f64) -> Self {
        let t = amount.clamp(0.0, 1.0);
        Self {
            r: self.r + (1.0 - self.r) * t,
            g: self.g + (1.0 - self.g) * t,
            b: self.b + (1.0 - self.b) * t,
        }
    }
}

/// Horizontal alignment of a text run inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// The colors every report is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Header band, table header row, section banners.
    pub brand: Color,
    /// Text drawn on top of `brand`.
    pub on_brand: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    /// Background of odd table rows.
    pub zebra: Color,
    /// Background of info and metadata boxes.
    pub panel: Color,
}

impl Theme {
    pub fn with_brand(brand: Color) -> Self {
        Self {
            brand,
            on_brand: Color::WHITE,
            text: Color::from_u8(33, 37, 41),
            muted: Color::from_u8(108, 117, 125),
            border: Color::from_u8(206, 212, 218),
            zebra: brand.lighten(0.92),
            panel: Color::from_u8(248, 249, 250),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::with_brand(Color::from_u8(0x1F, 0x4E, 0x79))
    }
}

/// The mutable drawing state captured by each draw command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsState {
    pub font: StandardFont,
    /// Font size in points.
    pub font_size: f64,
    pub text_color: Color,
    pub fill_color: Color,
    pub stroke_color: Color,
    /// Stroke width in millimetres.
    pub line_width: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            font: StandardFont::Helvetica,
            font_size: 10.0,
            text_color: Color::BLACK,
            fill_color: Color::WHITE,
            stroke_color: Color::BLACK,
            line_width: 0.2,
        }
    }
}
