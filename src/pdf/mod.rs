//! # PDF Serializer
//!
//! Takes the drawn pages from the canvas and writes a PDF 1.7 file.
//!
//! The writer is self-contained: the four Helvetica faces are referenced as
//! standard Type1 fonts (no embedding), content streams are Flate
//! compressed, and text is encoded as WinAnsi.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog
//! 2 0 obj ... endobj  <- page tree
//! 3..6                <- fonts F1..F4
//! ...                 <- content stream + page object per page, info
//! xref                <- byte offsets of each object
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use chrono::NaiveDateTime;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::PdfError;
use crate::font::StandardFont;
use crate::layout::{DrawOp, Page, PT_PER_MM};
use crate::style::Color;

/// Document information dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub created: Option<NaiveDateTime>,
}

#[derive(Debug, Default)]
pub struct PdfWriter;

/// Objects allocated while writing; index == object number.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write drawn pages to a PDF byte vector.
    pub fn write(&self, pages: &[Page], info: &DocumentInfo) -> Result<Vec<u8>, PdfError> {
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }
        for (i, page) in pages.iter().enumerate() {
            check_page(page, i + 1)?;
        }

        // 0 = placeholder (objects are 1-indexed), 1 = Catalog, 2 = Pages
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
        };

        let font_ids: Vec<usize> = StandardFont::ALL
            .iter()
            .map(|font| {
                builder.push(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    )
                    .into_bytes(),
                )
            })
            .collect();
        let font_resources: String = StandardFont::ALL
            .iter()
            .zip(&font_ids)
            .map(|(font, id)| format!("/{} {} 0 R", font.resource_name(), id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let content = build_content_stream(page);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let mut stream: Vec<u8> = Vec::new();
            let _ = write!(
                stream,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            stream.extend_from_slice(&compressed);
            stream.extend_from_slice(b"\nendstream");
            let content_id = builder.push(stream);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width * PT_PER_MM,
                page.height * PT_PER_MM,
                content_id,
                font_resources
            );
            page_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] =
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()).into_bytes();

        let info_id = builder.push(info_dictionary(info).into_bytes());

        Ok(serialize(&builder, info_id))
    }
}

fn check_page(page: &Page, number: usize) -> Result<(), PdfError> {
    let finite = |what: &'static str, values: &[f64]| {
        if values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(PdfError::NonFinite { what, page: number })
        }
    };
    finite("page size", &[page.width, page.height])?;
    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                ..
            } => finite("rectangle", &[*x, *y, *width, *height])?,
            DrawOp::Line { x1, y1, x2, y2, width, .. } => {
                finite("line", &[*x1, *y1, *x2, *y2, *width])?
            }
            DrawOp::Text { x, y, size, .. } => finite("text position", &[*x, *y, *size])?,
        }
    }
    Ok(())
}

fn info_dictionary(info: &DocumentInfo) -> String {
    let mut dict = String::from("<< ");
    if let Some(title) = &info.title {
        let _ = write!(dict, "/Title ({}) ", encode_text(title));
    }
    if let Some(author) = &info.author {
        let _ = write!(dict, "/Author ({}) ", encode_text(author));
    }
    if let Some(subject) = &info.subject {
        let _ = write!(dict, "/Subject ({}) ", encode_text(subject));
    }
    if let Some(created) = &info.created {
        let _ = write!(dict, "/CreationDate (D:{}) ", created.format("%Y%m%d%H%M%S"));
    }
    dict.push_str("/Producer (qms-report) /Creator (qms-report) >>");
    dict
}

/// Build the content stream for one page. Layout is top-left origin in
/// millimetres; PDF is bottom-left origin in points.
fn build_content_stream(page: &Page) -> String {
    let mut stream = String::new();
    let k = PT_PER_MM;
    let page_h = page.height * k;

    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let (px, py, pw, ph) = (x * k, page_h - (y + height) * k, width * k, height * k);
                stream.push_str("q\n");
                if let Some(c) = fill {
                    write_color(&mut stream, c, "rg");
                }
                if let Some((c, w)) = stroke {
                    write_color(&mut stream, c, "RG");
                    let _ = writeln!(stream, "{:.2} w", w * k);
                }
                let paint = match (fill.is_some(), stroke.is_some()) {
                    (true, true) => "B",
                    (true, false) => "f",
                    (false, true) => "S",
                    (false, false) => "n",
                };
                let _ = write!(stream, "{:.2} {:.2} {:.2} {:.2} re\n{}\nQ\n", px, py, pw, ph, paint);
            }

            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                stream.push_str("q\n");
                write_color(&mut stream, color, "RG");
                let _ = write!(
                    stream,
                    "{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    width * k,
                    x1 * k,
                    page_h - y1 * k,
                    x2 * k,
                    page_h - y2 * k
                );
            }

            DrawOp::Text {
                x,
                y,
                text,
                font,
                size,
                color,
            } => {
                stream.push_str("BT\n");
                write_color(&mut stream, color, "rg");
                let _ = write!(
                    stream,
                    "/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                    font.resource_name(),
                    size,
                    x * k,
                    page_h - y * k,
                    encode_text(text)
                );
            }
        }
    }

    stream
}

fn write_color(stream: &mut String, c: &Color, op: &str) {
    let _ = writeln!(stream, "{:.3} {:.3} {:.3} {}", c.r, c.g, c.b, op);
}

/// Encode text for a PDF literal string: WinAnsi bytes, with delimiters
/// escaped and bytes above 0x7E written as octal escapes.
fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        let byte = unicode_to_winansi(ch).unwrap_or(b'?');
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

/// Map a character to its WinAnsiEncoding byte.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E => Some(code as u8),
        0xA0..=0xFF => Some(code as u8),
        0x09 => Some(b' '),
        _ => match ch {
            '\u{20AC}' => Some(0x80),
            '\u{201A}' => Some(0x82),
            '\u{0192}' => Some(0x83),
            '\u{201E}' => Some(0x84),
            '\u{2026}' => Some(0x85),
            '\u{2020}' => Some(0x86),
            '\u{2021}' => Some(0x87),
            '\u{02C6}' => Some(0x88),
            '\u{2030}' => Some(0x89),
            '\u{0160}' => Some(0x8A),
            '\u{2039}' => Some(0x8B),
            '\u{0152}' => Some(0x8C),
            '\u{017D}' => Some(0x8E),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '\u{2022}' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            '\u{02DC}' => Some(0x98),
            '\u{2122}' => Some(0x99),
            '\u{0161}' => Some(0x9A),
            '\u{203A}' => Some(0x9B),
            '\u{0153}' => Some(0x9C),
            '\u{017E}' => Some(0x9E),
            '\u{0178}' => Some(0x9F),
            _ => None,
        },
    }
}

/// Serialize all objects into the final PDF byte stream.
fn serialize(builder: &PdfBuilder, info_id: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, data) in builder.objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{} 0 obj\n", i);
        output.extend_from_slice(data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        builder.objects.len(),
        info_id,
        xref_offset
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Orientation;

    fn blank_page() -> Page {
        Page {
            width: 210.0,
            height: 297.0,
            orientation: Orientation::Portrait,
            ops: vec![],
            regions: vec![],
        }
    }

    #[test]
    fn escapes_delimiters() {
        assert_eq!(encode_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(encode_text("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn encodes_latin1_as_octal() {
        assert_eq!(encode_text("Ação"), "A\\347\\343o");
        assert_eq!(encode_text("\u{2026}"), "\\205");
        assert_eq!(encode_text("中"), "?");
    }

    #[test]
    fn empty_page_produces_valid_pdf() {
        let bytes = PdfWriter::new()
            .write(&[blank_page()], &DocumentInfo::default())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
    }

    #[test]
    fn page_size_is_in_points() {
        let bytes = PdfWriter::new()
            .write(&[blank_page()], &DocumentInfo::default())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/MediaBox [0 0 595.28 841.89]"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn metadata_in_info_dictionary() {
        let info = DocumentInfo {
            title: Some("Audit Schedule".to_string()),
            author: Some("QMS".to_string()),
            subject: None,
            created: chrono::NaiveDate::from_ymd_opt(2026, 1, 2)
                .and_then(|d| d.and_hms_opt(3, 4, 5)),
        };
        let bytes = PdfWriter::new().write(&[blank_page()], &info).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Audit Schedule)"));
        assert!(text.contains("/Author (QMS)"));
        assert!(text.contains("/CreationDate (D:20260102030405)"));
    }

    #[test]
    fn no_pages_is_an_error() {
        let err = PdfWriter::new().write(&[], &DocumentInfo::default());
        assert_eq!(err, Err(PdfError::NoPages));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let mut page = blank_page();
        page.ops.push(DrawOp::Text {
            x: f64::NAN,
            y: 10.0,
            text: "x".to_string(),
            font: StandardFont::Helvetica,
            size: 9.0,
            color: Color::BLACK,
        });
        let err = PdfWriter::new().write(&[blank_page(), page], &DocumentInfo::default());
        assert_eq!(
            err,
            Err(PdfError::NonFinite {
                what: "text position",
                page: 2
            })
        );
    }
}
