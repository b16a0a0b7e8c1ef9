//! Advance widths for the standard Helvetica faces, in 1/1000 em.
//!
//! Values come from the Adobe Core14 AFM files. Only printable ASCII is
//! tabulated; Latin-1 letters with diacritics share the width of their
//! base letter, which holds for every accented glyph in these faces except
//! the dotless-i family handled explicitly below.

/// Width table for one standard font.
#[derive(Debug)]
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E.
    ascii: [u16; 95],
    /// Width used for anything not otherwise known.
    default_width: u16,
    bold: bool,
}

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
        278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
        278, 278, 278, 469, 556, 333, // '['..'`'
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
        334, 260, 334, 584, // '{'..'~'
    ],
    default_width: 556,
    bold: false,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
        333, 333, 584, 584, 584, 611, 975, // ':'..'@'
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
        333, 278, 333, 584, 556, 333, // '['..'`'
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
        389, 280, 389, 584, // '{'..'~'
    ],
    default_width: 611,
    bold: true,
};

impl StandardFontMetrics {
    /// Advance width of `ch` in 1/1000 em.
    pub fn glyph_width(&self, ch: char) -> u16 {
        if let Some(w) = self.ascii_width(ch) {
            return w;
        }
        if let Some(w) = self.special_width(ch) {
            return w;
        }
        match base_letter(ch).and_then(|b| self.ascii_width(b)) {
            Some(w) => w,
            None => self.default_width,
        }
    }

    /// Width of a single character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.glyph_width(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }

    fn ascii_width(&self, ch: char) -> Option<u16> {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            Some(self.ascii[(code - 0x20) as usize])
        } else {
            None
        }
    }

    fn special_width(&self, ch: char) -> Option<u16> {
        let (regular, bold) = match ch {
            '\u{00A0}' => (278, 278),
            '\u{00A7}' => (556, 556),
            '\u{00A9}' | '\u{00AE}' => (737, 737),
            '\u{00AA}' => (370, 370),
            '\u{00AB}' | '\u{00BB}' => (556, 556),
            '\u{00B0}' => (400, 400),
            '\u{00B1}' | '\u{00D7}' | '\u{00F7}' => (584, 584),
            '\u{00B7}' => (278, 278),
            '\u{00BA}' => (365, 365),
            '\u{00C6}' => (1000, 1000),
            '\u{00E6}' => (889, 889),
            '\u{00D0}' => (722, 722),
            '\u{00DE}' => (667, 667),
            '\u{00DF}' => (611, 611),
            '\u{00EC}'..='\u{00EF}' => (278, 278),
            '\u{2013}' | '\u{20AC}' => (556, 556),
            '\u{2014}' | '\u{2026}' => (1000, 1000),
            '\u{2018}' | '\u{2019}' => (222, 278),
            '\u{201C}' | '\u{201D}' => (333, 500),
            '\u{2022}' => (350, 350),
            _ => return None,
        };
        Some(if self.bold { bold } else { regular })
    }
}

/// The unaccented letter sharing a Latin-1 letter's advance width.
fn base_letter(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_width_matches_afm() {
        let w = HELVETICA.char_width(' ', 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn bold_is_wider() {
        assert!(HELVETICA_BOLD.glyph_width('b') > HELVETICA.glyph_width('b'));
        assert!(
            HELVETICA_BOLD.measure_string("Corrective", 10.0, 0.0)
                > HELVETICA.measure_string("Corrective", 10.0, 0.0)
        );
    }

    #[test]
    fn accented_letters_use_base_width() {
        assert_eq!(HELVETICA.glyph_width('ã'), HELVETICA.glyph_width('a'));
        assert_eq!(HELVETICA.glyph_width('Ç'), HELVETICA.glyph_width('C'));
        assert_eq!(HELVETICA.glyph_width('í'), 278);
    }

    #[test]
    fn unknown_chars_fall_back_to_default() {
        assert_eq!(HELVETICA.glyph_width('中'), 556);
    }
}
