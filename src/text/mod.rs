//! # Text Wrapping
//!
//! Greedy word wrapping against a width measured with the current font.
//!
//! [`wrap`] returns a [`WrappedLines`] iterator: lines are produced on demand,
//! the sequence is always finite, and cloning the iterator restarts nothing
//! but continues from the same point, so callers that need the line count
//! and the lines (row height, then drawing) can clone before consuming.
//!
//! Rules:
//! - empty text yields exactly one empty line, so rows keep their height;
//! - a paragraph that fits is returned verbatim;
//! - otherwise words are accumulated while the line stays within the width;
//! - a word wider than 90% of the width is broken at `/ - – — ( )` first
//!   and then between characters;
//! - a non-positive width puts every character on its own line.

use std::collections::VecDeque;

/// Words wider than this fraction of the line width are broken up.
pub const LONG_WORD_RATIO: f64 = 0.9;

/// Something that knows how wide a string is, in layout units.
pub trait Measure {
    fn width(&self, text: &str) -> f64;
}

impl<F: Fn(&str) -> f64> Measure for F {
    fn width(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Tuning for the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    /// Break long words at punctuation before falling back to characters.
    pub break_at_punctuation: bool,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            break_at_punctuation: true,
        }
    }
}

/// Wrap `text` to `max_width` with default options.
pub fn wrap<'a, M: Measure + ?Sized>(
    text: &'a str,
    max_width: f64,
    measure: &'a M,
) -> WrappedLines<'a, M> {
    wrap_with(text, max_width, measure, WrapOptions::default())
}

/// Wrap `text` to `max_width`.
pub fn wrap_with<'a, M: Measure + ?Sized>(
    text: &'a str,
    max_width: f64,
    measure: &'a M,
    options: WrapOptions,
) -> WrappedLines<'a, M> {
    let max_width = if max_width.is_nan() || max_width <= 0.0 {
        0.0
    } else {
        max_width
    };
    WrappedLines {
        measure,
        max_width,
        options,
        paragraphs: text.split('\n'),
        words: None,
        current: String::new(),
        pending: VecDeque::new(),
        finished: false,
    }
}

/// Collect the wrapped lines of `text`.
pub fn wrap_lines<M: Measure + ?Sized>(
    text: &str,
    max_width: f64,
    measure: &M,
    options: WrapOptions,
) -> Vec<String> {
    wrap_with(text, max_width, measure, options).collect()
}

/// Lazily produced wrapped lines.
pub struct WrappedLines<'a, M: ?Sized> {
    measure: &'a M,
    max_width: f64,
    options: WrapOptions,
    paragraphs: std::str::Split<'a, char>,
    words: Option<std::str::SplitWhitespace<'a>>,
    current: String,
    pending: VecDeque<String>,
    finished: bool,
}

impl<M: ?Sized> Clone for WrappedLines<'_, M> {
    fn clone(&self) -> Self {
        Self {
            measure: self.measure,
            max_width: self.max_width,
            options: self.options,
            paragraphs: self.paragraphs.clone(),
            words: self.words.clone(),
            current: self.current.clone(),
            pending: self.pending.clone(),
            finished: self.finished,
        }
    }
}

impl<'a, M: Measure + ?Sized> Iterator for WrappedLines<'a, M> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }
            if self.finished {
                return None;
            }

            let next_word = match self.words.as_mut() {
                Some(words) => words.next(),
                None => {
                    self.start_paragraph();
                    continue;
                }
            };

            match next_word {
                Some(word) => self.place_word(word),
                None => {
                    // End of paragraph: the open line is always emitted,
                    // even when empty.
                    self.words = None;
                    self.pending.push_back(std::mem::take(&mut self.current));
                }
            }
        }
    }
}

impl<'a, M: Measure + ?Sized> WrappedLines<'a, M> {
    fn start_paragraph(&mut self) {
        let Some(paragraph) = self.paragraphs.next() else {
            self.finished = true;
            return;
        };
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        if self.measure.width(paragraph) <= self.max_width {
            self.pending.push_back(paragraph.to_string());
        } else {
            self.words = Some(paragraph.split_whitespace());
        }
    }

    fn place_word(&mut self, word: &str) {
        if self.measure.width(word) > LONG_WORD_RATIO * self.max_width {
            if !self.current.is_empty() {
                self.pending.push_back(std::mem::take(&mut self.current));
            }
            let mut pieces = break_long_word(word, self.max_width, self.measure, self.options);
            self.current = pieces.pop().unwrap_or_default();
            self.pending.extend(pieces);
            return;
        }

        if self.current.is_empty() {
            self.current.push_str(word);
            return;
        }

        let candidate = format!("{} {}", self.current, word);
        if self.measure.width(&candidate) <= self.max_width {
            self.current = candidate;
        } else {
            let done = std::mem::replace(&mut self.current, word.to_string());
            self.pending.push_back(done);
        }
    }
}

/// Split an unbreakable token into lines no wider than `max_width`.
///
/// Single characters wider than `max_width` still get a line of their own.
fn break_long_word<M: Measure + ?Sized>(
    word: &str,
    max_width: f64,
    measure: &M,
    options: WrapOptions,
) -> Vec<String> {
    let segments = if options.break_at_punctuation {
        punctuation_segments(word)
    } else {
        vec![word]
    };

    let mut lines = Vec::new();
    let mut line = String::new();

    for segment in segments {
        if !line.is_empty() {
            let candidate = format!("{}{}", line, segment);
            if measure.width(&candidate) <= max_width {
                line = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut line));
        }

        if measure.width(segment) <= max_width {
            line.push_str(segment);
            continue;
        }

        for ch in segment.chars() {
            let had_content = !line.is_empty();
            line.push(ch);
            if had_content && measure.width(&line) > max_width {
                line.pop();
                lines.push(std::mem::take(&mut line));
                line.push(ch);
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Cut a token after `/ - – — )` and before `(`.
fn punctuation_segments(word: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, ch) in word.char_indices() {
        match ch {
            '(' if i > start => {
                segments.push(&word[start..i]);
                start = i;
            }
            '/' | '-' | '\u{2013}' | '\u{2014}' | ')' => {
                let end = i + ch.len_utf8();
                segments.push(&word[start..end]);
                start = end;
            }
            _ => {}
        }
    }
    if start < word.len() {
        segments.push(&word[start..]);
    }
    segments
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`.
pub fn fit_with_ellipsis<M: Measure + ?Sized>(text: &str, max_width: f64, measure: &M) -> String {
    if measure.width(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.trim_end().chars().collect();
    while !chars.is_empty() {
        let candidate: String = chars.iter().collect::<String>() + "\u{2026}";
        if measure.width(&candidate) <= max_width {
            return candidate;
        }
        chars.pop();
    }
    "\u{2026}".to_string()
}

/// Keep at most `max_lines` lines, ending the last kept one with an
/// ellipsis. Returns true when lines were dropped.
pub fn truncate_lines<M: Measure + ?Sized>(
    lines: &mut Vec<String>,
    max_lines: usize,
    max_width: f64,
    measure: &M,
) -> bool {
    if lines.len() <= max_lines {
        return false;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let forced = format!("{}\u{2026}", last.trim_end());
        *last = fit_with_ellipsis(&forced, max_width, measure);
    }
    true
}
