//! Text layout reconstruction: pdfium glyphs → text lines.
//!
//! pdfium hands out characters with their bounding boxes but no notion of
//! lines or words. Lines are rebuilt by clustering glyphs on their top edge,
//! and spaces are inserted where the horizontal gap between two glyphs is
//! wider than a fraction of the typical glyph height. Both tolerances are
//! derived from the median glyph height of the page so that small print and
//! large slides are handled alike.
//!
//! Coordinates are PDF user space: the origin is bottom-left, so a larger
//! `top` means higher on the page.

use pdfium_render::prelude::*;
use std::cmp::Ordering;

/// Fallback tolerances when a page has no usable glyph heights.
const DEFAULT_LINE_TOLERANCE: f32 = 5.0;
const DEFAULT_WORD_GAP: f32 = 10.0;

/// A single character with its position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub ch: char,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub top: f32,
    pub width: f32,
    /// Glyph box height, used as a font-size proxy.
    pub height: f32,
}

/// A reconstructed line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Top edge of the highest glyph.
    pub top: f32,
    pub left: f32,
    pub right: f32,
    /// Mean glyph height.
    pub height: f32,
}

/// Per-page clustering thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Max difference of top edges for two glyphs to share a line.
    pub line_tolerance: f32,
    /// Min horizontal gap that becomes a space.
    pub word_gap: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            word_gap: DEFAULT_WORD_GAP,
        }
    }
}

/// pdfium reports a hyphen generated at a line break as U+0002.
fn soft_hyphen(ch: char) -> char {
    if ch == '\u{2}' {
        '\u{AD}'
    } else {
        ch
    }
}

/// Collect every positioned, printable character of a page's text layer.
pub fn collect_glyphs(text: &PdfPageText) -> Vec<Glyph> {
    let mut glyphs = Vec::new();

    for segment in text.segments().iter() {
        let Ok(chars) = segment.chars() else {
            continue;
        };
        for char_result in chars.iter() {
            let Some(ch) = char_result.unicode_char().map(soft_hyphen) else {
                continue;
            };
            if ch.is_control() {
                continue;
            }
            if let Ok(bounds) = char_result.loose_bounds() {
                glyphs.push(Glyph {
                    ch,
                    x: bounds.left().value,
                    top: bounds.top().value,
                    width: bounds.width().value,
                    height: bounds.height().value,
                });
            }
        }
    }

    glyphs
}

/// Median of the positive values, if any.
pub fn median(values: impl IntoIterator<Item = f32>) -> Option<f32> {
    let mut v: Vec<f32> = values.into_iter().filter(|h| *h > 0.0).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(v[v.len() / 2])
}

/// Derive thresholds from the median glyph height.
///
/// Line tolerance is 40 % of the median height (floor 2 pt), the word gap
/// 30 % (floor 3 pt).
pub fn thresholds(glyphs: &[Glyph]) -> Thresholds {
    let Some(median_height) = median(glyphs.iter().filter(|g| !g.ch.is_whitespace()).map(|g| g.height))
    else {
        return Thresholds::default();
    };

    Thresholds {
        line_tolerance: (median_height * 0.4).max(2.0),
        word_gap: (median_height * 0.3).max(3.0),
    }
}

/// Group glyphs into lines ordered top-to-bottom, each read left-to-right.
pub fn group_lines(mut glyphs: Vec<Glyph>, t: Thresholds) -> Vec<TextLine> {
    if glyphs.is_empty() {
        return Vec::new();
    }

    glyphs.sort_by(|a, b| match b.top.partial_cmp(&a.top).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal),
        other => other,
    });

    let mut lines = Vec::new();
    let mut current: Vec<Glyph> = Vec::new();
    let mut anchor: Option<f32> = None;

    for glyph in glyphs {
        match anchor {
            Some(top) if (top - glyph.top).abs() <= t.line_tolerance => current.push(glyph),
            _ => {
                if let Some(line) = build_line(std::mem::take(&mut current), t.word_gap) {
                    lines.push(line);
                }
                anchor = Some(glyph.top);
                current.push(glyph);
            }
        }
    }
    if let Some(line) = build_line(current, t.word_gap) {
        lines.push(line);
    }

    lines
}

/// Assemble one line; returns `None` when it holds only whitespace.
fn build_line(mut glyphs: Vec<Glyph>, word_gap: f32) -> Option<TextLine> {
    glyphs.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

    let mut text = String::with_capacity(glyphs.len() + 8);
    let mut prev_right: Option<f32> = None;
    for g in &glyphs {
        if g.ch.is_whitespace() {
            if !text.ends_with(' ') && !text.is_empty() {
                text.push(' ');
            }
        } else {
            if let Some(right) = prev_right {
                if g.x - right > word_gap && !text.ends_with(' ') {
                    text.push(' ');
                }
            }
            text.push(g.ch);
        }
        prev_right = Some(g.x + g.width);
    }

    let text = text.trim().to_string();
    if text.is_empty() {
        return None;
    }

    let visible: Vec<&Glyph> = glyphs.iter().filter(|g| !g.ch.is_whitespace()).collect();
    let height = visible.iter().map(|g| g.height).sum::<f32>() / visible.len() as f32;
    let top = visible.iter().map(|g| g.top).fold(f32::MIN, f32::max);
    let left = visible.iter().map(|g| g.x).fold(f32::MAX, f32::min);
    let right = visible.iter().map(|g| g.x + g.width).fold(f32::MIN, f32::max);

    Some(TextLine {
        text,
        top,
        left,
        right,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lay out `text` as fixed-pitch glyphs starting at `x`.
    fn word(text: &str, x: f32, top: f32, size: f32) -> Vec<Glyph> {
        let advance = size * 0.5;
        text.chars()
            .enumerate()
            .map(|(i, ch)| Glyph {
                ch,
                x: x + i as f32 * advance,
                top,
                width: advance * 0.9,
                height: size,
            })
            .collect()
    }

    #[test]
    fn line_break_hyphen_becomes_soft() {
        assert_eq!(soft_hyphen('\u{2}'), '\u{AD}');
        assert_eq!(soft_hyphen('-'), '-');
        assert!(!soft_hyphen('\u{2}').is_control());
    }

    #[test]
    fn thresholds_scale_with_font() {
        let t = thresholds(&word("hello", 0.0, 700.0, 10.0));
        assert!((t.line_tolerance - 4.0).abs() < 1e-4);
        assert!((t.word_gap - 3.0).abs() < 1e-4);

        let t = thresholds(&word("big", 0.0, 700.0, 40.0));
        assert!((t.line_tolerance - 16.0).abs() < 1e-4);
        assert!((t.word_gap - 12.0).abs() < 1e-4);
    }

    #[test]
    fn empty_page_uses_defaults() {
        assert_eq!(thresholds(&[]), Thresholds::default());
        assert!(group_lines(Vec::new(), Thresholds::default()).is_empty());
    }

    #[test]
    fn lines_are_ordered_top_to_bottom() {
        let mut glyphs = word("second", 72.0, 680.0, 10.0);
        glyphs.extend(word("first", 72.0, 700.0, 10.0));
        let lines = group_lines(glyphs.clone(), thresholds(&glyphs));
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn gap_between_words_becomes_space() {
        let mut glyphs = word("Hello", 72.0, 700.0, 10.0);
        glyphs.extend(word("world", 110.0, 700.0, 10.0));
        let lines = group_lines(glyphs.clone(), thresholds(&glyphs));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello world");
        assert!((lines[0].left - 72.0).abs() < 1e-4);
        assert!((lines[0].height - 10.0).abs() < 1e-4);
    }

    #[test]
    fn slight_baseline_jitter_stays_on_one_line() {
        let mut glyphs = word("x", 72.0, 700.0, 10.0);
        glyphs.extend(word("2", 77.0, 702.5, 6.0));
        let lines = group_lines(glyphs.clone(), thresholds(&glyphs));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "x2");
    }

    #[test]
    fn explicit_spaces_are_collapsed() {
        let glyphs = word("a   b", 72.0, 700.0, 10.0);
        let lines = group_lines(glyphs.clone(), thresholds(&glyphs));
        assert_eq!(lines[0].text, "a b");
    }

    #[test]
    fn whitespace_only_line_is_dropped() {
        let glyphs = word("   ", 72.0, 700.0, 10.0);
        assert!(group_lines(glyphs, Thresholds::default()).is_empty());
    }

    #[test]
    fn median_ignores_non_positive() {
        assert_eq!(median([0.0, -1.0]), None);
        assert_eq!(median([3.0, 1.0, 2.0, 0.0]), Some(2.0));
    }
}
