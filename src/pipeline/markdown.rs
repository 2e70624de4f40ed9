//! Markdown reconstruction from laid-out lines.
//!
//! Each page becomes a sequence of [`Element`]s (text lines and placed
//! images) sorted top-to-bottom, which are folded into [`Block`]s:
//!
//! - **Heading**: the line's glyph height is at least 1.2× the document's
//!   body height; the ratio picks the level.
//! - **List item**: the line starts with a bullet glyph or `N.` / `N)`.
//! - **Paragraph**: consecutive lines, broken where the vertical gap is
//!   larger than 1.5× the line height.
//! - **Image**: a `![](path)` reference at the image's position.

use crate::pipeline::layout::TextLine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Gap (in line heights) above which a new paragraph starts.
const PARAGRAPH_GAP_RATIO: f32 = 1.5;

/// Headings longer than this are treated as emphasised body text.
const MAX_HEADING_CHARS: usize = 120;

/// `(minimum height ratio, level)`, checked in order.
const HEADING_LEVELS: [(f32, u8); 4] = [(2.0, 1), (1.6, 2), (1.35, 3), (1.2, 4)];

static RE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[•◦▪▫‣●○■□►▸·]\s*|[\-\*–]\s+)(\S.*)$").unwrap());

static RE_NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3}|[a-zA-Z])([.)])\s+(\S.*)$").unwrap());

/// Something placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Line(TextLine),
    Image { top: f32, reference: String },
}

impl Element {
    fn top(&self) -> f32 {
        match self {
            Element::Line(line) => line.top,
            Element::Image { top, .. } => *top,
        }
    }
}

/// A Markdown block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    /// `marker` is `-` for bullets or the original `N.` / `N)` numbering.
    ListItem { marker: String, text: String },
    Paragraph(String),
    Image(String),
}

/// Body text height of the document: the most frequent line height, rounded
/// to half a point. Ties go to the smaller height.
pub fn body_height<'a>(lines: impl IntoIterator<Item = &'a TextLine>) -> Option<f32> {
    let mut weights: HashMap<i32, usize> = HashMap::new();
    for line in lines {
        if line.height > 0.0 {
            let bucket = (line.height * 2.0).round() as i32;
            *weights.entry(bucket).or_default() += line.text.chars().count();
        }
    }
    weights
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(bucket, _)| bucket as f32 / 2.0)
}

/// Heading level for a line of the given height, if it is one.
pub fn heading_level(height: f32, body: f32) -> Option<u8> {
    if body <= 0.0 {
        return None;
    }
    let ratio = height / body;
    HEADING_LEVELS
        .iter()
        .find(|(min, _)| ratio >= *min)
        .map(|(_, level)| *level)
}

/// Split a list marker off the start of a line.
fn list_marker(text: &str) -> Option<(String, String)> {
    if let Some(caps) = RE_BULLET.captures(text) {
        return Some(("-".to_string(), caps[1].to_string()));
    }
    RE_NUMBERED
        .captures(text)
        .map(|caps| (format!("{}{}", &caps[1], &caps[2]), caps[3].to_string()))
}

/// Soft hyphen: marks a break opportunity, not part of the word.
const SOFT_HYPHEN: char = '\u{AD}';

/// Append `next` to `text`, re-joining words broken across lines.
///
/// A soft hyphen at the line end is dropped. A hard hyphen before a
/// lowercase word is kept (`well-` + `known`) with no space inserted.
fn join_line(text: &mut String, next: &str) {
    if text.ends_with(SOFT_HYPHEN) {
        text.pop();
    } else {
        let compound = text.ends_with('-')
            && !text.ends_with(" -")
            && next.chars().next().is_some_and(char::is_lowercase);
        if !compound && !text.is_empty() {
            text.push(' ');
        }
    }
    text.push_str(next);
}

/// Fold one page's elements into blocks.
pub fn build_blocks(mut elements: Vec<Element>, body: Option<f32>) -> Vec<Block> {
    elements.sort_by(|a, b| b.top().partial_cmp(&a.top()).unwrap_or(Ordering::Equal));

    let mut blocks: Vec<Block> = Vec::new();
    // Previous text line, for gap measurement; reset by images.
    let mut prev: Option<TextLine> = None;

    for element in elements {
        let line = match element {
            Element::Image { reference, .. } => {
                blocks.push(Block::Image(reference));
                prev = None;
                continue;
            }
            Element::Line(line) => line,
        };

        let gap_is_small = prev.as_ref().is_some_and(|p| {
            let gap = p.top - line.top;
            gap <= p.height.max(line.height) * PARAGRAPH_GAP_RATIO
        });

        let level = body
            .and_then(|b| heading_level(line.height, b))
            .filter(|_| line.text.chars().count() <= MAX_HEADING_CHARS);

        if let Some(level) = level {
            match blocks.last_mut() {
                Some(Block::Heading { level: l, text }) if *l == level && gap_is_small => {
                    join_line(text, &line.text);
                }
                _ => blocks.push(Block::Heading {
                    level,
                    text: line.text.clone(),
                }),
            }
        } else if let Some((marker, text)) = list_marker(&line.text) {
            blocks.push(Block::ListItem { marker, text });
        } else {
            match blocks.last_mut() {
                Some(Block::Paragraph(text)) | Some(Block::ListItem { text, .. })
                    if gap_is_small =>
                {
                    join_line(text, &line.text);
                }
                _ => blocks.push(Block::Paragraph(line.text.clone())),
            }
        }

        prev = Some(line);
    }

    blocks
}

/// Render blocks as Markdown. Adjacent list items stay in one list.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            let tight = matches!(
                (&blocks[i - 1], block),
                (Block::ListItem { .. }, Block::ListItem { .. })
            );
            out.push_str(if tight { "\n" } else { "\n\n" });
        }
        match block {
            Block::Heading { level, text } => {
                out.push_str(&"#".repeat(*level as usize));
                out.push(' ');
                out.push_str(text);
            }
            Block::ListItem { marker, text } => {
                out.push_str(marker);
                out.push(' ');
                out.push_str(text);
            }
            Block::Paragraph(text) => out.push_str(text),
            Block::Image(reference) => {
                out.push_str("![](");
                out.push_str(reference);
                out.push(')');
            }
        }
    }
    out
}
