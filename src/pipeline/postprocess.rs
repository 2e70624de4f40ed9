//! Post-processing: deterministic cleanup of the assembled Markdown.
//!
//! Text coming out of a PDF text layer carries typesetting artefacts that
//! make the Markdown awkward to diff or search: ligature code points,
//! non-breaking and zero-width spaces, soft hyphens, CR characters. The
//! rules below remove them without touching content.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so that every later rule can split on
//! `\n`; trailing whitespace is trimmed before blank lines are collapsed so
//! whitespace-only lines count as blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules.
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Expand typographic ligatures (`ﬁ` → `fi`, …)
/// 3. Replace exotic space characters with a plain space
/// 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 5. Trim trailing whitespace per line
/// 6. Collapse 3+ consecutive blank lines down to 2
/// 7. End with exactly one newline (empty input stays empty)
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = expand_ligatures(&s);
    let s = normalise_spaces(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Expand ligatures ─────────────────────────────────────────────────

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

fn expand_ligatures(input: &str) -> String {
    if !input.chars().any(|c| ('\u{FB00}'..='\u{FB06}').contains(&c)) {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, expanded)) => out.push_str(expanded),
            None => out.push(c),
        }
    }
    out
}

// ── Rule 3: Normalise spaces ─────────────────────────────────────────────────

fn normalise_spaces(input: &str) -> String {
    input.replace(
        [
            '\u{00A0}', '\u{2002}', '\u{2003}', '\u{2007}', '\u{2009}', '\u{202F}',
        ],
        " ",
    )
}

// ── Rule 4: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FFFE}',
        ],
        "",
    )
}

// ── Rule 5: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 6: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 7: Ensure file ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
