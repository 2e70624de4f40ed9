//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements one transformation step and is testable on its
//! own; only [`document`], [`layout::collect_glyphs`] and
//! [`images::extract_page_images`] touch pdfium.
//!
//! ## Data Flow
//!
//! ```text
//! document ──▶ layout ──▶ images ──▶ markdown ──▶ postprocess
//! (pdfium)     (lines)    (files)    (blocks)     (cleanup)
//! ```
//!
//! 1. [`document`]   : bind pdfium, validate and open the PDF
//! 2. [`layout`]     : group positioned glyphs into text lines
//! 3. [`images`]     : write embedded images at the requested DPI
//! 4. [`markdown`]   : classify lines into headings, lists, paragraphs
//! 5. [`postprocess`]: deterministic text cleanup of the assembled output

pub mod document;
pub mod images;
pub mod layout;
pub mod markdown;
pub mod postprocess;
