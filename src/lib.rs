//! # pdf-extract-md
//!
//! Extract the content of a PDF document into Markdown, with an interactive
//! front end that asks for an output directory, an extraction mode and a PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Document  validate the file, bind pdfium, open (password aware)
//!  ├─ 2. Layout    glyphs → lines, thresholds from median glyph height
//!  ├─ 3. Images    embedded images → <file.pdf>-<page>-<index>.png (optional)
//!  ├─ 4. Markdown  headings by font size, lists, paragraphs, image refs
//!  └─ 5. Polish    ligatures, invisible characters, blank lines
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_extract_md::{to_markdown, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let md = to_markdown("document.pdf", &ConversionConfig::default())?;
//!     println!("{md}");
//!     Ok(())
//! }
//! ```
//!
//! Extracting images next to the Markdown:
//!
//! ```rust,no_run
//! use pdf_extract_md::{to_markdown, ConversionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConversionConfig::builder()
//!     .write_images(true)
//!     .image_path("out/images")
//!     .dpi(300)
//!     .build()?;
//! let md = to_markdown("document.pdf", &config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `extract-pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## pdfium
//!
//! The pdfium shared library is loaded at runtime: from `PDFIUM_LIB_PATH`
//! if set, then the working directory, then the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod mode;
pub mod pipeline;
pub mod progress;
pub mod prompt;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ImageFormat, PageSeparator};
pub use convert::{
    convert, convert_document, extract_images, extract_markdown, extract_tables, run_extraction,
    to_markdown, write_markdown, ConversionOutput, ExtractionReport,
};
pub use error::ExtractError;
pub use mode::ExtractionMode;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompt::{CollectOutcome, ExtractionRequest, InputCollector, DEFAULT_OUTPUT_DIR};
