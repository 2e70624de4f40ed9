//! Conversion entry points and the three extraction routines.
//!
//! [`to_markdown`] is the single conversion call: PDF path plus
//! [`ConversionConfig`] in, Markdown text out. It blocks on pdfium, so async
//! callers go through [`convert`], which moves the work onto Tokio's blocking
//! pool.
//!
//! [`extract_markdown`], [`extract_tables`] and [`extract_images`] are the
//! routines behind the interactive menu: each applies its mode's preset,
//! runs the conversion once and writes the result into the output directory.

use crate::config::{ConversionConfig, ConversionConfigBuilder};
use crate::error::ExtractError;
use crate::mode::ExtractionMode;
use crate::pipeline::layout::{self, TextLine};
use crate::pipeline::markdown::{self, Element};
use crate::pipeline::{document, images, postprocess};
use crate::prompt::ExtractionRequest;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of converting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    /// The assembled, post-processed Markdown.
    pub markdown: String,
    /// Number of pages in the document.
    pub page_count: usize,
    /// Image files written, in document order. Empty unless `write_images`.
    pub images: Vec<PathBuf>,
}

/// Convert a PDF file to Markdown.
///
/// This is the primary entry point for the library. It blocks for the whole
/// conversion; see [`convert`] for the async variant.
///
/// # Errors
/// - File not found / permission denied / not a PDF
/// - pdfium could not be bound or could not open the document
/// - An image file could not be written (with `write_images`)
pub fn to_markdown(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<String, ExtractError> {
    convert_document(pdf_path.as_ref(), config).map(|output| output.markdown)
}

/// Convert a PDF file, returning the Markdown together with page and image
/// details.
pub fn convert_document(
    pdf_path: &Path,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ExtractError> {
    let start = Instant::now();
    info!("Starting conversion: {}", pdf_path.display());

    // ── Step 1: Validate input ───────────────────────────────────────────
    document::check_pdf_file(pdf_path)?;
    if config.write_images {
        let dir = config.image_path.as_deref().ok_or_else(|| {
            ExtractError::InvalidConfig("write_images requires an image_path".into())
        })?;
        std::fs::create_dir_all(dir).map_err(|e| ExtractError::write_failed(dir, e))?;
    }

    // ── Step 2: Open document ────────────────────────────────────────────
    let pdfium = document::bind_pdfium()?;
    let doc = document::open_document(pdfium, pdf_path, config.password.as_deref())?;
    let file_name = pdf_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    let pages = doc.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_pages);
    }

    // ── Step 3: Lay out text and write images, page by page ──────────────
    let mut laid_out: Vec<Vec<Element>> = Vec::with_capacity(total_pages);
    let mut written: Vec<PathBuf> = Vec::new();

    for index in 0..pages.len() {
        let page_num = index as usize + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let page = pages.get(index).map_err(|e| ExtractError::PageAccess {
            page: page_num,
            detail: format!("{:?}", e),
        })?;

        let mut elements: Vec<Element> = page_lines(&page, page_num)
            .into_iter()
            .map(Element::Line)
            .collect();

        if config.write_images {
            let placed_images =
                images::extract_page_images(&doc, &page, page_num, &file_name, config)?;
            for placed in placed_images {
                elements.push(Element::Image {
                    top: placed.top,
                    reference: images::image_reference(&placed.path),
                });
                written.push(placed.path);
            }
        }

        debug!("Page {}: {} elements", page_num, elements.len());
        laid_out.push(elements);
    }

    // ── Step 4: Build Markdown ───────────────────────────────────────────
    let body = markdown::body_height(laid_out.iter().flatten().filter_map(|e| match e {
        Element::Line(line) => Some(line),
        Element::Image { .. } => None,
    }));
    debug!("Body text height: {:?}", body);

    let mut parts: Vec<String> = Vec::with_capacity(total_pages * 2);
    for (i, elements) in laid_out.into_iter().enumerate() {
        let page_num = i + 1;
        let page_md = markdown::render_blocks(&markdown::build_blocks(elements, body));
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, total_pages, page_md.len());
        }
        if i > 0 {
            parts.push(config.page_separator.render(page_num));
        }
        parts.push(page_md);
    }

    // ── Step 5: Post-process ─────────────────────────────────────────────
    let markdown = postprocess::clean_markdown(&parts.concat());

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_pages, written.len());
    }
    info!(
        "Conversion complete: {} pages, {} images, {} bytes, {}ms",
        total_pages,
        written.len(),
        markdown.len(),
        start.elapsed().as_millis()
    );

    Ok(ConversionOutput {
        markdown,
        page_count: total_pages,
        images: written,
    })
}

/// Text lines of one page; a page without a text layer yields none.
fn page_lines(page: &PdfPage, page_num: usize) -> Vec<TextLine> {
    match page.text() {
        Ok(text) => {
            let glyphs = layout::collect_glyphs(&text);
            let thresholds = layout::thresholds(&glyphs);
            layout::group_lines(glyphs, thresholds)
        }
        Err(e) => {
            warn!("Page {}: no text layer ({:?})", page_num, e);
            Vec::new()
        }
    }
}

/// Async wrapper around [`convert_document`].
///
/// pdfium is not async-safe; the conversion runs on a blocking-pool thread.
pub async fn convert(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ExtractError> {
    let path = pdf_path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || convert_document(&path, &config))
        .await
        .map_err(|e| ExtractError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Write Markdown to `path` atomically (temp file + rename), creating the
/// parent directory if needed. An existing file is replaced.
pub async fn write_markdown(path: &Path, markdown: &str) -> Result<(), ExtractError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExtractError::write_failed(parent, e))?;
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, markdown)
        .await
        .map_err(|e| ExtractError::write_failed(path, e))?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(ExtractError::write_failed(path, e));
    }

    debug!("Wrote {} bytes to {}", markdown.len(), path.display());
    Ok(())
}

// ── Extraction routines ──────────────────────────────────────────────────

/// What an extraction routine produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub mode: ExtractionMode,
    /// The Markdown file that was written.
    pub markdown_path: PathBuf,
    /// Image directory (image mode only).
    pub images_dir: Option<PathBuf>,
    pub images_written: usize,
    pub page_count: usize,
}

impl ExtractionReport {
    /// Status lines printed to the console after a successful run.
    pub fn status_lines(&self) -> Vec<String> {
        let file = self.markdown_path.display();
        match (self.mode, &self.images_dir) {
            (ExtractionMode::Markdown, _) => {
                vec![format!("\nMarkdown extracted and saved to '{file}'.")]
            }
            (ExtractionMode::Tables, _) => {
                vec![format!("\nTables extracted and saved to '{file}'.")]
            }
            (ExtractionMode::Images, dir) => {
                let dir = dir
                    .as_deref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default();
                vec![
                    format!("\nImages extracted to '{dir}'."),
                    format!("Markdown with image references saved to '{file}'."),
                ]
            }
        }
    }
}

/// Dispatch a collected request to its extraction routine.
///
/// `base` carries settings shared by every mode (password, progress).
pub async fn run_extraction(
    request: &ExtractionRequest,
    base: ConversionConfigBuilder,
) -> Result<ExtractionReport, ExtractError> {
    let pdf = request.pdf_path.as_path();
    let out = request.output_dir.as_path();
    match request.mode {
        ExtractionMode::Markdown => extract_markdown(pdf, out, base).await,
        ExtractionMode::Tables => extract_tables(pdf, out, base).await,
        ExtractionMode::Images => extract_images(pdf, out, base).await,
    }
}

/// Whole document → `<output_dir>/output.md`.
pub async fn extract_markdown(
    pdf_path: &Path,
    output_dir: &Path,
    base: ConversionConfigBuilder,
) -> Result<ExtractionReport, ExtractError> {
    run_mode(ExtractionMode::Markdown, pdf_path, output_dir, base).await
}

/// Whole document → `<output_dir>/tables.md`.
///
/// Same conversion as [`extract_markdown`]; no table detection is done.
pub async fn extract_tables(
    pdf_path: &Path,
    output_dir: &Path,
    base: ConversionConfigBuilder,
) -> Result<ExtractionReport, ExtractError> {
    info!("Table mode runs the default Markdown conversion; tables are not detected separately");
    run_mode(ExtractionMode::Tables, pdf_path, output_dir, base).await
}

/// Markdown with image references → `<output_dir>/images.md`, images as
/// 300 DPI PNGs in `<output_dir>/images/`.
pub async fn extract_images(
    pdf_path: &Path,
    output_dir: &Path,
    base: ConversionConfigBuilder,
) -> Result<ExtractionReport, ExtractError> {
    if let Some(dir) = ExtractionMode::Images.images_dir(output_dir) {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ExtractError::write_failed(&dir, e))?;
    }
    run_mode(ExtractionMode::Images, pdf_path, output_dir, base).await
}

async fn run_mode(
    mode: ExtractionMode,
    pdf_path: &Path,
    output_dir: &Path,
    base: ConversionConfigBuilder,
) -> Result<ExtractionReport, ExtractError> {
    let config = mode.config(output_dir, base)?;
    debug!("{:?} preset: {:?}", mode, config);

    let output = convert(pdf_path, &config).await?;
    let markdown_path = mode.output_file(output_dir);
    write_markdown(&markdown_path, &output.markdown).await?;

    Ok(ExtractionReport {
        mode,
        markdown_path,
        images_dir: mode.images_dir(output_dir),
        images_written: output.images.len(),
        page_count: output.page_count,
    })
}
