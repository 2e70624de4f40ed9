//! CLI binary for pdf-extract-md.
//!
//! Runs the interactive dialogue on stdin/stdout, then the selected
//! extraction routine. An invalid menu choice or a missing PDF ends the run
//! normally (exit code 0); conversion or write failures exit non-zero.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_extract_md::{
    run_extraction, CollectOutcome, ConversionConfig, ConversionProgressCallback, InputCollector,
    ProgressCallback,
};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the document opens, then a page bar.
struct CliProgressCallback {
    bar: ProgressBar,
    images: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            images: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
        self.bar.set_message("");
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_image_saved(&self, _page_num: usize, _path: &Path) {
        let n = self.images.fetch_add(1, Ordering::Relaxed) + 1;
        self.bar.set_message(format!("{n} images"));
    }

    fn on_page_complete(&self, _page_num: usize, _total: usize, _markdown_len: usize) {
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_pages: usize, _images_written: usize) {
        self.bar.finish_and_clear();
    }
}

/// Extract text, tables or images from a PDF into Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "extract-pdf",
    version,
    about = "Extract text, tables or images from a PDF into Markdown",
    long_about = "Interactively extract a PDF into Markdown. You are asked for an output \
directory, an operation (1: Markdown, 2: Tables, 3: Images) and the PDF path.\n\n\
The pdfium library is loaded from PDFIUM_LIB_PATH, the working directory or the system path.",
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF_EXTRACT_PASSWORD")]
    password: Option<String>,

    /// Disable progress bar.
    #[arg(long, env = "PDF_EXTRACT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_EXTRACT_VERBOSE")]
    verbose: bool,

    /// Suppress log output except errors.
    #[arg(short, long, env = "PDF_EXTRACT_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The bar carries progress; only warnings get through while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Interactive dialogue ─────────────────────────────────────────────
    let outcome = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        InputCollector::new(stdin.lock(), stdout.lock())
            .collect()
            .context("Failed to read input")?
    };
    let request = match outcome {
        CollectOutcome::Ready(request) => request,
        // The abort message has been printed already.
        CollectOutcome::InvalidChoice(_) | CollectOutcome::PdfNotFound(_) => return Ok(()),
    };

    // ── Extraction ───────────────────────────────────────────────────────
    let mut base = ConversionConfig::builder();
    if let Some(pwd) = cli.password {
        base = base.password(pwd);
    }
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        base = base.progress_callback(cb);
    }

    let report = run_extraction(&request, base)
        .await
        .with_context(|| format!("Extraction failed for '{}'", request.pdf_path.display()))?;

    for line in report.status_lines() {
        println!("{line}");
    }
    Ok(())
}
