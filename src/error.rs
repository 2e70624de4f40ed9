//! Error types for the pdf-extract-md library.
//!
//! Everything that can stop an extraction is an [`ExtractError`]. The two
//! user-input failures of the interactive flow (an unknown menu choice and a
//! missing PDF path) are *not* errors: the prompt layer reports them as
//! [`crate::prompt::CollectOutcome`] variants so the binary can print a
//! message and exit normally.
//!
//! A single embedded image that cannot be decoded is not fatal either; it is
//! logged and skipped inside [`crate::pipeline::images`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-extract-md library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not hand out a page or its text layer.
    #[error("Failed to read page {page}: {detail}")]
    PageAccess { page: usize, detail: String },

    /// An image could not be written to the image directory.
    #[error("Failed to extract image {index} on page {page}: {detail}")]
    ImageExtractionFailed {
        page: usize,
        index: usize,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file or directory.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading an answer from the console or echoing a prompt failed.
    #[error("Console I/O failed: {0}")]
    Console(#[source] std::io::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium for your platform, or:\n\
  • Place libpdfium next to the executable / in the working directory.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Wrap an I/O failure on `path` as [`ExtractError::OutputWriteFailed`].
    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_write_failed_keeps_source() {
        let e = ExtractError::write_failed(
            "/out/output.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        );
        let msg = e.to_string();
        assert!(msg.contains("/out/output.md"), "got: {msg}");
        assert!(msg.contains("read-only"), "got: {msg}");
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn not_a_pdf_display() {
        let e = ExtractError::NotAPdf {
            path: PathBuf::from("notes.txt"),
            magic: *b"hell",
        };
        assert!(e.to_string().contains("notes.txt"));
    }

    #[test]
    fn image_failure_display() {
        let e = ExtractError::ImageExtractionFailed {
            page: 3,
            index: 1,
            detail: "disk full".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("image 1 on page 3"), "got: {msg}");
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn binding_failure_mentions_env_var() {
        let e = ExtractError::PdfiumBindingFailed("dlopen failed".into());
        assert!(e.to_string().contains("PDFIUM_LIB_PATH"));
    }
}
