//! Binding to the pdfium shared library and opening documents.
//!
//! pdfium is looked up in this order:
//!
//! 1. `PDFIUM_LIB_PATH`: either the library file itself or the directory
//!    that contains it;
//! 2. the current working directory;
//! 3. the system library search path.

use crate::error::ExtractError;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit pdfium library (file or directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Process-wide pdfium instance.
///
/// `FPDF_InitLibrary` / `FPDF_DestroyLibrary` must not run concurrently, so
/// the library is bound once and never dropped.
static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// The shared pdfium instance, binding it on first use.
///
/// A failed bind is not cached; the next call tries again.
pub fn bind_pdfium() -> Result<&'static Pdfium, ExtractError> {
    PDFIUM.get_or_try_init(|| bind_library().map(Pdfium::new))
}

fn bind_library() -> Result<Box<dyn PdfiumLibraryBindings>, ExtractError> {
    let mut failures = Vec::new();

    if let Some(candidate) = env_library_candidate() {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(bindings);
            }
            Err(e) => failures.push(format!("{}: {:?}", candidate.display(), e)),
        }
    }

    match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./")) {
        Ok(bindings) => {
            debug!("Bound pdfium from working directory");
            return Ok(bindings);
        }
        Err(e) => failures.push(format!("./: {:?}", e)),
    }

    Pdfium::bind_to_system_library()
        .map(|bindings| {
            debug!("Bound system pdfium");
            bindings
        })
        .map_err(|e| {
            failures.push(format!("system: {:?}", e));
            ExtractError::PdfiumBindingFailed(failures.join("; "))
        })
}

/// Resolve `PDFIUM_LIB_PATH` to a library file path.
fn env_library_candidate() -> Option<PathBuf> {
    let raw = std::env::var_os(PDFIUM_LIB_PATH_ENV)?;
    if raw.is_empty() {
        return None;
    }
    let path = PathBuf::from(raw);
    if path.is_dir() {
        Some(PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(
            &path,
        )))
    } else {
        Some(path)
    }
}

/// Validate that `path` is a readable file starting with the `%PDF` magic.
pub fn check_pdf_file(path: &Path) -> Result<(), ExtractError> {
    use std::io::Read;

    if !path.is_file() {
        return Err(ExtractError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(ExtractError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    Ok(())
}

/// Open `path` with pdfium, mapping load failures to typed errors.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium
        .load_pdf_from_file(path, password)
        .map_err(|e| map_load_error(e, path, password.is_some()))
}

fn map_load_error(err: PdfiumError, path: &Path, had_password: bool) -> ExtractError {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            if had_password {
                ExtractError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                ExtractError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        }
        other => ExtractError::CorruptPdf {
            path: path.to_path_buf(),
            detail: format!("{:?}", other),
        },
    }
}
