//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The three extraction modes of the CLI
//! are nothing more than three presets of this struct (see
//! [`crate::mode::ExtractionMode::config`]).

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Lowest accepted rendering resolution for extracted images.
pub const MIN_DPI: u32 = 72;
/// Highest accepted rendering resolution for extracted images.
pub const MAX_DPI: u32 = 1200;

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_extract_md::{ConversionConfig, ImageFormat};
///
/// let config = ConversionConfig::builder()
///     .write_images(true)
///     .image_path("out/images")
///     .image_format(ImageFormat::Png)
///     .dpi(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Save embedded images to [`Self::image_path`] and reference them from
    /// the Markdown. Default: false (images are ignored).
    pub write_images: bool,

    /// Directory that receives image files when `write_images` is set.
    pub image_path: Option<PathBuf>,

    /// Encoding of written images. Default: PNG.
    pub image_format: ImageFormat,

    /// Resolution used to size extracted images. Range: 72–1200. Default: 150.
    ///
    /// An image drawn 2 inches wide on the page comes out `2 × dpi` pixels
    /// wide, whatever the resolution of the bitmap embedded in the PDF.
    pub dpi: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Separator inserted between pages. Default: [`PageSeparator::Rule`].
    pub page_separator: PageSeparator,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            write_images: false,
            image_path: None,
            image_format: ImageFormat::default(),
            dpi: 150,
            password: None,
            page_separator: PageSeparator::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("write_images", &self.write_images)
            .field("image_path", &self.image_path)
            .field("image_format", &self.image_format)
            .field("dpi", &self.dpi)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("page_separator", &self.page_separator)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl PartialEq for ConversionConfig {
    /// Compares every knob except the progress callback, which has no identity.
    fn eq(&self, other: &Self) -> bool {
        self.write_images == other.write_images
            && self.image_path == other.image_path
            && self.image_format == other.image_format
            && self.dpi == other.dpi
            && self.password == other.password
            && self.page_separator == other.page_separator
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Factor that maps PDF points (1/72 inch) to pixels at the configured DPI.
    pub fn pixels_per_point(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn write_images(mut self, v: bool) -> Self {
        self.config.write_images = v;
        self
    }

    pub fn image_path(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.image_path = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.config.image_format = format;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ExtractError> {
        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c.write_images && c.image_path.is_none() {
            return Err(ExtractError::InvalidConfig(
                "write_images requires an image_path".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// File format for images written during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub(crate) fn as_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// How to separate pages in the assembled Markdown output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// Blank line only: "\n\n"
    None,
    /// Horizontal rule: "\n\n-----\n\n" (default)
    #[default]
    Rule,
    /// HTML comment with page number: "<!-- page N -->"
    Comment,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator string placed before the given page (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => "\n\n".to_string(),
            PageSeparator::Rule => "\n\n-----\n\n".to_string(),
            PageSeparator::Comment => format!("\n\n<!-- page {} -->\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}
