//! The three extraction modes offered by the interactive menu.
//!
//! A mode decides two things only: which [`ConversionConfig`] preset is
//! handed to [`crate::convert::to_markdown`] and which file name the result
//! is written to.

use crate::config::{ConversionConfig, ConversionConfigBuilder, ImageFormat};
use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Subdirectory of the output directory that receives extracted images.
pub const IMAGES_DIR: &str = "images";

/// Resolution used by [`ExtractionMode::Images`].
pub const IMAGE_DPI: u32 = 300;

/// One of the menu entries `1`, `2`, `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Whole document as Markdown → `output.md`.
    Markdown,
    /// Tables → `tables.md`.
    ///
    /// Runs the very same conversion as [`ExtractionMode::Markdown`]: there
    /// is no table-specific detection, tables come out as whatever text
    /// layout the default conversion reconstructs. Only the file name differs.
    Tables,
    /// Markdown with image references → `images.md`, plus PNG files
    /// rendered at 300 DPI in `images/`.
    Images,
}

impl ExtractionMode {
    /// Menu order.
    pub const ALL: [ExtractionMode; 3] = [
        ExtractionMode::Markdown,
        ExtractionMode::Tables,
        ExtractionMode::Images,
    ];

    /// Parse a menu answer. Only the exact strings `"1"`, `"2"` and `"3"`
    /// are accepted.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(ExtractionMode::Markdown),
            "2" => Some(ExtractionMode::Tables),
            "3" => Some(ExtractionMode::Images),
            _ => None,
        }
    }

    /// The key the user types to select this mode.
    pub fn choice(self) -> &'static str {
        match self {
            ExtractionMode::Markdown => "1",
            ExtractionMode::Tables => "2",
            ExtractionMode::Images => "3",
        }
    }

    /// Label shown in the menu.
    pub fn label(self) -> &'static str {
        match self {
            ExtractionMode::Markdown => "Extract PDF to Markdown",
            ExtractionMode::Tables => "Extract Tables",
            ExtractionMode::Images => "Extract Images",
        }
    }

    /// Name of the Markdown file written into the output directory.
    pub fn output_file_name(self) -> &'static str {
        match self {
            ExtractionMode::Markdown => "output.md",
            ExtractionMode::Tables => "tables.md",
            ExtractionMode::Images => "images.md",
        }
    }

    pub fn output_file(self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.output_file_name())
    }

    /// Image directory for this mode, if it writes images at all.
    pub fn images_dir(self, output_dir: &Path) -> Option<PathBuf> {
        match self {
            ExtractionMode::Images => Some(output_dir.join(IMAGES_DIR)),
            ExtractionMode::Markdown | ExtractionMode::Tables => None,
        }
    }

    /// Apply this mode's preset on top of `base` (which may already carry a
    /// password or a progress callback) and build the config.
    pub fn config(
        self,
        output_dir: &Path,
        base: ConversionConfigBuilder,
    ) -> Result<ConversionConfig, ExtractError> {
        match self.images_dir(output_dir) {
            Some(dir) => base
                .write_images(true)
                .image_path(dir)
                .image_format(ImageFormat::Png)
                .dpi(IMAGE_DPI)
                .build(),
            None => base.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_choices_parse() {
        assert_eq!(ExtractionMode::from_choice("1"), Some(ExtractionMode::Markdown));
        assert_eq!(ExtractionMode::from_choice("2"), Some(ExtractionMode::Tables));
        assert_eq!(ExtractionMode::from_choice("3"), Some(ExtractionMode::Images));
        for bad in ["", "4", "0", " 1", "1 ", "one", "12", "\n"] {
            assert_eq!(ExtractionMode::from_choice(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn choice_round_trips_through_menu_order() {
        for mode in ExtractionMode::ALL {
            assert_eq!(ExtractionMode::from_choice(mode.choice()), Some(mode));
        }
    }

    #[test]
    fn output_file_names() {
        let out = Path::new("out");
        assert_eq!(ExtractionMode::Markdown.output_file(out), out.join("output.md"));
        assert_eq!(ExtractionMode::Tables.output_file(out), out.join("tables.md"));
        assert_eq!(ExtractionMode::Images.output_file(out), out.join("images.md"));
    }

    #[test]
    fn image_preset() {
        let out = Path::new("out");
        let c = ExtractionMode::Images
            .config(out, ConversionConfig::builder())
            .unwrap();
        assert!(c.write_images);
        assert_eq!(c.image_path.as_deref(), Some(out.join("images").as_path()));
        assert_eq!(c.image_format, ImageFormat::Png);
        assert_eq!(c.dpi, 300);
    }

    #[test]
    fn markdown_and_table_presets_match() {
        let out = Path::new("out");
        let md = ExtractionMode::Markdown
            .config(out, ConversionConfig::builder())
            .unwrap();
        let tables = ExtractionMode::Tables
            .config(out, ConversionConfig::builder())
            .unwrap();
        assert_eq!(md, tables);
        assert_eq!(md, ConversionConfig::default());
        assert!(!md.write_images);
    }

    #[test]
    fn preset_keeps_base_password() {
        let c = ExtractionMode::Images
            .config(Path::new("o"), ConversionConfig::builder().password("pw"))
            .unwrap();
        assert_eq!(c.password.as_deref(), Some("pw"));
    }
}
