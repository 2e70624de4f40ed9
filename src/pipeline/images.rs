//! Embedded image extraction.
//!
//! Every image object on a page, including those drawn from inside Form
//! XObjects, is decoded by pdfium (filters, masks and colour spaces
//! applied). It is cropped to the part that lies on the page, resampled to
//! the size that part occupies at the configured DPI, and written to the
//! image directory as `<pdf-file-name>-<page-index>-<index>.<ext>` (page
//! index 0-based, e.g. `report.pdf-0-0.png`). Images that cover less than
//! [`MIN_IMAGE_FRACTION`] of the page in either direction (bullets, rules,
//! spacer pixels) are skipped.
//!
//! Decoding failures are logged and skipped; write failures are fatal.

use crate::config::{ConversionConfig, ImageFormat};
use crate::error::ExtractError;
use image::imageops::FilterType;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Minimum share of the page width or height an image must span.
pub const MIN_IMAGE_FRACTION: f32 = 0.05;

/// Form XObjects nested deeper than this are not searched.
const MAX_FORM_DEPTH: usize = 16;

/// An image written to disk, with its vertical position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    /// Top edge in PDF points (origin bottom-left).
    pub top: f32,
    pub path: PathBuf,
}

/// Axis-aligned rectangle in PDF points (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Overlap of two rectangles, `None` when it is empty.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let r = Rect {
            left: self.left.max(other.left),
            bottom: self.bottom.max(other.bottom),
            right: self.right.min(other.right),
            top: self.top.min(other.top),
        };
        // Negated so that NaN coordinates count as empty.
        if !(r.right > r.left && r.top > r.bottom) {
            return None;
        }
        Some(r)
    }

    /// Smallest rectangle containing both.
    pub fn union(self, other: Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }

    /// Map `self` from the space spanned by `from` onto `to`, scaling each
    /// axis independently.
    pub fn map(self, from: Rect, to: Rect) -> Rect {
        let sx = if from.width() > 0.0 {
            to.width() / from.width()
        } else {
            1.0
        };
        let sy = if from.height() > 0.0 {
            to.height() / from.height()
        } else {
            1.0
        };
        Rect {
            left: to.left + (self.left - from.left) * sx,
            right: to.left + (self.right - from.left) * sx,
            bottom: to.bottom + (self.bottom - from.bottom) * sy,
            top: to.bottom + (self.top - from.bottom) * sy,
        }
    }
}

/// Visible part of an image object on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top edge of the visible part.
    pub top: f32,
    /// Visible size in points.
    pub width: f32,
    pub height: f32,
    /// Visible window as fractions of the full image `[x0, y0, x1, y1]`,
    /// measured from the image's top-left corner.
    pub window: [f32; 4],
}

/// Clip an image's on-page rectangle to the page box.
///
/// Returns `None` when nothing of the image lies on the page.
pub fn clip_to_page(image: Rect, page_width: f32, page_height: f32) -> Option<Placement> {
    let page = Rect {
        left: 0.0,
        bottom: 0.0,
        right: page_width,
        top: page_height,
    };
    let visible = image.intersect(page)?;
    let window = [
        (visible.left - image.left) / image.width(),
        (image.top - visible.top) / image.height(),
        (visible.right - image.left) / image.width(),
        (image.top - visible.bottom) / image.height(),
    ];
    Some(Placement {
        top: visible.top,
        width: visible.width(),
        height: visible.height(),
        window,
    })
}

/// File name for the `index`-th image of the page at `page_index`
/// (0-based), following pymupdf4llm: `<file name>-<page>-<index>.<ext>`.
pub fn image_file_name(
    file_name: &str,
    page_index: usize,
    index: usize,
    format: ImageFormat,
) -> String {
    format!("{file_name}-{page_index}-{index}.{}", format.extension())
}

/// Whether an image of `placement` is large enough to keep on a page of the
/// given size.
pub fn is_significant(placement: &Placement, page_width: f32, page_height: f32) -> bool {
    if page_width <= 0.0 || page_height <= 0.0 {
        return true;
    }
    placement.width >= page_width * MIN_IMAGE_FRACTION
        && placement.height >= page_height * MIN_IMAGE_FRACTION
}

/// Pixel size of an image spanning `width × height` points.
pub fn target_pixels(width: f32, height: f32, pixels_per_point: f32) -> (u32, u32) {
    let px = |pts: f32| ((pts * pixels_per_point).round() as u32).max(1);
    (px(width), px(height))
}

/// Cut the visible `window` out of `img`; a full window returns it as is.
fn crop_to_window(img: DynamicImage, [x0, y0, x1, y1]: [f32; 4]) -> DynamicImage {
    if x0 <= 0.0 && y0 <= 0.0 && x1 >= 1.0 && y1 >= 1.0 {
        return img;
    }
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return img;
    }
    let x = ((x0.max(0.0) * w as f32).floor() as u32).min(w - 1);
    let y = ((y0.max(0.0) * h as f32).floor() as u32).min(h - 1);
    let cw = ((((x1.min(1.0) - x0.max(0.0)) * w as f32).ceil() as u32).max(1)).min(w - x);
    let ch = ((((y1.min(1.0) - y0.max(0.0)) * h as f32).ceil() as u32).max(1)).min(h - y);
    img.crop_imm(x, y, cw, ch)
}

/// Crop `img` to `window`, resample to `(w, h)` and convert it to a pixel
/// layout `format` can store.
pub fn prepare_image(
    img: DynamicImage,
    window: [f32; 4],
    (w, h): (u32, u32),
    format: ImageFormat,
) -> DynamicImage {
    let img = crop_to_window(img, window);
    let img = if img.width() == w && img.height() == h {
        img
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    };
    match format {
        // JPEG has no alpha channel.
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        ImageFormat::Png => img,
    }
}

/// Extract the images of one page into `config.image_path`.
///
/// `file_name` is the PDF's file name, used to name the image files.
pub fn extract_page_images(
    document: &PdfDocument,
    page: &PdfPage,
    page_num: usize,
    file_name: &str,
    config: &ConversionConfig,
) -> Result<Vec<PlacedImage>, ExtractError> {
    let Some(dir) = config.image_path.as_deref() else {
        return Ok(Vec::new());
    };

    let mut walker = PageImages {
        document,
        config,
        dir,
        file_name,
        page_num,
        page_width: page.width().value,
        page_height: page.height().value,
        frames: Vec::new(),
        seen: 0,
        placed: Vec::new(),
    };
    for object in page.objects().iter() {
        walker.visit(&object)?;
    }
    Ok(walker.placed)
}

/// Walks a page's object tree, writing every image it meets.
struct PageImages<'c, 'd> {
    document: &'c PdfDocument<'d>,
    config: &'c ConversionConfig,
    dir: &'c Path,
    file_name: &'c str,
    page_num: usize,
    page_width: f32,
    page_height: f32,
    /// `(content bounds, placed bounds)` of each enclosing form, outermost
    /// first; maps form space onto the page.
    frames: Vec<(Rect, Rect)>,
    /// Image objects visited, for log messages.
    seen: usize,
    placed: Vec<PlacedImage>,
}

impl PageImages<'_, '_> {
    fn visit(&mut self, object: &PdfPageObject) -> Result<(), ExtractError> {
        if let Some(form) = object.as_x_object_form_object() {
            return self.visit_form(object, form);
        }
        let Some(image_object) = object.as_image_object() else {
            return Ok(());
        };
        let object_index = self.seen;
        self.seen += 1;

        let Some(local) = object_rect(object) else {
            warn!(
                "Page {}: image object {} has no bounds, skipping",
                self.page_num, object_index
            );
            return Ok(());
        };
        let on_page = self
            .frames
            .iter()
            .rev()
            .fold(local, |r, (from, to)| r.map(*from, *to));

        let Some(placement) = clip_to_page(on_page, self.page_width, self.page_height) else {
            debug!(
                "Page {}: image object {} lies off the page",
                self.page_num, object_index
            );
            return Ok(());
        };
        if !is_significant(&placement, self.page_width, self.page_height) {
            debug!(
                "Page {}: skipping small image object {} ({:.0}×{:.0} pt)",
                self.page_num, object_index, placement.width, placement.height
            );
            return Ok(());
        }

        let decoded = match image_object.get_processed_image(self.document) {
            Ok(img) => img,
            Err(e) => {
                warn!(
                    "Page {}: could not decode image object {}: {:?}",
                    self.page_num, object_index, e
                );
                return Ok(());
            }
        };

        let format = self.config.image_format;
        let index = self.placed.len();
        let size = target_pixels(
            placement.width,
            placement.height,
            self.config.pixels_per_point(),
        );
        let path = self.dir.join(image_file_name(
            self.file_name,
            self.page_num - 1,
            index,
            format,
        ));
        save_image(
            prepare_image(decoded, placement.window, size, format),
            &path,
            format,
        )
        .map_err(|detail| ExtractError::ImageExtractionFailed {
            page: self.page_num,
            index,
            detail,
        })?;

        debug!(
            "Page {}: wrote {} ({}×{} px)",
            self.page_num,
            path.display(),
            size.0,
            size.1
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_image_saved(self.page_num, &path);
        }
        self.placed.push(PlacedImage {
            top: placement.top,
            path,
        });
        Ok(())
    }

    fn visit_form(
        &mut self,
        object: &PdfPageObject,
        form: &PdfPageXObjectFormObject,
    ) -> Result<(), ExtractError> {
        if self.frames.len() >= MAX_FORM_DEPTH {
            warn!(
                "Page {}: form nesting deeper than {}, skipping",
                self.page_num, MAX_FORM_DEPTH
            );
            return Ok(());
        }
        let Some(placed) = object_rect(object) else {
            return Ok(());
        };
        let children: Vec<PdfPageObject> = form.iter().collect();
        // pdfium reports a form's bounds as its transformed content bounds,
        // and child bounds in form space.
        let Some(content) = children.iter().filter_map(object_rect).reduce(Rect::union) else {
            return Ok(());
        };

        self.frames.push((content, placed));
        let result = children.iter().try_for_each(|child| self.visit(child));
        self.frames.pop();
        result
    }
}

fn object_rect(object: &PdfPageObject) -> Option<Rect> {
    let bounds = object.bounds().ok()?;
    Some(Rect {
        left: bounds.left().value,
        bottom: bounds.bottom().value,
        right: bounds.right().value,
        top: bounds.top().value,
    })
}

fn save_image(img: DynamicImage, path: &Path, format: ImageFormat) -> Result<(), String> {
    img.save_with_format(path, format.as_image_format())
        .map_err(|e| e.to_string())
}

/// Markdown reference for a written image: its path with `/` separators.
pub fn image_reference(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const LETTER: (f32, f32) = (612.0, 792.0);

    fn rect(left: f32, bottom: f32, right: f32, top: f32) -> Rect {
        Rect {
            left,
            bottom,
            right,
            top,
        }
    }

    fn placement(width: f32, height: f32) -> Placement {
        Placement {
            top: 700.0,
            width,
            height,
            window: [0.0, 0.0, 1.0, 1.0],
        }
    }

    #[test]
    fn file_names() {
        assert_eq!(
            image_file_name("report.pdf", 2, 0, ImageFormat::Png),
            "report.pdf-2-0.png"
        );
        assert_eq!(
            image_file_name("scan.pdf", 0, 2, ImageFormat::Jpeg),
            "scan.pdf-0-2.jpg"
        );
    }

    #[test]
    fn pixels_follow_scale() {
        // 2 × 1 inch at 300 DPI
        assert_eq!(target_pixels(144.0, 72.0, 300.0 / 72.0), (600, 300));
        assert_eq!(target_pixels(0.1, 0.1, 1.0), (1, 1));
    }

    #[test]
    fn image_inside_page_is_unchanged() {
        let p = clip_to_page(rect(72.0, 400.0, 216.0, 508.0), LETTER.0, LETTER.1).unwrap();
        assert_eq!((p.top, p.width, p.height), (508.0, 144.0, 108.0));
        assert_eq!(p.window, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn oversized_image_is_clipped_to_page() {
        // 40 × 40 inch image drawn around a Letter page.
        let p = clip_to_page(rect(-1000.0, -1000.0, 1880.0, 1880.0), LETTER.0, LETTER.1).unwrap();
        assert_eq!((p.width, p.height), LETTER);
        assert_eq!(p.top, LETTER.1);

        let (w, h) = target_pixels(p.width, p.height, 300.0 / 72.0);
        assert!(w <= 2550 && h <= 3300, "got {w}×{h}");

        let huge = clip_to_page(rect(-1e9, -1e9, 1e9, 1e9), LETTER.0, LETTER.1).unwrap();
        assert_eq!((huge.width, huge.height), LETTER);
    }

    #[test]
    fn clip_window_tracks_visible_part() {
        // Right half and top half hang off the page.
        let p = clip_to_page(rect(412.0, 592.0, 812.0, 992.0), LETTER.0, LETTER.1).unwrap();
        assert_eq!(p.window, [0.0, 0.5, 0.5, 1.0]);
        assert_eq!((p.width, p.height), (200.0, 200.0));
    }

    #[test]
    fn off_page_and_degenerate_images_are_dropped() {
        assert_eq!(clip_to_page(rect(700.0, 0.0, 800.0, 100.0), LETTER.0, LETTER.1), None);
        assert_eq!(clip_to_page(rect(10.0, 10.0, 10.0, 50.0), LETTER.0, LETTER.1), None);
        assert_eq!(clip_to_page(rect(f32::NAN, 0.0, 10.0, 10.0), LETTER.0, LETTER.1), None);
    }

    #[test]
    fn form_space_maps_onto_page() {
        let unit = rect(0.0, 0.0, 1.0, 1.0);
        let placed = rect(72.0, 400.0, 216.0, 508.0);
        assert_eq!(unit.map(unit, placed), placed);

        let left_half = rect(0.0, 0.0, 0.5, 1.0);
        assert_eq!(left_half.map(unit, placed), rect(72.0, 400.0, 144.0, 508.0));
    }

    #[test]
    fn union_and_intersection() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 20.0, 20.0);
        assert_eq!(a.union(b), rect(0.0, 0.0, 20.0, 20.0));
        assert_eq!(a.intersect(b), Some(rect(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(a.intersect(rect(11.0, 0.0, 12.0, 1.0)), None);
    }

    #[test]
    fn small_images_are_insignificant() {
        assert!(!is_significant(&placement(6.0, 6.0), LETTER.0, LETTER.1));
        assert!(is_significant(&placement(300.0, 200.0), LETTER.0, LETTER.1));
        assert!(!is_significant(&placement(500.0, 1.0), LETTER.0, LETTER.1));
        assert!(is_significant(&placement(6.0, 6.0), 0.0, 0.0));
    }

    #[test]
    fn prepare_resamples_and_flattens_for_jpeg() {
        let full = [0.0, 0.0, 1.0, 1.0];
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 128])));
        let out = prepare_image(img.clone(), full, (40, 20), ImageFormat::Png);
        assert_eq!((out.width(), out.height()), (40, 20));
        assert!(out.color().has_alpha());

        let out = prepare_image(img, full, (10, 10), ImageFormat::Jpeg);
        assert!(!out.color().has_alpha());
    }

    #[test]
    fn crop_keeps_only_visible_window() {
        // Left half red, right half blue.
        let mut img = RgbaImage::from_pixel(10, 4, Rgba([255, 0, 0, 255]));
        for x in 5..10 {
            for y in 0..4 {
                img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let cropped = crop_to_window(DynamicImage::ImageRgba8(img), [0.5, 0.0, 1.0, 1.0]);
        assert_eq!((cropped.width(), cropped.height()), (5, 4));
        assert!(cropped
            .to_rgba8()
            .pixels()
            .all(|p| *p == Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn saved_png_is_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("x.pdf-0-0.png");
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([0, 0, 255, 255])));
        save_image(img, &path, ImageFormat::Png).unwrap();
        let back = image::open(&path).unwrap();
        assert_eq!((back.width(), back.height()), (4, 3));
    }

    #[test]
    fn references_use_forward_slashes() {
        assert_eq!(
            image_reference(Path::new("out/images/doc.pdf-0-0.png")),
            "out/images/doc.pdf-0-0.png"
        );
    }
}
