//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while the converter walks the document. The CLI uses it to drive
//! an `indicatif` bar; library callers can forward the events anywhere.
//!
//! # Example
//!
//! ```rust
//! use pdf_extract_md::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter(AtomicUsize);
//!
//! impl ConversionProgressCallback for PageCounter {
//!     fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _markdown_len: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(PageCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the converter as it processes each page.
///
/// Conversion runs on a blocking worker thread, so implementations must be
/// `Send + Sync`. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the document is opened.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page's text layer is read.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after each image file is written.
    fn on_image_saved(&self, page_num: usize, path: &Path) {
        let _ = (page_num, path);
    }

    /// Called when a page has been turned into Markdown.
    ///
    /// # Arguments
    /// * `page_num`    : 1-indexed page number
    /// * `total_pages` : total pages
    /// * `markdown_len`: byte length of the page's Markdown
    fn on_page_complete(&self, page_num: usize, total_pages: usize, markdown_len: usize) {
        let _ = (page_num, total_pages, markdown_len);
    }

    /// Called once after the last page.
    fn on_conversion_complete(&self, total_pages: usize, images_written: usize) {
        let _ = (total_pages, images_written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        pages: AtomicUsize,
        images: Mutex<Vec<String>>,
        total: AtomicUsize,
        written: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_pages: usize) {
            self.total.store(total_pages, Ordering::SeqCst);
        }

        fn on_image_saved(&self, _page_num: usize, path: &Path) {
            self.images
                .lock()
                .unwrap()
                .push(path.display().to_string());
        }

        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _markdown_len: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _total_pages: usize, images_written: usize) {
            self.written.store(images_written, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(2);
        cb.on_page_start(1, 2);
        cb.on_image_saved(1, Path::new("images/doc.pdf-0-0.png"));
        cb.on_page_complete(1, 2, 42);
        cb.on_conversion_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_conversion_start(2);
        tracker.on_page_start(1, 2);
        tracker.on_image_saved(1, Path::new("images/doc.pdf-0-0.png"));
        tracker.on_page_complete(1, 2, 100);
        tracker.on_page_start(2, 2);
        tracker.on_page_complete(2, 2, 0);
        tracker.on_conversion_complete(2, 1);

        assert_eq!(tracker.total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.pages.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.written.load(Ordering::SeqCst), 1);
        assert_eq!(
            tracker.images.lock().unwrap().as_slice(),
            ["images/doc.pdf-0-0.png"]
        );
    }

    #[test]
    fn arc_dyn_callback_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ConversionProgressCallback>();
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_page_start(1, 1);
    }
}
