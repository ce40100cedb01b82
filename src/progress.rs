//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through a document. Pages are always
//! reported in page order, one at a time.
//!
//! # Example
//!
//! ```rust
//! use pdf2docx::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     transcribed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
//!         self.transcribed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} chars)", page_num, total_pages, text_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { transcribed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes each document and page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Page events are fired from the blocking worker that
/// drives rasterisation and OCR, hence the `Send + Sync` bound.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called when conversion of a document begins, before its input is resolved.
    fn on_document_start(&self, source: &Path) {
        let _ = source;
    }

    /// Called just before OCR runs on a page.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been transcribed.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages
    /// * `text_len`    — character count of the recognised text
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called once the document has been saved.
    fn on_document_complete(&self, output: &Path, total_pages: usize) {
        let _ = (output, total_pages);
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
        documents: AtomicUsize,
        pages: Mutex<Vec<(usize, usize)>>,
        saved_pages: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_document_start(&self, _source: &Path) {
            self.documents.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, page_num: usize, total_pages: usize, _text_len: usize) {
            self.pages.lock().unwrap().push((page_num, total_pages));
        }

        fn on_document_complete(&self, _output: &Path, total_pages: usize) {
            self.saved_pages.store(total_pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_document_start(Path::new("a.pdf"));
        cb.on_page_start(1, 2);
        cb.on_page_complete(1, 2, 42);
        cb.on_document_complete(Path::new("a.docx"), 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_document_start(Path::new("scan.pdf"));
        tracker.on_page_start(1, 2);
        tracker.on_page_complete(1, 2, 100);
        tracker.on_page_start(2, 2);
        tracker.on_page_complete(2, 2, 0);
        tracker.on_document_complete(Path::new("scan.docx"), 2);

        assert_eq!(tracker.documents.load(Ordering::SeqCst), 1);
        assert_eq!(*tracker.pages.lock().unwrap(), vec![(1, 2), (2, 2)]);
        assert_eq!(tracker.saved_pages.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_page_start(1, 10);
        cb.on_page_complete(1, 10, 512);
    }
}
