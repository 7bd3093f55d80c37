//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the processor works through the tree. The CLI uses this to drive its
//! progress bar; library users can forward events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use pdf_ocr_batch::{BatchConfig, BatchProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, path: &Path) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", index, total, path.display());
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//! let config = BatchConfig::builder()
//!     .progress_callback(cb as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the processor as it works through the candidates.
///
/// Files are processed one at a time, so calls never overlap, but the trait
/// is `Send + Sync` so a callback can be shared with other threads. All
/// methods default to no-ops.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the walk, before any tool runs.
    ///
    /// # Arguments
    /// * `total_candidates`: files that will be processed
    fn on_batch_start(&self, total_candidates: usize) {
        let _ = total_candidates;
    }

    /// Called before the OCR tool is spawned for a file.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position among the candidates
    /// * `total`: number of candidates
    /// * `path`: the original PDF
    fn on_file_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when both tools exited successfully for a file.
    fn on_file_complete(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when at least one tool failed for a file.
    ///
    /// # Arguments
    /// * `error`: human-readable description of the first failure
    fn on_file_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        let _ = (index, total, path, error);
    }

    /// Called once after every candidate has been attempted.
    fn on_batch_complete(&self, total_candidates: usize, success_count: usize) {
        let _ = (total_candidates, success_count);
    }
}

/// A no-op implementation. This is the default when no callback is set.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        batch_total: AtomicUsize,
        batch_success: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_candidates: usize) {
            self.batch_total.store(total_candidates, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _path: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _path: &Path) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _index: usize, _total: usize, _path: &Path, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total_candidates: usize, success_count: usize) {
            self.batch_success.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let p = Path::new("a/report.pdf");
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, p);
        cb.on_file_complete(1, 2, p);
        cb.on_file_error(2, 2, p, "boom");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let p = Path::new("a/report.pdf");

        tracker.on_batch_start(2);
        tracker.on_file_start(1, 2, p);
        tracker.on_file_complete(1, 2, p);
        tracker.on_file_start(2, 2, p);
        tracker.on_file_error(2, 2, p, "OCR tool exited with status 2");
        tracker.on_batch_complete(2, 1);

        assert_eq!(tracker.batch_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.batch_success.load(Ordering::SeqCst), 1);
    }
}
