//! Progress-callback trait for per-archive conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through a batch.
//!
//! The callback approach keeps the library agnostic of how the host
//! application communicates: a GUI can forward events to its widget loop,
//! the CLI drives a terminal progress bar, tests count invocations. The
//! trait is `Send + Sync` because archives are converted concurrently in
//! batch mode, and every method has a no-op default so callers only
//! override what they care about. The pipeline works identically with no
//! observer attached.
//!
//! Each per-archive event carries the `(completed, total)` counter pair and
//! the archive's file name as a label. `completed` is monotonically
//! non-decreasing and reaches `total` once every archive has been attempted;
//! in concurrent mode events for different archives may interleave in any
//! order.

use std::sync::Arc;

/// Called by the conversion pipeline as it processes archives.
///
/// # Thread safety
///
/// In concurrent batch mode `on_archive_start`, `on_archive_complete`, and
/// `on_archive_error` may be called from different worker threads.
/// Implementations must protect shared mutable state (e.g. `Mutex`,
/// `AtomicUsize`).
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any archive in a batch is processed.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before an archive's conversion begins.
    ///
    /// `completed` is the number of archives finished so far.
    fn on_archive_start(&self, completed: usize, total: usize, archive: &str) {
        let _ = (completed, total, archive);
    }

    /// Called when an archive converted successfully.
    fn on_archive_complete(&self, completed: usize, total: usize, archive: &str) {
        let _ = (completed, total, archive);
    }

    /// Called when an archive's conversion failed.
    fn on_archive_error(&self, completed: usize, total: usize, archive: &str, error: &str) {
        let _ = (completed, total, archive, error);
    }

    /// Called once after every archive in a batch has been attempted.
    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
