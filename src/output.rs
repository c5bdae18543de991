//! Result types for single-archive and batch conversions.

use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Successful outcome of converting one archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The source archive.
    pub archive: PathBuf,
    /// The written PDF.
    pub pdf: PathBuf,
    /// Pages in the output PDF (one per successfully decoded image).
    pub pages: usize,
    /// Images that were discovered but failed to decode and were skipped.
    pub skipped_images: usize,
    /// Wall-clock time for this archive's full pipeline.
    pub duration_ms: u64,
}

/// Per-archive entry in a batch: the archive plus its success or failure.
///
/// Failures never abort the batch; they are collected here so callers can
/// report them after every archive has been attempted.
#[derive(Debug)]
pub struct ConversionReport {
    pub archive: PathBuf,
    pub outcome: Result<ConversionOutput, ConversionError>,
}

impl ConversionReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Aggregate outcome of a directory batch.
#[derive(Debug)]
pub struct BatchSummary {
    /// One report per attempted archive, sorted by archive path.
    pub reports: Vec<ConversionReport>,
    /// Archives attempted (always equals `reports.len()`).
    pub attempted: usize,
    /// Archives that produced a PDF.
    pub succeeded: usize,
    /// Archives that failed.
    pub failed: usize,
    /// Wall-clock time for the whole batch.
    pub total_duration_ms: u64,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
