//! Conversion entry points: one archive, or a directory batch.
//!
//! [`convert_file`] is the orchestrator for a single archive: it validates
//! the extension, acquires a unique extraction workspace, runs
//! Extract → Collect → Assemble, and guarantees workspace removal on every
//! exit path. [`convert_directory`] drives the orchestrator over a
//! directory of archives, sequentially or through a bounded worker pool,
//! collecting failures instead of aborting on them.
//!
//! ## Why `spawn_blocking`?
//!
//! Extraction, image decoding, and PDF writing are blocking CPU/I-O work.
//! Each archive runs as one unit on tokio's blocking pool, keeping the
//! async workers free; the bounded `buffer_unordered` stream caps how many
//! such units are in flight at once.

use crate::config::ConversionConfig;
use crate::error::ConversionError;
use crate::output::{BatchSummary, ConversionOutput, ConversionReport};
use crate::pipeline::{assemble, collect, extract};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a single comic archive to a PDF.
///
/// This is the primary single-file entry point. The output PDF is written
/// to `config.output_dir` (created if needed) or next to the archive, named
/// `<archive-basename>.pdf`.
///
/// # Errors
/// Returns [`ConversionError`] when the archive cannot be converted:
/// unrecognised extension, corrupt container, no images, no decodable
/// images, or an output write failure. The extraction workspace is removed
/// in every case.
pub async fn convert_file(
    archive: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConversionError> {
    let archive = archive.as_ref().to_path_buf();
    let label = archive_label(&archive);

    if let Some(ref cb) = config.progress_callback {
        cb.on_archive_start(0, 1, &label);
    }

    let result = convert_archive(&archive, config).await;

    if let Some(ref cb) = config.progress_callback {
        match &result {
            Ok(_) => cb.on_archive_complete(1, 1, &label),
            Err(e) => cb.on_archive_error(1, 1, &label, &e.to_string()),
        }
    }

    result
}

/// Synchronous wrapper around [`convert_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_file_sync(
    archive: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConversionError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConversionError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert_file(archive, config))
}

/// Convert every comic archive in the immediate entries of `dir`.
///
/// Archives are discovered non-recursively, sorted by path for a
/// deterministic processing order, and converted either sequentially or
/// through a bounded worker pool of `config.concurrency` archives at a
/// time. A failure in one archive never prevents the others from being
/// attempted; per-archive outcomes are collected into the returned
/// [`BatchSummary`], sorted by archive path.
///
/// A directory containing no recognised archives yields an empty summary,
/// not an error.
pub async fn convert_directory(
    dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchSummary, ConversionError> {
    let dir = dir.as_ref();
    let batch_start = Instant::now();

    let archives = list_archives(dir)?;
    let total = archives.len();
    info!(dir = ?dir, total, "starting batch conversion");

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // The only cross-worker shared state: a monotonic completion counter.
    let completed = Arc::new(AtomicUsize::new(0));

    let mut reports: Vec<ConversionReport> = if config.sequential {
        let mut reports = Vec::with_capacity(total);
        for archive in archives {
            reports.push(convert_batch_entry(archive, config, &completed, total).await);
        }
        reports
    } else {
        stream::iter(archives.into_iter().map(|archive| {
            let config = config.clone();
            let completed = Arc::clone(&completed);
            async move { convert_batch_entry(archive, &config, &completed, total).await }
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await
    };

    // Completion order is unspecified in concurrent mode; report order is not.
    reports.sort_by(|a, b| a.archive.cmp(&b.archive));

    let succeeded = reports.iter().filter(|r| r.succeeded()).count();
    let failed = reports.len() - succeeded;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, succeeded);
    }

    info!(
        total,
        succeeded,
        failed,
        duration_ms = batch_start.elapsed().as_millis() as u64,
        "batch conversion finished"
    );

    Ok(BatchSummary {
        reports,
        attempted: total,
        succeeded,
        failed,
        total_duration_ms: batch_start.elapsed().as_millis() as u64,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// One batch unit: convert an archive and emit progress events around it.
async fn convert_batch_entry(
    archive: PathBuf,
    config: &ConversionConfig,
    completed: &AtomicUsize,
    total: usize,
) -> ConversionReport {
    let label = archive_label(&archive);

    if let Some(ref cb) = config.progress_callback {
        cb.on_archive_start(completed.load(Ordering::SeqCst), total, &label);
    }

    let outcome = convert_archive(&archive, config).await;
    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

    match &outcome {
        Ok(output) => {
            info!(archive = ?archive, pdf = ?output.pdf, pages = output.pages, "converted");
            if let Some(ref cb) = config.progress_callback {
                cb.on_archive_complete(done, total, &label);
            }
        }
        Err(e) => {
            warn!(archive = ?archive, error = %e, "conversion failed");
            if let Some(ref cb) = config.progress_callback {
                cb.on_archive_error(done, total, &label, &e.to_string());
            }
        }
    }

    ConversionReport { archive, outcome }
}

/// The full single-archive pipeline, without progress events.
async fn convert_archive(
    archive: &Path,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConversionError> {
    let start = Instant::now();

    // Reject unsupported extensions before touching the file.
    let kind = extract::detect_kind(archive).ok_or_else(|| ConversionError::UnsupportedFormat {
        path: archive.to_path_buf(),
    })?;

    let stem = archive
        .file_stem()
        .ok_or_else(|| ConversionError::UnsupportedFormat {
            path: archive.to_path_buf(),
        })?
        .to_string_lossy()
        .into_owned();

    let output_dir = match &config.output_dir {
        Some(dir) => dir.clone(),
        // Relative bare filenames have an empty parent; treat it as cwd.
        None => match archive.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };
    let output_path = output_dir.join(format!("{stem}.pdf"));

    debug!(archive = ?archive, ?kind, output = ?output_path, "starting conversion");

    let archive_owned = archive.to_path_buf();
    let pdf_path = output_path.clone();
    let quality = config.jpeg_quality;
    let stats = tokio::task::spawn_blocking(move || {
        convert_blocking(&archive_owned, kind, &output_dir, &output_path, &stem, quality)
    })
    .await
    .map_err(|e| ConversionError::Internal(format!("conversion task panicked: {e}")))??;

    Ok(ConversionOutput {
        archive: archive.to_path_buf(),
        pdf: pdf_path,
        pages: stats.pages,
        skipped_images: stats.skipped,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Blocking pipeline body: workspace, extract, collect, assemble.
///
/// The `TempDir` workspace is uniquely named per invocation (safe under
/// concurrent batch workers) and recursively deleted when it drops — on
/// success, on early return, and during unwind.
fn convert_blocking(
    archive: &Path,
    kind: extract::ArchiveKind,
    output_dir: &Path,
    output_path: &Path,
    title: &str,
    jpeg_quality: u8,
) -> Result<assemble::AssemblyStats, ConversionError> {
    let workspace = tempfile::Builder::new()
        .prefix("comic2pdf-")
        .tempdir()
        .map_err(|source| ConversionError::WorkspaceFailed { source })?;

    debug!(workspace = ?workspace.path(), "created extraction workspace");

    extract::extract(archive, kind, workspace.path())?;

    let images = collect::collect_images(workspace.path());
    if images.is_empty() {
        return Err(ConversionError::NoImagesFound {
            path: archive.to_path_buf(),
        });
    }

    std::fs::create_dir_all(output_dir).map_err(|source| ConversionError::WriteFailed {
        path: output_path.to_path_buf(),
        source,
    })?;

    assemble::assemble(&images, output_path, title, jpeg_quality)
}

/// Immediate (non-recursive) archive entries of `dir`, sorted by path.
fn list_archives(dir: &Path) -> Result<Vec<PathBuf>, ConversionError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ConversionError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConversionError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && extract::detect_kind(&path).is_some() {
            archives.push(path);
        }
    }

    archives.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(archives)
}

fn archive_label(archive: &Path) -> String {
    archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| archive.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_archives_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.cbz", "a.cbr", "notes.txt", "c.zip"] {
            std::fs::write(tmp.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(tmp.path().join("sub.cbz")).unwrap();

        let archives = list_archives(tmp.path()).unwrap();
        let names: Vec<_> = archives
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.cbr", "b.cbz", "c.zip"]);
    }

    #[test]
    fn list_archives_missing_dir_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = list_archives(&tmp.path().join("missing")).unwrap_err();
        assert!(matches!(err, ConversionError::DirectoryRead { .. }));
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected_before_extraction() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = convert_file(&path, &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedFormat { .. }));
    }

    #[test]
    fn archive_label_uses_file_name() {
        assert_eq!(archive_label(Path::new("/a/b/issue-01.cbz")), "issue-01.cbz");
    }
}
