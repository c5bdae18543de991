//! Archive extraction: unpack a comic container into a destination directory.
//!
//! The container kind is chosen by the file extension alone — `.cbz` is a
//! plain ZIP and `.cbr` a plain RAR, so no content sniffing is needed.
//! Entry paths are sanitised before writing: a hostile archive must not be
//! able to place files outside the destination directory via `..` segments
//! or absolute paths.

use crate::error::ConversionError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Container family selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.cbz` / `.zip`
    Zip,
    /// `.cbr` / `.rar`
    Rar,
}

/// Detect the container kind from the path's extension (case-insensitive).
///
/// Returns `None` for anything outside the recognised set.
pub fn detect_kind(path: &Path) -> Option<ArchiveKind> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "cbz" | "zip" => Some(ArchiveKind::Zip),
        "cbr" | "rar" => Some(ArchiveKind::Rar),
        _ => None,
    }
}

/// Extract all entries of `archive` into `dest`, creating `dest` (and
/// parents) if absent. Returns the number of files written.
///
/// Entries that would escape `dest` are skipped with a warning rather than
/// failing the archive. A malformed or unreadable container fails with
/// [`ConversionError::CorruptArchive`]; an unusable destination directory
/// is an environment problem, reported as
/// [`ConversionError::WorkspaceFailed`].
pub fn extract(archive: &Path, kind: ArchiveKind, dest: &Path) -> Result<usize, ConversionError> {
    std::fs::create_dir_all(dest).map_err(|source| ConversionError::WorkspaceFailed { source })?;

    let count = match kind {
        ArchiveKind::Zip => extract_zip(archive, dest)?,
        ArchiveKind::Rar => extract_rar(archive, dest)?,
    };

    info!(?archive, extracted_count = count, "archive extracted");
    Ok(count)
}

fn corrupt(archive: &Path, reason: impl std::fmt::Display) -> ConversionError {
    ConversionError::CorruptArchive {
        path: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize, ConversionError> {
    debug!(?archive_path, ?dest, "extracting ZIP container");

    let file = std::fs::File::open(archive_path)
        .map_err(|e| corrupt(archive_path, format!("failed to open archive: {e}")))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| corrupt(archive_path, format!("failed to read ZIP archive: {e}")))?;

    let mut extracted = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| corrupt(archive_path, format!("failed to read ZIP entry: {e}")))?;

        // enclosed_name rejects absolute paths and `..` traversal segments.
        let entry_path = match entry.enclosed_name() {
            Some(p) => dest.join(p),
            None => {
                warn!(entry = entry.name(), "skipping entry with unsafe path");
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&entry_path)
                .map_err(|e| corrupt(archive_path, format!("failed to create directory: {e}")))?;
            continue;
        }

        if let Some(parent) = entry_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                corrupt(archive_path, format!("failed to create parent directories: {e}"))
            })?;
        }

        let mut outfile = std::fs::File::create(&entry_path)
            .map_err(|e| corrupt(archive_path, format!("failed to create output file: {e}")))?;

        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| corrupt(archive_path, format!("failed to extract entry: {e}")))?;

        extracted += 1;
    }

    Ok(extracted)
}

fn extract_rar(archive_path: &Path, dest: &Path) -> Result<usize, ConversionError> {
    debug!(?archive_path, ?dest, "extracting RAR container");

    let processor = unrar::Archive::new(archive_path)
        .open_for_processing()
        .map_err(|e| corrupt(archive_path, e))?;

    let mut extracted = 0usize;

    // Process each entry using the state machine interface.
    let mut at_header = processor;
    loop {
        let at_file = match at_header.read_header() {
            Ok(Some(entry_processor)) => entry_processor,
            Ok(None) => break, // no more entries
            Err(e) => return Err(corrupt(archive_path, e)),
        };

        let header = at_file.entry();

        // Drop `..` and root components so entries cannot escape `dest`.
        let sanitized = Path::new(&header.filename)
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .collect::<PathBuf>();

        if sanitized.as_os_str().is_empty() {
            warn!(entry = %header.filename.display(), "skipping entry with unsafe path");
            at_header = at_file
                .skip()
                .map_err(|e| corrupt(archive_path, format!("failed to skip unsafe entry: {e}")))?;
            continue;
        }

        let entry_path = dest.join(&sanitized);

        if header.is_directory() {
            at_header = at_file
                .skip()
                .map_err(|e| corrupt(archive_path, format!("failed to skip directory: {e}")))?;
            continue;
        }

        at_header = at_file
            .extract_to(&entry_path)
            .map_err(|e| corrupt(archive_path, e))?;
        extracted += 1;
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detect_kind_recognised_extensions() {
        assert_eq!(detect_kind(Path::new("a.cbz")), Some(ArchiveKind::Zip));
        assert_eq!(detect_kind(Path::new("a.zip")), Some(ArchiveKind::Zip));
        assert_eq!(detect_kind(Path::new("a.cbr")), Some(ArchiveKind::Rar));
        assert_eq!(detect_kind(Path::new("a.rar")), Some(ArchiveKind::Rar));
    }

    #[test]
    fn detect_kind_is_case_insensitive() {
        assert_eq!(detect_kind(Path::new("A.CBZ")), Some(ArchiveKind::Zip));
        assert_eq!(detect_kind(Path::new("B.CbR")), Some(ArchiveKind::Rar));
    }

    #[test]
    fn detect_kind_rejects_unknown() {
        assert_eq!(detect_kind(Path::new("a.txt")), None);
        assert_eq!(detect_kind(Path::new("a.7z")), None);
        assert_eq!(detect_kind(Path::new("noext")), None);
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extract_zip_writes_nested_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("issue.cbz");
        write_zip(
            &archive,
            &[("p01.jpg", b"one".as_ref()), ("sub/p02.jpg", b"two".as_ref())],
        );

        let dest = tmp.path().join("out");
        let count = extract(&archive, ArchiveKind::Zip, &dest).unwrap();
        assert_eq!(count, 2);
        assert!(dest.join("p01.jpg").is_file());
        assert!(dest.join("sub/p02.jpg").is_file());
    }

    #[test]
    fn extract_zip_skips_traversal_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("evil.cbz");
        write_zip(
            &archive,
            &[("../evil.txt", b"x".as_ref()), ("ok.jpg", b"y".as_ref())],
        );

        let dest = tmp.path().join("out");
        let count = extract(&archive, ArchiveKind::Zip, &dest).unwrap();
        assert_eq!(count, 1);
        assert!(dest.join("ok.jpg").is_file());
        assert!(!tmp.path().join("evil.txt").exists());
    }

    #[test]
    fn extract_garbage_zip_is_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("broken.cbz");
        std::fs::write(&archive, b"this is not a zip file").unwrap();

        let err = extract(&archive, ArchiveKind::Zip, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, ConversionError::CorruptArchive { .. }));
    }

    #[test]
    fn unusable_destination_is_a_workspace_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("issue.cbz");
        write_zip(&archive, &[("p01.jpg", b"one".as_ref())]);

        // A file squatting on the destination path makes create_dir_all fail.
        let dest = tmp.path().join("out");
        std::fs::write(&dest, b"in the way").unwrap();

        let err = extract(&archive, ArchiveKind::Zip, &dest).unwrap_err();
        assert!(matches!(err, ConversionError::WorkspaceFailed { .. }));
    }

    #[test]
    fn extract_missing_file_is_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract(
            &tmp.path().join("missing.cbz"),
            ArchiveKind::Zip,
            &tmp.path().join("out"),
        )
        .unwrap_err();
        assert!(matches!(err, ConversionError::CorruptArchive { .. }));
    }
}
