//! Image collection: recursively gather page images in deterministic order.
//!
//! Archive creators typically name pages with zero-padded sequence numbers,
//! so a lexicographic sort of the full path approximates reading order.
//! This is a deliberate, simple policy — not a guarantee of semantic page
//! order for archives with inconsistent naming — and it stays stable across
//! runs given identical archive contents. A single recursive walk also
//! handles archives that wrap all pages in one nested folder, at any depth.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Raster formats accepted as pages, matched case-insensitively on the
/// file extension.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"];

/// Recursively collect image files under `root`, sorted ascending by full
/// path. The returned order becomes page order in the output PDF.
///
/// An empty result is a valid outcome; the orchestrator decides whether
/// that constitutes a failure.
pub fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_image(path))
        .collect();

    // Compare whole paths as strings, not component-wise, so page order is
    // exactly the lexicographic order of the normalised path.
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    debug!(root = ?root, count = files.len(), "collected image files");
    files
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn collects_only_image_extensions() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("p01.jpg"));
        touch(&tmp.path().join("p02.PNG"));
        touch(&tmp.path().join("info.txt"));
        touch(&tmp.path().join("thumbs.db"));

        let images = collect_images(tmp.path());
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|p| is_image(p)));
    }

    #[test]
    fn order_is_lexicographic_on_full_path() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("p10.jpg"));
        touch(&tmp.path().join("p02.jpg"));
        touch(&tmp.path().join("p01.jpg"));

        let images = collect_images(tmp.path());
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["p01.jpg", "p02.jpg", "p10.jpg"]);
    }

    #[test]
    fn descends_into_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("wrapper/chapter/p01.jpg"));
        touch(&tmp.path().join("wrapper/chapter/p02.jpg"));
        touch(&tmp.path().join("cover.png"));

        let images = collect_images(tmp.path());
        assert_eq!(images.len(), 3);
        // cover.png sorts before wrapper/... because the full path compares.
        assert!(images[0].ends_with("cover.png"));
    }

    #[test]
    fn empty_directory_yields_empty_result() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(collect_images(tmp.path()).is_empty());
    }

    #[test]
    fn files_without_extension_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("README"));
        assert!(collect_images(tmp.path()).is_empty());
    }
}
