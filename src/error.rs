//! Error types for the comic2pdf library.
//!
//! Every variant of [`ConversionError`] is fatal *for one archive only*:
//! the batch driver captures it in a [`crate::output::ConversionReport`]
//! and carries on with the remaining archives. Per-image decode failures
//! inside one archive are even less severe — the assembler logs a warning,
//! skips the image, and only fails with [`ConversionError::NoDecodableImages`]
//! when not a single page could be decoded.
//!
//! [`ErrorKind`] is the serialisable classification used in batch reports
//! and `--json` output, so callers can aggregate failures without parsing
//! display strings.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned when converting a single comic archive.
#[derive(Debug, Error)]
pub enum ConversionError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input extension is not a recognised comic container.
    #[error("Unsupported format: '{path}'\nRecognised extensions: .cbz, .zip, .cbr, .rar")]
    UnsupportedFormat { path: PathBuf },

    /// Extraction failed: bad container, unreadable file, or a broken entry.
    #[error("Corrupt or unreadable archive '{path}': {reason}")]
    CorruptArchive { path: PathBuf, reason: String },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// Extraction succeeded but the archive contains no recognised images.
    #[error("No image files found in '{path}'")]
    NoImagesFound { path: PathBuf },

    /// Every discovered image failed to decode; the PDF would be empty.
    #[error("None of the {attempted} images in '{path}' could be decoded")]
    NoDecodableImages { path: PathBuf, attempted: usize },

    /// Could not write the output PDF (I/O, permissions, disk space).
    /// A partially written `.pdf.tmp` never replaces the final output.
    #[error("Failed to write output PDF '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Environment errors ────────────────────────────────────────────────
    /// Could not create the per-conversion extraction workspace.
    #[error("Failed to create extraction workspace: {source}")]
    WorkspaceFailed {
        #[source]
        source: std::io::Error,
    },

    /// Could not list the batch input directory.
    #[error("Failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a panicked worker task).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    /// Stable classification for report aggregation and JSON output.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ConversionError::CorruptArchive { .. } => ErrorKind::CorruptArchive,
            ConversionError::NoImagesFound { .. } => ErrorKind::NoImagesFound,
            ConversionError::NoDecodableImages { .. } => ErrorKind::NoDecodableImages,
            ConversionError::WriteFailed { .. } => ErrorKind::WriteFailed,
            ConversionError::WorkspaceFailed { .. } => ErrorKind::Workspace,
            ConversionError::DirectoryRead { .. } => ErrorKind::DirectoryRead,
            ConversionError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            ConversionError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Serialisable error classification carried in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    CorruptArchive,
    NoImagesFound,
    NoDecodableImages,
    WriteFailed,
    Workspace,
    DirectoryRead,
    InvalidConfig,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display_names_extensions() {
        let e = ConversionError::UnsupportedFormat {
            path: PathBuf::from("notes.txt"),
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"), "got: {msg}");
        assert!(msg.contains(".cbz"), "got: {msg}");
    }

    #[test]
    fn corrupt_archive_carries_reason() {
        let e = ConversionError::CorruptArchive {
            path: PathBuf::from("issue-01.cbz"),
            reason: "invalid Zip archive".into(),
        };
        assert!(e.to_string().contains("invalid Zip archive"));
    }

    #[test]
    fn no_decodable_images_counts_attempts() {
        let e = ConversionError::NoDecodableImages {
            path: PathBuf::from("issue-01.cbz"),
            attempted: 12,
        };
        assert!(e.to_string().contains("12"));
    }

    #[test]
    fn kind_matches_variant() {
        let e = ConversionError::NoImagesFound {
            path: PathBuf::from("x.cbz"),
        };
        assert_eq!(e.kind(), ErrorKind::NoImagesFound);

        let e = ConversionError::WriteFailed {
            path: PathBuf::from("x.pdf"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(e.kind(), ErrorKind::WriteFailed);
    }
}
