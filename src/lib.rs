//! # comic2pdf
//!
//! Convert comic-book archives (CBZ/ZIP, CBR/RAR) into single PDF
//! documents, one PDF per archive, preserving page order.
//!
//! ## Pipeline Overview
//!
//! ```text
//! archive (.cbz/.cbr)
//!  │
//!  ├─ 1. Extract   unpack into a unique temp workspace (zip / unrar)
//!  ├─ 2. Collect   recursive walk, images sorted by path = page order
//!  ├─ 3. Assemble  decode → force RGB → one PDF page per image @ 100 DPI
//!  └─ 4. Output    <archive-basename>.pdf beside the input (or --output-dir)
//! ```
//!
//! The workspace is removed on every exit path, success or failure. In
//! batch mode archives are converted through a bounded worker pool; a
//! failure in one archive never stops the others.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use comic2pdf::{convert_file, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert_file("issue-01.cbz", &config).await?;
//!     println!("{} pages → {}", output.pages, output.pdf.display());
//!     Ok(())
//! }
//! ```
//!
//! Batch conversion with progress events:
//!
//! ```rust,no_run
//! use comic2pdf::{convert_directory, ConversionConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConversionConfig::builder().concurrency(4).build()?;
//! let summary = convert_directory("./comics", &config).await?;
//! eprintln!("{}/{} succeeded", summary.succeeded, summary.attempted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Page ordering
//!
//! Pages are ordered by the lexicographic sort of their full extracted
//! paths. Archive creators typically zero-pad page numbers, so this
//! approximates reading order; it is a deliberate simple policy, not a
//! semantic guarantee for inconsistently named archives.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `comic2pdf` binary (clap + anyhow + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! comic2pdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_directory, convert_file, convert_file_sync};
pub use error::{ConversionError, ErrorKind};
pub use output::{BatchSummary, ConversionOutput, ConversionReport};
pub use pipeline::extract::ArchiveKind;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
