//! Pipeline stages for comic-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. add another container format) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ collect ──▶ assemble
//! (zip/rar)   (ordered     (decode, RGB,
//!              image walk)  multi-page PDF)
//! ```
//!
//! 1. [`extract`]  — unpack the archive into a per-conversion workspace;
//!    container kind is chosen by file extension
//! 2. [`collect`]  — recursively gather image files and sort them by path,
//!    which becomes the page order
//! 3. [`assemble`] — decode each image, normalise to RGB, and write one
//!    PDF page per image at a fixed 100 DPI
//!
//! All three stages are blocking; the orchestrator in [`crate::convert`]
//! runs them inside `tokio::task::spawn_blocking`.

pub mod assemble;
pub mod collect;
pub mod extract;
