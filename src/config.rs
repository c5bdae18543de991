//! Configuration types for comic-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across worker tasks and to diff two runs to
//! understand why their outputs differ.

use crate::error::ConversionError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for converting comic archives to PDF.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use comic2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .concurrency(4)
///     .jpeg_quality(85)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory for output PDFs. If `None`, each PDF is written next to
    /// its source archive.
    pub output_dir: Option<PathBuf>,

    /// Number of archives converted in parallel in batch mode.
    /// Default: available parallelism (fallback 4).
    ///
    /// Each archive is an independent unit of work (extract, decode, write)
    /// running on the blocking thread pool, so the useful ceiling is the
    /// machine's core count. Raising it further only multiplies peak disk
    /// usage from concurrent extraction workspaces.
    pub concurrency: usize,

    /// Process a batch one archive at a time instead of concurrently.
    /// Default: false.
    pub sequential: bool,

    /// JPEG quality (1–100) used when re-encoding pages into the PDF.
    /// Default: 90.
    ///
    /// Page content is stored DCT-compressed. 90 is visually lossless for
    /// scanned comic art while keeping output well below the size of a
    /// losslessly embedded equivalent.
    pub jpeg_quality: u8,

    /// Optional observer receiving per-archive progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            concurrency: default_concurrency(),
            sequential: false,
            jpeg_quality: 90,
            progress_callback: None,
        }
    }
}

/// Available parallelism, falling back to 4 when it cannot be queried.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("concurrency", &self.concurrency)
            .field("sequential", &self.sequential)
            .field("jpeg_quality", &self.jpeg_quality)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn sequential(mut self, v: bool) -> Self {
        self.config.sequential = v;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConversionError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(ConversionError::InvalidConfig(
                "concurrency must be ≥ 1".into(),
            ));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(ConversionError::InvalidConfig(format!(
                "jpeg_quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = ConversionConfig::default();
        assert!(c.concurrency >= 1);
        assert_eq!(c.jpeg_quality, 90);
        assert!(!c.sequential);
        assert!(c.output_dir.is_none());
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ConversionConfig::builder()
            .concurrency(0)
            .jpeg_quality(200)
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.jpeg_quality, 100);
    }

    #[test]
    fn builder_sets_output_dir() {
        let c = ConversionConfig::builder()
            .output_dir("/tmp/out")
            .sequential(true)
            .build()
            .unwrap();
        assert_eq!(c.output_dir.as_deref(), Some(std::path::Path::new("/tmp/out")));
        assert!(c.sequential);
    }
}
