//! CLI binary for comic2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use comic2pdf::{
    convert_directory, convert_file, ConversionConfig, ConversionProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-archive
/// log lines using [indicatif]. Designed to work correctly when archives
/// complete out-of-order (concurrent batch mode).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set by
    /// `on_batch_start` (single-file mode never resizes past 1).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(1);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} archives  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total} archive(s)…"))
        ));
    }

    fn on_archive_start(&self, _completed: usize, _total: usize, archive: &str) {
        self.bar.set_message(archive.to_string());
    }

    fn on_archive_complete(&self, completed: usize, total: usize, archive: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            completed,
            total,
            archive,
        ));
        self.bar.inc(1);
    }

    fn on_archive_error(&self, completed: usize, total: usize, archive: &str, error: &str) {
        // Keep one-line diagnostics tidy; the full error went to tracing.
        let first_line = error.lines().next().unwrap_or(error);
        let msg = truncate_line(first_line, 100);

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            completed,
            total,
            archive,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        let failed = total.saturating_sub(succeeded);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} archive(s) converted successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} archives converted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

/// Truncate `s` to at most `max` characters, appending an ellipsis.
///
/// Counts characters, never byte offsets; error text routinely carries
/// non-ASCII archive paths.
fn truncate_line(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a single archive (PDF written beside it)
  comic2pdf --file issue-01.cbz

  # Convert every archive in a directory, concurrently
  comic2pdf --dir ./comics

  # Collect the PDFs somewhere else
  comic2pdf --dir ./comics --output-dir ./pdfs

  # One archive at a time, machine-readable report
  comic2pdf --dir ./comics --sequential --json

SUPPORTED INPUT FORMATS:
  .cbz  .zip    ZIP-family containers
  .cbr  .rar    RAR-family containers

Page images inside an archive (jpg, jpeg, png, gif, bmp, tiff, webp) are
ordered by the lexicographic sort of their paths — the usual zero-padded
page naming converts in reading order.

EXIT CODE:
  0 only when every attempted conversion succeeded; 1 otherwise.
"#;

/// Convert comic-book archives (CBZ/CBR) to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "comic2pdf",
    version,
    about = "Convert comic-book archives (CBZ/CBR) to PDF",
    long_about = "Convert comic-book archives (.cbz/.zip/.cbr/.rar) into single PDF documents, \
one PDF per archive, preserving page order. Operates on a single file or on every archive \
in a directory, optionally in parallel.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group = clap::ArgGroup::new("input").required(true)
)]
struct Cli {
    /// Convert a single comic archive.
    #[arg(short, long, group = "input")]
    file: Option<PathBuf>,

    /// Convert every comic archive in this directory (non-recursive).
    #[arg(short, long, group = "input")]
    dir: Option<PathBuf>,

    /// Write output PDFs into this directory instead of beside the inputs.
    #[arg(short, long, env = "COMIC2PDF_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Process a directory one archive at a time.
    #[arg(long, env = "COMIC2PDF_SEQUENTIAL")]
    sequential: bool,

    /// Number of archives converted in parallel (default: CPU count).
    #[arg(short, long, env = "COMIC2PDF_CONCURRENCY")]
    concurrency: Option<usize>,

    /// JPEG quality (1-100) for re-encoded pages.
    #[arg(long, env = "COMIC2PDF_JPEG_QUALITY", default_value_t = 90,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Output a structured JSON report instead of human-readable lines.
    #[arg(long, env = "COMIC2PDF_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "COMIC2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "COMIC2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "COMIC2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .sequential(cli.sequential)
        .jpeg_quality(cli.jpeg_quality);
    if let Some(n) = cli.concurrency {
        builder = builder.concurrency(n);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    if let Some(ref dir) = cli.dir {
        run_batch(dir, &cli, &config).await
    } else if let Some(ref file) = cli.file {
        run_single(file, &cli, &config).await
    } else {
        // clap's input group guarantees one of the two is present.
        unreachable!("clap requires --file or --dir")
    }
}

async fn run_single(file: &PathBuf, cli: &Cli, config: &ConversionConfig) -> Result<()> {
    match convert_file(file, config).await {
        Ok(output) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if !cli.quiet {
                eprintln!(
                    "{} {}  {}  {}",
                    green("✔"),
                    bold(&output.pdf.display().to_string()),
                    dim(&format!("{} pages", output.pages)),
                    dim(&format!("{}ms", output.duration_ms)),
                );
                if output.skipped_images > 0 {
                    eprintln!(
                        "   {} {} image(s) could not be decoded and were skipped",
                        cyan("⚠"),
                        output.skipped_images
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "archive": file,
                        "status": "error",
                        "kind": e.kind(),
                        "error": e.to_string(),
                    }))?
                );
                std::process::exit(1);
            }
            Err(e).context(format!("Failed to convert {}", file.display()))
        }
    }
}

async fn run_batch(dir: &PathBuf, cli: &Cli, config: &ConversionConfig) -> Result<()> {
    let summary = convert_directory(dir, config)
        .await
        .with_context(|| format!("Failed to process directory {}", dir.display()))?;

    if cli.json {
        let reports: Vec<_> = summary
            .reports
            .iter()
            .map(|r| match &r.outcome {
                Ok(output) => json!({
                    "archive": r.archive,
                    "status": "ok",
                    "output": output,
                }),
                Err(e) => json!({
                    "archive": r.archive,
                    "status": "error",
                    "kind": e.kind(),
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "attempted": summary.attempted,
                "succeeded": summary.succeeded,
                "failed": summary.failed,
                "total_duration_ms": summary.total_duration_ms,
                "reports": reports,
            }))?
        );
    } else if !cli.quiet {
        if summary.attempted == 0 {
            eprintln!("No comic archives found in {}", dir.display());
        }
        // One confirmation or diagnostic line per archive; the progress
        // callback already printed these live when the bar was active.
        if cli.no_progress {
            for report in &summary.reports {
                match &report.outcome {
                    Ok(output) => eprintln!(
                        "{} {}  {}",
                        green("✔"),
                        output.pdf.display(),
                        dim(&format!("{} pages", output.pages)),
                    ),
                    Err(e) => eprintln!(
                        "{} {}  {}",
                        red("✗"),
                        report.archive.display(),
                        red(e.to_string().lines().next().unwrap_or("")),
                    ),
                }
            }
            eprintln!(
                "{}/{} archives converted in {}ms",
                summary.succeeded, summary.attempted, summary.total_duration_ms
            );
        }
    }

    if !summary.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_line_leaves_short_input_alone() {
        assert_eq!(truncate_line("corrupt archive", 100), "corrupt archive");
    }

    #[test]
    fn truncate_line_caps_long_input_with_ellipsis() {
        let long = "x".repeat(150);
        let out = truncate_line(&long, 100);
        assert_eq!(out.chars().count(), 100);
        assert!(out.ends_with('\u{2026}'));
    }

    #[test]
    fn truncate_line_handles_multibyte_at_the_cut_point() {
        // A multibyte character straddling the old byte-99 cut must not
        // panic the progress callback mid-batch.
        let mut msg = "a".repeat(98);
        msg.push_str("…日本語のパス.cbz");
        let out = truncate_line(&msg, 100);
        assert!(out.chars().count() <= 100);
        assert!(out.ends_with('\u{2026}'));
    }

    #[test]
    fn error_callback_survives_multibyte_messages() {
        let cb = CliProgressCallback::new_dynamic();
        let mut msg = "b".repeat(98);
        msg.push_str("…ファイルが壊れています");
        cb.on_archive_error(1, 2, "日本語.cbz", &msg);
        cb.bar.finish_and_clear();
    }
}
