//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! Converting sprite.png (1.5 KB)...
//! Detected format: png
//! Image has transparency, optimizing transparent areas...
//! Resized 64x64 -> 32x32
//! Sampling pixels [==================================================] 100.0% ETA: 0s
//! Finding blocks [==================================================] 100.0% ETA: 0s
//! Writing SVG [==================================================] 100.0% ETA: 0s
//! Optimized: skipped 212 transparent pixels
//! Wrote sprite.svg
//!
//! Conversion complete
//!     Input:  sprite.png (1.5 KB)
//!     Output: sprite.svg (6.2 KB)
//!     Size:   313.3% of original
//!     Image:  32x32 (1024 pixels)
//!     Blocks: 97 (10.6 pixels per block)
//! ```
//!
//! Quiet mode drops everything above the summary and prints one line:
//!
//! ```text
//! sprite.png -> sprite.svg (97 blocks, 6.2 KB)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. [`ConsoleReporter`] is the
//! only stateful piece; it routes pipeline events to stdout and progress to
//! stderr.

use crate::convert::{ConversionReport, ConvertEvent, ImageInfo, Reporter};
use crate::progress::{Progress, ProgressBar, Stage};
use std::io::{self, Stderr};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Shared helpers
// ============================================================================

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// Human-readable size, 1024-based.
///
/// ```
/// # use pixel2svg::output::format_file_size;
/// assert_eq!(format_file_size(512), "512 bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} bytes")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else {
        format!("{:.1} GB", b / GB)
    }
}

/// Output size as a percentage of input size; 0 when the input is empty.
pub fn size_percent(input_bytes: u64, output_bytes: u64) -> f64 {
    if input_bytes == 0 {
        0.0
    } else {
        output_bytes as f64 / input_bytes as f64 * 100.0
    }
}

/// Average pixels covered per emitted block.
pub fn compression_ratio(pixels: u64, blocks: usize) -> Option<f64> {
    (blocks > 0).then(|| pixels as f64 / blocks as f64)
}

/// File name for display, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Convert output
// ============================================================================

/// Format a single pipeline event as display lines.
pub fn format_convert_event(event: &ConvertEvent) -> Vec<String> {
    match event {
        ConvertEvent::Started { input, bytes } => vec![format!(
            "Converting {} ({})...",
            display_name(input),
            format_file_size(*bytes)
        )],
        ConvertEvent::Decoded {
            format,
            has_transparency,
            ..
        } => {
            let mut lines = vec![format!("Detected format: {format}")];
            if *has_transparency {
                lines.push("Image has transparency, optimizing transparent areas...".to_string());
            }
            lines
        }
        ConvertEvent::Resized { from, to } => vec![format!(
            "Resized {}x{} -> {}x{}",
            from.0, from.1, to.0, to.1
        )],
        ConvertEvent::TransparentSkipped { pixels } => {
            vec![format!("Optimized: skipped {pixels} transparent pixels")]
        }
        ConvertEvent::Written { output, .. } => {
            vec![format!("Wrote {}", output.display())]
        }
    }
}

/// Format the end-of-run summary.
pub fn format_summary(report: &ConversionReport) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "Conversion complete".to_string(),
        format!(
            "    Input:  {} ({})",
            report.input.display(),
            format_file_size(report.input_bytes)
        ),
        format!(
            "    Output: {} ({})",
            report.output.display(),
            format_file_size(report.output_bytes)
        ),
        format!(
            "    Size:   {:.1}% of original",
            size_percent(report.input_bytes, report.output_bytes)
        ),
        format!(
            "    Image:  {}x{} ({} pixels)",
            report.width,
            report.height,
            report.pixels()
        ),
    ];
    match compression_ratio(report.pixels(), report.blocks) {
        Some(ratio) => lines.push(format!(
            "    Blocks: {} ({:.1} pixels per block)",
            report.blocks, ratio
        )),
        None => lines.push("    Blocks: 0 (fully transparent)".to_string()),
    }
    lines
}

/// One-line summary for quiet mode.
pub fn format_quiet_summary(report: &ConversionReport) -> String {
    format!(
        "{} -> {} ({} blocks, {})",
        report.input.display(),
        report.output.display(),
        report.blocks,
        format_file_size(report.output_bytes)
    )
}

pub fn print_summary(report: &ConversionReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

pub fn print_quiet_summary(report: &ConversionReport) {
    println!("{}", format_quiet_summary(report));
}

// ============================================================================
// Check output
// ============================================================================

/// Format what `check` found out about an input.
pub fn format_check_output(info: &ImageInfo) -> Vec<String> {
    let mut lines = vec![
        display_name(&info.path),
        format!("    Size:         {}", format_file_size(info.file_bytes)),
        format!("    Format:       {}", info.format),
        format!("    Dimensions:   {}x{}", info.original.0, info.original.1),
    ];
    if info.target != info.original {
        lines.push(format!(
            "    Resized to:   {}x{}",
            info.target.0, info.target.1
        ));
    }
    lines.push(format!("    Pixels:       {}", info.pixels()));
    lines.push(format!(
        "    Transparency: {}",
        if info.has_transparency { "yes" } else { "no" }
    ));
    lines
}

pub fn print_check_output(info: &ImageInfo) {
    for line in format_check_output(info) {
        println!("{}", line);
    }
}

// ============================================================================
// Console reporter
// ============================================================================

/// Prints pipeline events to stdout and draws progress on stderr.
///
/// With `quiet` set nothing is written by the reporter at all; the caller
/// prints the one-line summary instead.
pub struct ConsoleReporter {
    quiet: bool,
    bar: ProgressBar<Stderr>,
}

impl ConsoleReporter {
    pub fn new(quiet: bool, interval: Duration) -> Self {
        Self {
            quiet,
            bar: ProgressBar::new(io::stderr(), quiet, interval),
        }
    }
}

impl Progress for ConsoleReporter {
    fn begin(&mut self, stage: Stage, total: u64) {
        self.bar.begin(stage, total);
    }

    fn advance(&mut self, units: u64) {
        self.bar.advance(units);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}

impl Reporter for ConsoleReporter {
    fn notify(&mut self, event: &ConvertEvent) {
        if self.quiet {
            return;
        }
        for line in format_convert_event(event) {
            println!("{}", line);
        }
    }
}
