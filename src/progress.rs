//! Progress reporting for long-running conversion stages.
//!
//! The core stages (grid sampling, decomposition, SVG writing) report
//! "units completed out of total" through the [`Progress`] trait. The
//! signal is advisory: nothing a `Progress` implementation does can change
//! what a stage computes.
//!
//! [`ProgressBar`] is the terminal implementation. It is rate-limited so a
//! conversion of hundreds of millions of pixels does not flood the
//! terminal, and its quiet flag is fixed at construction; the stages never
//! know whether anyone is watching.
//!
//! ```text
//! Sampling pixels [=========================>                        ] 51.2% ETA: 3s
//! ```

use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

/// Width of the rendered bar, in cells.
const BAR_WIDTH: usize = 50;

/// Default minimum delay between two redraws.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// A unit of work that reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building the pixel grid (one unit per pixel).
    Sampling,
    /// Scanning the grid for rectangles (one unit per row).
    Decomposing,
    /// Serializing blocks (one unit per block).
    Writing,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Sampling => "Sampling pixels",
            Stage::Decomposing => "Finding blocks",
            Stage::Writing => "Writing SVG",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receiver of "units completed out of total" signals.
///
/// Calls arrive as `begin`, any number of `advance`, then `finish`, once
/// per stage. Units only ever increase within a stage.
pub trait Progress {
    fn begin(&mut self, stage: Stage, total: u64);
    fn advance(&mut self, units: u64);
    fn finish(&mut self);
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn begin(&mut self, _stage: Stage, _total: u64) {}
    fn advance(&mut self, _units: u64) {}
    fn finish(&mut self) {}
}

/// Rate-limited text progress bar.
pub struct ProgressBar<W: Write> {
    out: W,
    quiet: bool,
    interval: Duration,
    stage: Stage,
    total: u64,
    done: u64,
    started: Instant,
    last_draw: Option<Instant>,
}

impl<W: Write> ProgressBar<W> {
    pub fn new(out: W, quiet: bool, interval: Duration) -> Self {
        Self {
            out,
            quiet,
            interval,
            stage: Stage::Sampling,
            total: 0,
            done: 0,
            started: Instant::now(),
            last_draw: None,
        }
    }

    /// Units completed so far in the current stage.
    pub fn done(&self) -> u64 {
        self.done
    }

    /// Consume the bar and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.done as f64 / self.total as f64 * 100.0).min(100.0)
        }
    }

    fn draw(&mut self) {
        let percent = self.percent();
        let eta = estimate_remaining(percent, self.started.elapsed());
        // The bar is advisory; a broken terminal must not abort a conversion.
        let _ = write!(
            self.out,
            "\r{} {} {:.1}% ETA: {}",
            self.stage,
            render_bar(percent),
            percent,
            format_eta(eta)
        );
        let _ = self.out.flush();
        self.last_draw = Some(Instant::now());
    }
}

impl<W: Write> Progress for ProgressBar<W> {
    fn begin(&mut self, stage: Stage, total: u64) {
        self.stage = stage;
        self.total = total;
        self.done = 0;
        self.started = Instant::now();
        self.last_draw = None;
    }

    fn advance(&mut self, units: u64) {
        if self.quiet {
            return;
        }
        self.done = self.done.saturating_add(units).min(self.total);
        let due = self
            .last_draw
            .is_none_or(|last| last.elapsed() >= self.interval);
        if due || self.done >= self.total {
            self.draw();
        }
    }

    fn finish(&mut self) {
        if self.quiet {
            return;
        }
        let _ = writeln!(
            self.out,
            "\r{} {} 100.0% ETA: 0s",
            self.stage,
            render_bar(100.0)
        );
        let _ = self.out.flush();
    }
}

/// Render a fixed-width bar: `=` for completed cells, `>` at the head.
pub fn render_bar(percent: f64) -> String {
    let completed = ((BAR_WIDTH as f64 * percent / 100.0) as usize).min(BAR_WIDTH);
    let mut bar = String::with_capacity(BAR_WIDTH + 2);
    bar.push('[');
    for i in 0..BAR_WIDTH {
        bar.push(match i {
            i if i < completed => '=',
            i if i == completed => '>',
            _ => ' ',
        });
    }
    bar.push(']');
    bar
}

/// Linear extrapolation of the remaining time from the elapsed time.
pub fn estimate_remaining(percent: f64, elapsed: Duration) -> Duration {
    if percent <= 0.0 {
        return Duration::ZERO;
    }
    let total = elapsed.as_secs_f64() / percent * 100.0;
    Duration::from_secs_f64((total - elapsed.as_secs_f64()).max(0.0))
}

/// Format a duration rounded to whole seconds: `42s`, `3m05s`, `1h02m`.
pub fn format_eta(eta: Duration) -> String {
    let secs = eta.as_secs_f64().round() as u64;
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m{:02}s", s / 60, s % 60),
        s => format!("{}h{:02}m", s / 3600, (s % 3600) / 60),
    }
}
