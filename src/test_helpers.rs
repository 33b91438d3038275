//! Shared test utilities for the pixel2svg test suite.
//!
//! Provides grid builders, a deterministic pseudo-random grid generator,
//! a progress recorder, and the partition assertion that checks the
//! coverage invariant of a decomposition.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let grid = grid_from_rows(&["AAB", "AAB"], &palette());
//! let result = decompose(&grid, Transparency::Omit, &mut NoProgress);
//! assert_partition(&grid, &result, Transparency::Omit);
//! ```

use crate::decompose::Decomposition;
use crate::grid::PixelGrid;
use crate::progress::{Progress, Stage};
use crate::types::{Rgba, Transparency};
use std::collections::HashMap;

// =========================================================================
// Grid builders
// =========================================================================

/// Letter → colour mapping used by [`grid_from_rows`].
///
/// `.` is fully transparent; `h` is half-transparent red.
pub fn palette() -> HashMap<char, Rgba> {
    HashMap::from([
        ('A', Rgba::opaque(0xff, 0x00, 0x00)),
        ('B', Rgba::opaque(0x00, 0xff, 0x00)),
        ('C', Rgba::opaque(0x00, 0x00, 0xff)),
        ('D', Rgba::opaque(0x12, 0x34, 0x56)),
        ('h', Rgba::new(0xff, 0x00, 0x00, 0x80)),
        ('.', Rgba::new(0, 0, 0, 0)),
    ])
}

/// Build a grid from ASCII rows. Panics on ragged rows or unknown letters.
pub fn grid_from_rows(rows: &[&str], palette: &HashMap<char, Rgba>) -> PixelGrid {
    let width = rows[0].chars().count() as u32;
    let mut pixels = Vec::new();
    for row in rows {
        assert_eq!(row.chars().count() as u32, width, "ragged row {row:?}");
        for c in row.chars() {
            let color = palette
                .get(&c)
                .unwrap_or_else(|| panic!("no palette entry for {c:?}"));
            pixels.push(*color);
        }
    }
    PixelGrid::from_pixels(width, rows.len() as u32, pixels)
}

/// A grid where horizontally and vertically adjacent cells always differ.
pub fn checkerboard(width: u32, height: u32) -> PixelGrid {
    PixelGrid::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba::opaque(0, 0, 0)
        } else {
            Rgba::opaque(255, 255, 255)
        }
    })
}

/// Deterministic xorshift generator, so "random" tests are reproducible.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// A grid drawn from a small set of colours (including transparent and
/// semi-transparent ones) so that uniform regions of varied shape appear.
pub fn random_grid(width: u32, height: u32, colors: usize, seed: u64) -> PixelGrid {
    let choices = [
        Rgba::opaque(0xff, 0xff, 0xff),
        Rgba::opaque(0x00, 0x00, 0x00),
        Rgba::new(0, 0, 0, 0),
        Rgba::new(0x10, 0x20, 0x30, 0x80),
        Rgba::opaque(0xab, 0xcd, 0xef),
        Rgba::new(0xff, 0xff, 0xff, 0),
    ];
    let colors = colors.clamp(1, choices.len()) as u64;
    let mut rng = XorShift::new(seed);
    // Runs of the previous pixel make larger regions more likely.
    let mut prev = choices[0];
    PixelGrid::from_fn(width, height, |_, _| {
        if rng.below(3) != 0 {
            prev = choices[rng.below(colors) as usize];
        }
        prev
    })
}

// =========================================================================
// Invariant checks
// =========================================================================

/// Assert the coverage invariant: every pixel lies in exactly one block
/// with its exact colour, or is a skipped transparent pixel in no block.
pub fn assert_partition(grid: &PixelGrid, result: &Decomposition, transparency: Transparency) {
    let (w, h) = (grid.width(), grid.height());
    let mut owner: Vec<Option<usize>> = vec![None; w as usize * h as usize];

    for (i, block) in result.blocks.iter().enumerate() {
        assert!(block.width >= 1 && block.height >= 1, "empty block {block:?}");
        assert!(
            block.right() <= w && block.bottom() <= h,
            "block {block:?} exceeds {w}x{h}"
        );
        for y in block.y..block.bottom() {
            for x in block.x..block.right() {
                let cell = &mut owner[y as usize * w as usize + x as usize];
                assert!(
                    cell.is_none(),
                    "pixel ({x}, {y}) covered by blocks {:?} and {i}",
                    cell
                );
                *cell = Some(i);
                assert_eq!(
                    grid.get(x, y),
                    block.color,
                    "block {i} colour differs at ({x}, {y})"
                );
            }
        }
    }

    let mut skipped = 0u64;
    for y in 0..h {
        for x in 0..w {
            if owner[y as usize * w as usize + x as usize].is_none() {
                assert_eq!(
                    transparency,
                    Transparency::Omit,
                    "pixel ({x}, {y}) uncovered in preserve mode"
                );
                assert!(
                    grid.get(x, y).is_transparent(),
                    "opaque pixel ({x}, {y}) left uncovered"
                );
                skipped += 1;
            }
        }
    }
    assert_eq!(skipped, result.transparent_skipped, "skip counter mismatch");
}

// =========================================================================
// Progress recorder
// =========================================================================

/// [`Progress`] implementation that records what it was told.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub stages: Vec<(Stage, u64)>,
    /// Sum of all `advance` units across stages.
    pub advanced: u64,
    /// Number of `advance` calls.
    pub calls: u64,
    pub finished: u64,
}

impl Progress for RecordingProgress {
    fn begin(&mut self, stage: Stage, total: u64) {
        self.stages.push((stage, total));
    }

    fn advance(&mut self, units: u64) {
        self.advanced += units;
        self.calls += 1;
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}
