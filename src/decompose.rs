//! Greedy rectangle decomposition.
//!
//! Partitions a [`PixelGrid`] into axis-aligned rectangles of uniform
//! colour. The result is exact (every non-skipped pixel is covered by a
//! block of its own colour) and non-overlapping, but not minimal: an
//! optimal rectangle cover is NP-hard, and this engine is a deterministic
//! greedy heuristic.
//!
//! ## Algorithm
//!
//! Cells are scanned row-major from the top-left. Each unclaimed cell seeds
//! a block:
//!
//! 1. **Run width**: extend right while cells match the seed colour.
//! 2. **Run height**: extend down while every cell of the next row, within
//!    the run width, matches.
//! 3. **Expansion**: alternately try one more column to the right, then
//!    one more row down, until a full pass grows in neither direction.
//!
//! All three steps stop at claimed cells as well as at colour changes. A
//! block seeded in an earlier row can reach into the current row to the
//! right of the seed, so without that check two blocks could overlap.
//!
//! The block's cells are then claimed in the used mask and the scan
//! resumes just past the block. Once claimed, a cell is never revisited by
//! the outer scan, so total work stays linear in the pixel count.
//!
//! ## Transparency
//!
//! With [`Transparency::Omit`], alpha-0 cells are claimed without emitting
//! anything and counted in [`Decomposition::transparent_skipped`]. With
//! [`Transparency::Preserve`] they are ordinary colours.
//!
//! ## Determinism
//!
//! Scan order fixes which pixel seeds each block and the right-then-down
//! expansion order is a fixed tie-break, so identical grids always produce
//! identical block sequences.

use crate::grid::PixelGrid;
use crate::progress::{Progress, Stage};
use crate::types::{Block, Rgba, Transparency};
use tracing::debug;

/// Output of [`decompose`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decomposition {
    /// Blocks in scan order of their seed pixel.
    pub blocks: Vec<Block>,
    /// Alpha-0 pixels claimed without a block (always 0 in preserve mode).
    pub transparent_skipped: u64,
}

/// Tracks which cells are already claimed by a block or skipped.
struct UsedMask {
    width: usize,
    cells: Vec<bool>,
}

impl UsedMask {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            cells: vec![false; width * height],
        }
    }

    #[inline]
    fn is_used(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    #[inline]
    fn claim(&mut self, x: usize, y: usize) {
        let cell = &mut self.cells[y * self.width + x];
        debug_assert!(!*cell, "cell ({x}, {y}) claimed twice");
        *cell = true;
    }

    fn claim_rect(&mut self, x: usize, y: usize, width: usize, height: usize) {
        for row in y..y + height {
            for col in x..x + width {
                self.claim(col, row);
            }
        }
    }
}

/// Read-only view used while growing one block.
struct Seed<'a> {
    grid: &'a PixelGrid,
    used: &'a UsedMask,
    x: usize,
    y: usize,
    color: Rgba,
}

impl Seed<'_> {
    /// Cell matches the seed colour and nobody owns it yet.
    #[inline]
    fn available(&self, x: usize, y: usize) -> bool {
        !self.used.is_used(x, y) && self.grid.get(x as u32, y as u32) == self.color
    }

    fn run_width(&self) -> usize {
        let max_x = self.grid.width() as usize;
        let mut width = 1;
        while self.x + width < max_x && self.available(self.x + width, self.y) {
            width += 1;
        }
        width
    }

    fn run_height(&self, width: usize) -> usize {
        let mut height = 1;
        while self.row_available(self.y + height, width) {
            height += 1;
        }
        height
    }

    /// Row `y` is inside the grid and fully available across `width` columns.
    fn row_available(&self, y: usize, width: usize) -> bool {
        y < self.grid.height() as usize && (self.x..self.x + width).all(|x| self.available(x, y))
    }

    /// Column `x` is inside the grid and fully available across `height` rows.
    fn column_available(&self, x: usize, height: usize) -> bool {
        x < self.grid.width() as usize && (self.y..self.y + height).all(|y| self.available(x, y))
    }

    /// Alternately grow right then down until neither direction succeeds.
    fn expand(&self, mut width: usize, mut height: usize) -> (usize, usize) {
        loop {
            let mut grew = false;
            if self.column_available(self.x + width, height) {
                width += 1;
                grew = true;
            }
            if self.row_available(self.y + height, width) {
                height += 1;
                grew = true;
            }
            if !grew {
                return (width, height);
            }
        }
    }
}

/// Partition `grid` into uniform rectangles.
///
/// Total over any non-empty grid. Reports one [`Stage::Decomposing`] unit
/// per scanned row.
pub fn decompose(
    grid: &PixelGrid,
    transparency: Transparency,
    progress: &mut dyn Progress,
) -> Decomposition {
    let width = grid.width() as usize;
    let height = grid.height() as usize;
    let mut used = UsedMask::new(width, height);
    let mut result = Decomposition::default();

    progress.begin(Stage::Decomposing, height as u64);
    for y in 0..height {
        let mut x = 0;
        while x < width {
            if used.is_used(x, y) {
                x += 1;
                continue;
            }

            let color = grid.get(x as u32, y as u32);
            if color.is_transparent() && transparency == Transparency::Omit {
                used.claim(x, y);
                result.transparent_skipped += 1;
                x += 1;
                continue;
            }

            let seed = Seed {
                grid,
                used: &used,
                x,
                y,
                color,
            };
            let run_width = seed.run_width();
            let run_height = seed.run_height(run_width);
            let (block_width, block_height) = seed.expand(run_width, run_height);

            debug_assert!(x + block_width <= width && y + block_height <= height);
            used.claim_rect(x, y, block_width, block_height);
            result.blocks.push(Block {
                x: x as u32,
                y: y as u32,
                width: block_width as u32,
                height: block_height as u32,
                color,
            });

            x += block_width;
        }
        progress.advance(1);
    }
    progress.finish();

    debug!(
        blocks = result.blocks.len(),
        pixels = grid.pixel_count(),
        transparent_skipped = result.transparent_skipped,
        "decomposed {}x{} grid",
        width,
        height
    );
    result
}
