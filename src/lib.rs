//! # pixel2svg
//!
//! Lossless raster-to-SVG conversion for pixel art. Every pixel of the input
//! is painted by exactly one axis-aligned `<rect>`; runs of identical colour
//! are merged into larger rectangles so the document stays small.
//!
//! # Architecture: Three-Stage Core
//!
//! ```text
//! 1. Sample     DynamicImage  →  PixelGrid      (quantize to 8-bit RGBA)
//! 2. Decompose  PixelGrid     →  Vec<Block>     (greedy rectangle cover)
//! 3. Serialize  Vec<Block>    →  SVG bytes      (compact, streaming)
//! ```
//!
//! The core stages are total over any non-empty grid. Everything that can
//! fail for a user-facing reason (missing file, undecodable data, oversized
//! image, unwritable destination) is rejected by [`validate`] before sampling
//! starts, so the core has no error type beyond I/O on the output stream.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Rgba`, `Block`, `Transparency` |
//! | [`grid`] | Stage 1: samples a decoded image into a dense `PixelGrid` |
//! | [`decompose`] | Stage 2: greedy scan-order rectangle decomposition |
//! | [`svg`] | Stage 3: streaming SVG serializer with shortest hex colours |
//! | [`imaging`] | Decode, transparency probe, optional nearest-neighbour resize |
//! | [`validate`] | Input, output, resize, and dimension checks |
//! | [`convert`] | File-to-file pipeline tying everything together |
//! | [`progress`] | Stage progress trait and rate-limited text bar |
//! | [`output`] | CLI output formatting |
//! | [`config`] | `pixel2svg.toml` loading, validation, and merging |
//!
//! # Design Decisions
//!
//! ## Greedy, Not Optimal
//!
//! Finding the minimum number of rectangles that cover a coloured grid is
//! expensive. The engine instead grows each unclaimed seed pixel right, then
//! down, into the largest uniform rectangle it can find, in row-major order.
//! The result is deterministic, linear in practice, and close enough to
//! optimal on real pixel art that the difference is a few percent of output
//! size.
//!
//! ## Exact Colours
//!
//! Colour equality is structural equality on 8-bit RGBA. Nothing is
//! quantized, dithered, or blended, so rasterizing the output at 1:1 gives
//! back the input pixels exactly. Resizing, when asked for, uses
//! nearest-neighbour sampling for the same reason.
//!
//! ## Transparent Pixels
//!
//! Fully transparent pixels are left unpainted by default, which renders
//! identically and saves one element per transparent region. Setting
//! `output.transparency = "preserve"` writes them as explicit
//! `fill-opacity="0.000"` rectangles instead.

pub mod config;
pub mod convert;
pub mod decompose;
pub mod grid;
pub mod imaging;
pub mod output;
pub mod progress;
pub mod svg;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
