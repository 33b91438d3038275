//! Shared types used across all pipeline stages.
//!
//! [`Rgba`] flows from the grid builder into the decomposition engine,
//! [`Block`] from the engine into the SVG serializer, and [`Transparency`]
//! is read by both the engine and the serializer, so they must agree on it.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel colour sample, alpha included.
///
/// Equality is exact on all four channels; there is no tolerance and no
/// premultiplication. Two pixels merge into one block only when their
/// `Rgba` values are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque colour.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Quantize a 16-bit-per-channel sample by keeping the high byte.
    ///
    /// This truncates: `0x12ff` becomes `0x12`, not `0x13`.
    pub const fn from_wide(sample: [u16; 4]) -> Self {
        Self::new(
            (sample[0] >> 8) as u8,
            (sample[1] >> 8) as u8,
            (sample[2] >> 8) as u8,
            (sample[3] >> 8) as u8,
        )
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

/// An axis-aligned rectangle of uniform colour.
///
/// Produced once by [`decompose`](crate::decompose::decompose) and consumed
/// once by the SVG writer. `width` and `height` are always at least 1 and
/// the rectangle lies entirely inside the canvas it was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: Rgba,
}

impl Block {
    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// How fully transparent (alpha 0) pixels are handled.
///
/// - `Omit`: alpha-0 pixels are never part of a block and produce no
///   element. Against a transparent canvas this renders identically and
///   keeps the document small.
/// - `Preserve`: alpha-0 pixels are merged like any other colour and
///   written as explicit `fill-opacity="0.000"` rectangles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    #[default]
    Omit,
    Preserve,
}
