//! SVG serialization of a block list.
//!
//! The document is written without any whitespace between elements:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?><svg width="W" height="H" xmlns="http://www.w3.org/2000/svg">
//! <rect x="0" y="0" width="4" height="2" fill="#f00"/>
//! <rect x="4" y="0" width="1" height="2" fill="#123456" fill-opacity="0.502"/>
//! </svg>
//! ```
//!
//! (shown on separate lines for readability). Colours use the 3-digit
//! shorthand whenever every channel's two nibbles are equal; otherwise the
//! full 6-digit form. `fill-opacity` is written only for alpha below 255,
//! as `alpha / 255` with three decimals, which is enough to recover every
//! 8-bit alpha value exactly.
//!
//! Blocks never overlap, so document order does not affect rendering; it
//! still follows the engine's order so output is reproducible.

use crate::progress::{Progress, Stage};
use crate::types::{Block, Rgba, Transparency};
use std::fmt;
use std::io::{self, Write};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Number of blocks written between two progress reports.
const PROGRESS_BATCH: u64 = 1024;

/// Shortest hex notation of a colour's RGB channels (alpha is ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(pub Rgba);

impl HexColor {
    /// True when `#rgb` denotes the same colour as `#rrggbb`.
    pub fn has_shorthand(self) -> bool {
        let Rgba { r, g, b, .. } = self.0;
        [r, g, b].iter().all(|c| c >> 4 == c & 0x0f)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgba { r, g, b, .. } = self.0;
        if self.has_shorthand() {
            write!(f, "#{:x}{:x}{:x}", r & 0x0f, g & 0x0f, b & 0x0f)
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        }
    }
}

/// Alpha as a `fill-opacity` value: `alpha / 255` with three decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opacity(pub u8);

impl fmt::Display for Opacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", f64::from(self.0) / 255.0)
    }
}

/// Streaming writer for one SVG document.
pub struct SvgWriter<W: Write> {
    out: W,
    transparency: Transparency,
}

impl<W: Write> SvgWriter<W> {
    pub fn new(out: W, transparency: Transparency) -> Self {
        Self { out, transparency }
    }

    pub fn write_header(&mut self, width: u32, height: u32) -> io::Result<()> {
        write!(
            self.out,
            r#"<?xml version="1.0" encoding="UTF-8"?><svg width="{width}" height="{height}" xmlns="{SVG_NAMESPACE}">"#
        )
    }

    /// Write one `<rect>`. Alpha-0 blocks are dropped in omit mode.
    pub fn write_block(&mut self, block: &Block) -> io::Result<()> {
        let color = block.color;
        if color.is_transparent() && self.transparency == Transparency::Omit {
            return Ok(());
        }
        write!(
            self.out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
            block.x,
            block.y,
            block.width,
            block.height,
            HexColor(color)
        )?;
        if !color.is_opaque() {
            write!(self.out, r#" fill-opacity="{}""#, Opacity(color.a))?;
        }
        self.out.write_all(b"/>")
    }

    pub fn write_footer(&mut self) -> io::Result<()> {
        self.out.write_all(b"</svg>")
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Write a complete document for `blocks` on a `width × height` canvas.
///
/// Reports one [`Stage::Writing`] unit per block, in batches. The first
/// I/O error aborts; bytes already written stay in `out`.
pub fn write_svg<W: Write>(
    out: W,
    blocks: &[Block],
    width: u32,
    height: u32,
    transparency: Transparency,
    progress: &mut dyn Progress,
) -> io::Result<W> {
    let mut writer = SvgWriter::new(out, transparency);
    writer.write_header(width, height)?;

    progress.begin(Stage::Writing, blocks.len() as u64);
    for chunk in blocks.chunks(PROGRESS_BATCH as usize) {
        for block in chunk {
            writer.write_block(block)?;
        }
        progress.advance(chunk.len() as u64);
    }
    progress.finish();

    writer.write_footer()?;
    writer.finish()
}

/// Render a document into a `String`.
pub fn render_svg(blocks: &[Block], width: u32, height: u32, transparency: Transparency) -> String {
    let bytes = write_svg(
        Vec::new(),
        blocks,
        width,
        height,
        transparency,
        &mut crate::progress::NoProgress,
    )
    .unwrap_or_default();
    // Every byte written above comes from ASCII format strings.
    String::from_utf8(bytes).unwrap_or_default()
}
