//! Pixel grid construction.
//!
//! A [`PixelGrid`] is the dense, row-major, 8-bit RGBA view of an image that
//! the decomposition engine works on. It is built from anything implementing
//! [`PixelSource`], which hands out 16-bit samples; every channel is then
//! quantized by keeping its most significant byte. Quantization truncates,
//! it never rounds, so a 16-bit `0x12ff` channel becomes `0x12`.
//!
//! 8-bit sources are widened by `v * 257` before quantization, which makes
//! the round trip exact: the high byte of `v * 257` is `v`.

use crate::progress::{Progress, Stage};
use crate::types::Rgba;
use image::{DynamicImage, ImageBuffer, Rgba as ImageRgba, RgbaImage};

/// A 16-bit-per-channel image, as produced by `DynamicImage::to_rgba16`.
pub type Rgba16Image = ImageBuffer<ImageRgba<u16>, Vec<u16>>;

/// Random-access source of wide RGBA samples.
///
/// Callers only ask for `0 <= x < width` and `0 <= y < height`.
pub trait PixelSource {
    fn dimensions(&self) -> (u32, u32);

    /// RGBA at `(x, y)`, 16 bits per channel.
    fn sample(&self, x: u32, y: u32) -> [u16; 4];
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    fn sample(&self, x: u32, y: u32) -> [u16; 4] {
        self.get_pixel(x, y).0.map(|v| u16::from(v) * 257)
    }
}

impl PixelSource for Rgba16Image {
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    fn sample(&self, x: u32, y: u32) -> [u16; 4] {
        self.get_pixel(x, y).0
    }
}

/// Dense row-major grid of quantized RGBA samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelGrid {
    /// Sample every pixel of `source` in row-major order.
    ///
    /// Reports one [`Stage::Sampling`] unit per pixel, batched per row.
    pub fn build(source: &impl PixelSource, progress: &mut dyn Progress) -> Self {
        let (width, height) = source.dimensions();
        assert!(width > 0 && height > 0, "pixel grid must be non-empty");

        progress.begin(Stage::Sampling, u64::from(width) * u64::from(height));
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(Rgba::from_wide(source.sample(x, y)));
            }
            progress.advance(u64::from(width));
        }
        progress.finish();

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build from a decoded image.
    ///
    /// RGBA8 and RGBA16 buffers are read in place. Other layouts are
    /// converted first: 8-bit ones to RGBA8, anything wider (16-bit
    /// integer, 32-bit float) to RGBA16, so that quantization is a
    /// high-byte truncation rather than the `image` crate's rounding.
    pub fn from_image(image: &DynamicImage, progress: &mut dyn Progress) -> Self {
        if let Some(buffer) = image.as_rgba8() {
            return Self::build(buffer, progress);
        }
        if let Some(buffer) = image.as_rgba16() {
            return Self::build(buffer, progress);
        }
        let color = image.color();
        let bytes_per_channel = color.bytes_per_pixel() / color.channel_count();
        if bytes_per_channel > 1 {
            Self::build(&image.to_rgba16(), progress)
        } else {
            Self::build(&image.to_rgba8(), progress)
        }
    }

    /// Wrap already-quantized pixels. Panics if the buffer does not match
    /// `width * height` or either side is zero.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Self {
        assert!(width > 0 && height > 0, "pixel grid must be non-empty");
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "pixel buffer does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::from_pixels(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Colour at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.pixels[self.index(x, y)]
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }
}
