//! Pure Rust image backend on top of the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format detection | `ImageReader::with_guessed_format` (magic bytes, not extension) |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image` crate decoders |
//! | Resize | `DynamicImage::resize_exact` with `FilterType::Nearest` |
//!
//! Nearest-neighbour is the only filter that maps every output pixel to an
//! existing source colour, which keeps the SVG palette identical to the
//! source palette.

use super::backend::{BackendError, ImageBackend, LoadedImage};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<LoadedImage, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode().map_err(|e| BackendError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(LoadedImage { image, format })
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, FilterType::Nearest)
    }
}
