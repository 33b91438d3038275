//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two operations the conversion
//! pipeline needs from an imaging library: decode a file and resize a
//! decoded image. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate; tests substitute a recording mock.

use image::{DynamicImage, ImageFormat};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

/// A decoded image plus the container format it was read from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: DynamicImage,
    /// `None` when the format could not be identified from the content.
    pub format: Option<ImageFormat>,
}

/// Lowercase display name of an image format, `"unknown"` when absent.
pub fn format_name(format: Option<ImageFormat>) -> String {
    format
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("unknown")
        .to_string()
}

/// Trait for image backends.
pub trait ImageBackend {
    /// Read and decode an image file.
    fn load(&self, path: &Path) -> Result<LoadedImage, BackendError>;

    /// Resize to exactly `width × height` with nearest-neighbour sampling,
    /// so no new colours are introduced.
    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;
}
