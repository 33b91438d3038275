//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Decoding
//! and resizing are separate steps so the caller can check the resize
//! target against its limits before any resized buffer is allocated.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_dimensions;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Side length of the top-left region inspected by [`has_transparency`].
const PROBE_REGION: u32 = 100;
/// Stride between probed pixels.
const PROBE_STEP: usize = 10;

/// Requested output size; `None` on a side means "derive it".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeRequest {
    pub fn is_requested(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Size an image of `original` size ends up with under this request.
    pub fn target(&self, original: (u32, u32)) -> (u32, u32) {
        fit_dimensions(original, self.width, self.height)
    }
}

/// An image ready to be turned into a pixel grid.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
    /// Whether the probe found any non-opaque pixel.
    pub has_transparency: bool,
    /// Size before any resize.
    pub original: (u32, u32),
}

impl PreparedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Quick transparency probe.
///
/// Samples the top-left 100×100 region on a 10-pixel stride and reports
/// whether any sample is not fully opaque. This is a hint for status
/// output, not a guarantee: transparency elsewhere in the image is missed.
pub fn has_transparency(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        return false;
    }
    let (width, height) = image.dimensions();
    (0..height.min(PROBE_REGION))
        .step_by(PROBE_STEP)
        .any(|y| {
            (0..width.min(PROBE_REGION))
                .step_by(PROBE_STEP)
                .any(|x| image.get_pixel(x, y).0[3] < 255)
        })
}

/// Decode `path` and probe it for transparency.
pub fn decode_image(backend: &impl ImageBackend, path: &Path) -> Result<PreparedImage> {
    let loaded = backend.load(path)?;
    let original = loaded.image.dimensions();
    let has_transparency = has_transparency(&loaded.image);
    debug!(
        path = %path.display(),
        width = original.0,
        height = original.1,
        has_transparency,
        "decoded image"
    );

    Ok(PreparedImage {
        image: loaded.image,
        format: loaded.format,
        has_transparency,
        original,
    })
}

/// Resize a decoded image to exactly `width × height`.
///
/// The caller validates the target first; this allocates the full buffer.
pub fn resize_image(
    backend: &impl ImageBackend,
    prepared: PreparedImage,
    width: u32,
    height: u32,
) -> PreparedImage {
    debug!(width, height, "resizing (nearest neighbour)");
    PreparedImage {
        image: backend.resize(&prepared.image, width, height),
        ..prepared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use image::{Rgba, RgbaImage};

    fn opaque(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([1, 2, 3, 255]),
        ))
    }

    #[test]
    fn opaque_image_has_no_transparency() {
        assert!(!has_transparency(&opaque(50, 50)));
    }

    #[test]
    fn rgb_image_has_no_transparency() {
        let img = image::RgbImage::new(5, 5);
        assert!(!has_transparency(&DynamicImage::ImageRgb8(img)));
    }

    #[test]
    fn probe_finds_sampled_transparent_pixel() {
        let mut img = RgbaImage::from_pixel(50, 50, Rgba([1, 2, 3, 255]));
        img.put_pixel(20, 30, Rgba([1, 2, 3, 254]));
        assert!(has_transparency(&DynamicImage::ImageRgba8(img)));
    }

    #[test]
    fn probe_misses_unsampled_pixels() {
        let mut img = RgbaImage::from_pixel(200, 200, Rgba([1, 2, 3, 255]));
        // Off the 10-pixel stride, and outside the probe region.
        img.put_pixel(5, 5, Rgba([0, 0, 0, 0]));
        img.put_pixel(150, 150, Rgba([0, 0, 0, 0]));
        assert!(!has_transparency(&DynamicImage::ImageRgba8(img)));
    }

    #[test]
    fn target_follows_fit_dimensions() {
        let resize = ResizeRequest {
            width: Some(20),
            height: None,
        };
        assert_eq!(resize.target((40, 30)), (20, 15));
        assert_eq!(ResizeRequest::default().target((40, 30)), (40, 30));
    }

    #[test]
    fn decode_only_loads() {
        let backend = MockBackend::with_image(opaque(40, 30), ImageFormat::Png);
        let prepared = decode_image(&backend, Path::new("/in.png")).unwrap();

        assert_eq!(prepared.dimensions(), (40, 30));
        assert_eq!(prepared.original, (40, 30));
        assert!(!prepared.has_transparency);
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Load("/in.png".to_string())]
        );
    }

    #[test]
    fn resize_keeps_original_and_format() {
        let backend = MockBackend::with_image(opaque(40, 30), ImageFormat::Gif);
        let decoded = decode_image(&backend, Path::new("/in.gif")).unwrap();
        let prepared = resize_image(&backend, decoded, 20, 15);

        assert_eq!(prepared.dimensions(), (20, 15));
        assert_eq!(prepared.original, (40, 30));
        assert_eq!(prepared.format, Some(ImageFormat::Gif));
        assert_eq!(
            backend.get_operations()[1],
            RecordedOp::Resize {
                from: (40, 30),
                width: 20,
                height: 15
            }
        );
    }

    #[test]
    fn decode_propagates_load_errors() {
        let backend = MockBackend::new();
        assert!(decode_image(&backend, Path::new("/in.png")).is_err());
    }
}
