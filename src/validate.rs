//! Up-front validation of everything the conversion core must not see.
//!
//! The decomposition engine is total over any non-empty grid, so every
//! fallible condition is rejected here, before a single pixel is sampled.
//! Each condition has its own [`ValidationError`] variant and message.
//!
//! | Check | Function |
//! |-------|----------|
//! | Input file exists, is a readable non-empty file, within size limit, supported extension | [`validate_input_file`] |
//! | Output directory exists and is writable, no silent overwrite, `.svg` extension | [`validate_output_file`] |
//! | Requested resize is non-zero and within limits | [`validate_resize`] |
//! | Decoded (or resized) image is non-empty and within pixel limits | [`validate_image_dimensions`] |

use crate::config::LimitsConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input extensions with a compiled-in decoder (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"];

/// Name of the probe file used to test directory write permission.
const WRITE_PROBE: &str = ".pixel2svg_write_test";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("file does not exist: {}", .0.display())]
    InputMissing(PathBuf),
    #[error("cannot access file: {} - {source}", .path.display())]
    InputInaccessible { path: PathBuf, source: io::Error },
    #[error("path is a directory, not a file: {}", .0.display())]
    InputIsDirectory(PathBuf),
    #[error("file is empty: {}", .0.display())]
    InputEmpty(PathBuf),
    #[error("file too large (max {limit_mb}MB): {} ({size})", .path.display())]
    InputTooLarge {
        path: PathBuf,
        size: String,
        limit_mb: u64,
    },
    #[error("unsupported format: {extension} (supported: {supported})")]
    UnsupportedFormat {
        extension: String,
        supported: String,
    },
    #[error("cannot read file (permission denied?): {}", .0.display())]
    InputUnreadable(PathBuf),

    #[error("output directory does not exist: {}", .0.display())]
    OutputDirMissing(PathBuf),
    #[error("output file already exists: {} (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),
    #[error("cannot check output file: {} - {source}", .path.display())]
    OutputInaccessible { path: PathBuf, source: io::Error },
    #[error("no write permission in directory: {}", .0.display())]
    OutputNotWritable(PathBuf),
    #[error("output file must have .svg extension: {}", .0.display())]
    OutputExtension(PathBuf),

    #[error("requested {side} must be greater than zero")]
    ResizeZero { side: &'static str },
    #[error("requested size too large (max {max}): width={width}, height={height}")]
    ResizeTooLarge { width: u32, height: u32, max: u32 },

    #[error("invalid image dimensions: {width}x{height}")]
    ImageEmpty { width: u32, height: u32 },
    #[error("image too large (max {max}x{max}): {width}x{height}")]
    ImageTooLarge { width: u32, height: u32, max: u32 },
    #[error("image has too many pixels (max {max}): {width}x{height} = {pixels} pixels")]
    TooManyPixels {
        width: u32,
        height: u32,
        pixels: u64,
        max: u64,
    },
}

/// Lowercased extension of `path`, or `""` when it has none.
fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

pub fn is_supported_extension(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension(path).as_str())
}

/// Check the input file before any decoding is attempted.
pub fn validate_input_file(path: &Path, limits: &LimitsConfig) -> Result<u64, ValidationError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ValidationError::InputMissing(path.to_path_buf()),
        _ => ValidationError::InputInaccessible {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if metadata.is_dir() {
        return Err(ValidationError::InputIsDirectory(path.to_path_buf()));
    }
    let size = metadata.len();
    if size == 0 {
        return Err(ValidationError::InputEmpty(path.to_path_buf()));
    }
    if size > limits.max_file_size_bytes() {
        return Err(ValidationError::InputTooLarge {
            path: path.to_path_buf(),
            size: crate::output::format_file_size(size),
            limit_mb: limits.max_file_size_mb,
        });
    }
    if !is_supported_extension(path) {
        let ext = extension(path);
        return Err(ValidationError::UnsupportedFormat {
            extension: if ext.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{ext}")
            },
            supported: SUPPORTED_EXTENSIONS
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    fs::File::open(path).map_err(|_| ValidationError::InputUnreadable(path.to_path_buf()))?;

    Ok(size)
}

/// Check that `path` can be created (or, with `overwrite`, replaced).
///
/// Write permission is tested by creating and removing a probe file in the
/// target directory.
pub fn validate_output_file(path: &Path, overwrite: bool) -> Result<(), ValidationError> {
    if extension(path) != "svg" {
        return Err(ValidationError::OutputExtension(path.to_path_buf()));
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(ValidationError::OutputDirMissing(dir.to_path_buf()));
    }

    match fs::metadata(path) {
        Ok(_) if !overwrite => return Err(ValidationError::OutputExists(path.to_path_buf())),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ValidationError::OutputInaccessible {
                path: path.to_path_buf(),
                source: e,
            });
        }
    }

    let probe = dir.join(WRITE_PROBE);
    fs::write(&probe, b"test").map_err(|_| ValidationError::OutputNotWritable(dir.to_path_buf()))?;
    // Leftover probe files are harmless.
    let _ = fs::remove_file(&probe);

    Ok(())
}

/// Check a requested resize. Unset sides are derived later.
pub fn validate_resize(
    width: Option<u32>,
    height: Option<u32>,
    limits: &LimitsConfig,
) -> Result<(), ValidationError> {
    if width == Some(0) {
        return Err(ValidationError::ResizeZero { side: "width" });
    }
    if height == Some(0) {
        return Err(ValidationError::ResizeZero { side: "height" });
    }
    let max = limits.max_resize_dimension;
    if width.unwrap_or(0) > max || height.unwrap_or(0) > max {
        return Err(ValidationError::ResizeTooLarge {
            width: width.unwrap_or(0),
            height: height.unwrap_or(0),
            max,
        });
    }
    Ok(())
}

/// Check the final image size against the grid limits.
pub fn validate_image_dimensions(
    width: u32,
    height: u32,
    limits: &LimitsConfig,
) -> Result<(), ValidationError> {
    if width == 0 || height == 0 {
        return Err(ValidationError::ImageEmpty { width, height });
    }
    let max = limits.max_dimension;
    if width > max || height > max {
        return Err(ValidationError::ImageTooLarge { width, height, max });
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > limits.max_pixels {
        return Err(ValidationError::TooManyPixels {
            width,
            height,
            pixels,
            max: limits.max_pixels,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    // =========================================================================
    // Input
    // =========================================================================

    #[test]
    fn input_valid_returns_size() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "a.png", b"12345");
        assert_eq!(validate_input_file(&path, &limits()).unwrap(), 5);
    }

    #[test]
    fn input_missing() {
        let tmp = TempDir::new().unwrap();
        let err = validate_input_file(&tmp.path().join("nope.png"), &limits()).unwrap_err();
        assert!(matches!(err, ValidationError::InputMissing(_)));
        assert!(err.to_string().starts_with("file does not exist: "));
    }

    #[test]
    fn input_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("pics.png");
        fs::create_dir(&dir).unwrap();
        let err = validate_input_file(&dir, &limits()).unwrap_err();
        assert!(matches!(err, ValidationError::InputIsDirectory(_)));
    }

    #[test]
    fn input_empty() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "a.png", b"");
        let err = validate_input_file(&path, &limits()).unwrap_err();
        assert!(matches!(err, ValidationError::InputEmpty(_)));
    }

    #[test]
    fn input_too_large() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "a.png", &vec![0u8; 2 * 1024 * 1024]);
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let err = validate_input_file(&path, &limits).unwrap_err();
        assert!(matches!(err, ValidationError::InputTooLarge { limit_mb: 1, .. }));
        assert!(err.to_string().contains("(2.0 MB)"));
    }

    #[test]
    fn input_unsupported_extension() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "a.xcf", b"data");
        let err = validate_input_file(&path, &limits()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("unsupported format: .xcf (supported: .jpg, .jpeg, .png"));
    }

    #[test]
    fn input_without_extension() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "README", b"data");
        let err = validate_input_file(&path, &limits()).unwrap_err();
        assert!(err.to_string().starts_with("unsupported format: (none)"));
    }

    #[test]
    fn input_extension_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "A.JPEG", b"data");
        assert!(validate_input_file(&path, &limits()).is_ok());
    }

    // =========================================================================
    // Output
    // =========================================================================

    #[test]
    fn output_valid() {
        let tmp = TempDir::new().unwrap();
        validate_output_file(&tmp.path().join("out.svg"), false).unwrap();
        // The write probe is cleaned up.
        assert!(!tmp.path().join(WRITE_PROBE).exists());
    }

    #[test]
    fn output_wrong_extension() {
        let tmp = TempDir::new().unwrap();
        let err = validate_output_file(&tmp.path().join("out.png"), false).unwrap_err();
        assert!(matches!(err, ValidationError::OutputExtension(_)));
    }

    #[test]
    fn output_extension_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        assert!(validate_output_file(&tmp.path().join("OUT.SVG"), false).is_ok());
    }

    #[test]
    fn output_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let err = validate_output_file(&tmp.path().join("no/such/out.svg"), false).unwrap_err();
        assert!(matches!(err, ValidationError::OutputDirMissing(_)));
    }

    #[test]
    fn output_exists_without_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "out.svg", b"<svg/>");
        let err = validate_output_file(&path, false).unwrap_err();
        assert!(matches!(err, ValidationError::OutputExists(_)));
        assert!(err.to_string().ends_with("(use --force to overwrite)"));
    }

    #[test]
    fn output_exists_with_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "out.svg", b"<svg/>");
        assert!(validate_output_file(&path, true).is_ok());
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    #[test]
    fn resize_unset_is_valid() {
        assert!(validate_resize(None, None, &limits()).is_ok());
        assert!(validate_resize(Some(100), None, &limits()).is_ok());
    }

    #[test]
    fn resize_zero_side() {
        let err = validate_resize(Some(0), Some(10), &limits()).unwrap_err();
        assert!(matches!(err, ValidationError::ResizeZero { side: "width" }));
        let err = validate_resize(None, Some(0), &limits()).unwrap_err();
        assert!(matches!(err, ValidationError::ResizeZero { side: "height" }));
    }

    #[test]
    fn resize_too_large() {
        let err = validate_resize(None, Some(100_001), &limits()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "requested size too large (max 100000): width=0, height=100001"
        );
    }

    #[test]
    fn image_dimensions_valid() {
        assert!(validate_image_dimensions(30_000, 1, &limits()).is_ok());
        assert!(validate_image_dimensions(1, 1, &limits()).is_ok());
    }

    #[test]
    fn image_dimensions_empty() {
        let err = validate_image_dimensions(0, 10, &limits()).unwrap_err();
        assert!(matches!(err, ValidationError::ImageEmpty { .. }));
    }

    #[test]
    fn image_dimensions_side_limit() {
        let err = validate_image_dimensions(30_001, 10, &limits()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "image too large (max 30000x30000): 30001x10"
        );
    }

    #[test]
    fn image_dimensions_pixel_limit() {
        let err = validate_image_dimensions(25_000, 25_000, &limits()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "image has too many pixels (max 500000000): 25000x25000 = 625000000 pixels"
        );
    }
}
