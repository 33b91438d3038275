//! Conversion pipeline: image file in, SVG file out.
//!
//! ```text
//! validate input → validate output → validate resize
//!   → decode → validate target dimensions → resize (if requested)
//!   → PixelGrid → decompose → write SVG → ConversionReport
//! ```
//!
//! Everything that can fail for a user-facing reason is checked before the
//! first pixel is sampled; after that the only remaining failure is I/O on
//! the output file. Status goes to a [`Reporter`] as [`ConvertEvent`]s, so
//! this module never prints and never knows whether output is quiet.

use crate::config::Config;
use crate::decompose::{Decomposition, decompose};
use crate::grid::PixelGrid;
use crate::imaging::{
    BackendError, ImageBackend, ResizeRequest, RustBackend, decode_image, format_name,
    resize_image,
};
use crate::progress::{NoProgress, Progress};
use crate::svg::write_svg;
use crate::types::Transparency;
use crate::validate::{
    ValidationError, validate_image_dimensions, validate_input_file, validate_output_file,
    validate_resize,
};
use image::DynamicImage;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Imaging(#[from] BackendError),
    #[error("cannot write {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// One conversion job.
#[derive(Debug, Clone, Default)]
pub struct ConvertRequest {
    pub input: PathBuf,
    /// Defaults to [`output_path_for`] of the input.
    pub output: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl ConvertRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    fn resize(&self) -> ResizeRequest {
        ResizeRequest {
            width: self.width,
            height: self.height,
        }
    }
}

/// Status events emitted while a conversion runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertEvent {
    /// Input validated; conversion is starting.
    Started { input: PathBuf, bytes: u64 },
    /// Image decoded.
    Decoded {
        format: String,
        width: u32,
        height: u32,
        has_transparency: bool,
    },
    /// Image resized before sampling.
    Resized { from: (u32, u32), to: (u32, u32) },
    /// Fully transparent pixels left unpainted. Only sent when non-zero.
    TransparentSkipped { pixels: u64 },
    /// Document written.
    Written { output: PathBuf, bytes: u64 },
}

/// Receives status events and stage progress.
pub trait Reporter: Progress {
    fn notify(&mut self, event: &ConvertEvent);
}

impl Reporter for NoProgress {
    fn notify(&mut self, _event: &ConvertEvent) {}
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// Detected input format, e.g. `"png"`.
    pub format: String,
    /// Canvas size, after any resize.
    pub width: u32,
    pub height: u32,
    pub blocks: usize,
    pub transparent_skipped: u64,
    pub has_transparency: bool,
}

impl ConversionReport {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// What `check` reports about an input without converting it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_bytes: u64,
    pub format: String,
    /// Decoded size.
    pub original: (u32, u32),
    /// Size the grid would have, after any resize.
    pub target: (u32, u32),
    pub has_transparency: bool,
}

impl ImageInfo {
    pub fn pixels(&self) -> u64 {
        u64::from(self.target.0) * u64::from(self.target.1)
    }
}

/// Default output path: the input with its extension replaced by `.svg`.
///
/// ```
/// # use std::path::Path;
/// # use pixel2svg::convert::output_path_for;
/// assert_eq!(output_path_for(Path::new("art/sprite.png")), Path::new("art/sprite.svg"));
/// ```
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension("svg")
}

/// Sample `image`, decompose it, and write the document to `out`.
///
/// This is the in-memory core with no validation: the caller guarantees a
/// non-empty image of reasonable size.
pub fn vectorize<W: Write>(
    image: &DynamicImage,
    transparency: Transparency,
    out: W,
    progress: &mut dyn Progress,
) -> io::Result<Decomposition> {
    let grid = PixelGrid::from_image(image, progress);
    let decomposition = decompose(&grid, transparency, progress);
    write_svg(
        out,
        &decomposition.blocks,
        grid.width(),
        grid.height(),
        transparency,
        progress,
    )?;
    Ok(decomposition)
}

/// Convert with the production [`RustBackend`].
pub fn convert(
    request: &ConvertRequest,
    config: &Config,
    reporter: &mut impl Reporter,
) -> Result<ConversionReport, ConvertError> {
    convert_with_backend(&RustBackend::new(), request, config, reporter)
}

/// Convert with any backend.
pub fn convert_with_backend(
    backend: &impl ImageBackend,
    request: &ConvertRequest,
    config: &Config,
    reporter: &mut impl Reporter,
) -> Result<ConversionReport, ConvertError> {
    let limits = &config.limits;
    let transparency = config.output.transparency;

    let input_bytes = validate_input_file(&request.input, limits)?;
    let output = request
        .output
        .clone()
        .unwrap_or_else(|| output_path_for(&request.input));
    validate_output_file(&output, request.overwrite)?;
    validate_resize(request.width, request.height, limits)?;

    info!(input = %request.input.display(), output = %output.display(), "converting");
    reporter.notify(&ConvertEvent::Started {
        input: request.input.clone(),
        bytes: input_bytes,
    });

    let decoded = decode_image(backend, &request.input)?;
    let format = format_name(decoded.format);
    reporter.notify(&ConvertEvent::Decoded {
        format: format.clone(),
        width: decoded.original.0,
        height: decoded.original.1,
        has_transparency: decoded.has_transparency,
    });

    // Checked on the target size so an oversized resize is never allocated.
    let resize = request.resize();
    let (width, height) = resize.target(decoded.original);
    validate_image_dimensions(width, height, limits)?;
    let prepared = if resize.is_requested() {
        let resized = resize_image(backend, decoded, width, height);
        reporter.notify(&ConvertEvent::Resized {
            from: resized.original,
            to: (width, height),
        });
        resized
    } else {
        decoded
    };

    let file = File::create(&output).map_err(|source| ConvertError::Io {
        path: output.clone(),
        source,
    })?;
    let decomposition = vectorize(&prepared.image, transparency, BufWriter::new(file), reporter)
        .map_err(|source| ConvertError::Io {
            path: output.clone(),
            source,
        })?;

    let output_bytes = fs::metadata(&output)
        .map_err(|source| ConvertError::Io {
            path: output.clone(),
            source,
        })?
        .len();
    debug!(
        blocks = decomposition.blocks.len(),
        transparent_skipped = decomposition.transparent_skipped,
        output_bytes,
        "conversion finished"
    );

    if decomposition.transparent_skipped > 0 {
        reporter.notify(&ConvertEvent::TransparentSkipped {
            pixels: decomposition.transparent_skipped,
        });
    }
    reporter.notify(&ConvertEvent::Written {
        output: output.clone(),
        bytes: output_bytes,
    });

    Ok(ConversionReport {
        input: request.input.clone(),
        output,
        input_bytes,
        output_bytes,
        format,
        width,
        height,
        blocks: decomposition.blocks.len(),
        transparent_skipped: decomposition.transparent_skipped,
        has_transparency: prepared.has_transparency,
    })
}

/// Validate and decode `path` without converting it.
///
/// A requested resize is only measured, never performed.
pub fn inspect(
    backend: &impl ImageBackend,
    path: &Path,
    resize: ResizeRequest,
    config: &Config,
) -> Result<ImageInfo, ConvertError> {
    let limits = &config.limits;
    let file_bytes = validate_input_file(path, limits)?;
    validate_resize(resize.width, resize.height, limits)?;

    let decoded = decode_image(backend, path)?;
    let (width, height) = resize.target(decoded.original);
    validate_image_dimensions(width, height, limits)?;

    Ok(ImageInfo {
        path: path.to_path_buf(),
        file_bytes,
        format: format_name(decoded.format),
        original: decoded.original,
        target: (width, height),
        has_transparency: decoded.has_transparency,
    })
}
