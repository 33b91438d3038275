//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Resolve the output size of an optional resize.
///
/// - both sides given: exactly that size (aspect ratio may change)
/// - one side given: the other is scaled to keep the source aspect ratio,
///   rounded to the nearest pixel and never below 1
/// - neither given: the source size
///
/// ```
/// # use pixel2svg::imaging::fit_dimensions;
/// assert_eq!(fit_dimensions((1920, 1080), Some(960), None), (960, 540));
/// assert_eq!(fit_dimensions((1920, 1080), None, Some(270)), (480, 270));
/// assert_eq!(fit_dimensions((1920, 1080), Some(10), Some(10)), (10, 10));
/// ```
pub fn fit_dimensions(source: (u32, u32), width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let (src_w, src_h) = source;
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scale_side(src_h, w, src_w)),
        (None, Some(h)) => (scale_side(src_w, h, src_h), h),
        (None, None) => source,
    }
}

/// `side * numerator / denominator`, rounded, clamped to `1..=u32::MAX`.
fn scale_side(side: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 1;
    }
    let scaled = (f64::from(side) * f64::from(numerator) / f64::from(denominator)).round();
    scaled.clamp(1.0, f64::from(u32::MAX)) as u32
}
