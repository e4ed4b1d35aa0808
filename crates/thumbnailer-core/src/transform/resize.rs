//! Thumbnail sizing policy.
//!
//! A single scale factor is chosen so the image fits the requested box
//! while keeping its aspect ratio. Small images are not upscaled unless the
//! caller forces it.

/// Side length used when neither bound is given.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 100;

/// Treat zero as "not given".
fn given(bound: Option<u32>) -> Option<u32> {
    bound.filter(|b| *b > 0)
}

/// Compute the scale factor `original / target` for a bounding box.
///
/// - only `max_height` given → `height / max_height`
/// - only `max_width` given → `width / max_width`
/// - both given → the larger ratio (the tighter constraint wins)
/// - neither given → both default to [`DEFAULT_THUMBNAIL_SIZE`]
pub fn scale_factor(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> f64 {
    let (max_width, max_height) = match (given(max_width), given(max_height)) {
        (None, None) => (
            Some(DEFAULT_THUMBNAIL_SIZE),
            Some(DEFAULT_THUMBNAIL_SIZE),
        ),
        bounds => bounds,
    };

    let by_width = max_width.map(|m| f64::from(width) / f64::from(m));
    let by_height = max_height.map(|m| f64::from(height) / f64::from(m));

    match (by_width, by_height) {
        (Some(w), Some(h)) => w.max(h),
        (Some(w), None) => w,
        (None, Some(h)) => h,
        (None, None) => 1.0,
    }
}

/// Dimensions of the thumbnail for a `width x height` source.
///
/// When the scale factor is below 1 (the box is larger than the source) and
/// `force_resize` is false, the original dimensions are kept. Otherwise each
/// side is `floor(side / scale)`, never less than one pixel.
pub fn thumbnail_dimensions(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
    force_resize: bool,
) -> (u32, u32) {
    let scale = scale_factor(width, height, max_width, max_height);

    if scale < 1.0 && !force_resize {
        return (width, height);
    }

    let side = |v: u32| ((f64::from(v) / scale).floor() as u32).max(1);
    (side(width), side(height))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
