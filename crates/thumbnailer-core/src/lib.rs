//! Thumbnailer Core - thumbnail generation library
//!
//! Loads an image from disk or memory, turns JPEGs upright according to
//! their EXIF orientation, and offers the usual thumbnailing steps (sizing,
//! cropping, rotation, mirroring) before encoding the result again.
//!
//! Format support is whatever the compiled-in codecs provide; see
//! [`Thumbnailer::supported_formats`].

pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
pub mod transform;

mod engine;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use codec::{ImageCodec, ImageCrateCodec};
pub use config::{CropBounds, EngineConfig, SaveRequest};
pub use decode::{FilterType, Orientation, PixelBuffer};
pub use engine::{Dimensions, Thumbnailer};
pub use error::{Result, ThumbnailError};
pub use format::{detect_format, FormatSet, ImageType};
pub use transform::{Alignment, FlipMode, ImageResampler, Resampler};

/// Clamp `value` into the range spanned by `min` and `max`.
///
/// The bounds may be given in either order.
pub fn clamp<T: PartialOrd + Copy>(value: T, min: T, max: T) -> T {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
