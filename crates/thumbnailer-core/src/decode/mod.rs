//! Image decoding for the thumbnail pipeline.
//!
//! This module provides:
//! - The RGBA [`PixelBuffer`] every transform works on
//! - Decoding supported formats through the `image` crate
//! - EXIF orientation extraction via `kamadak-exif`
//!
//! Decoding never applies orientation itself; the engine decides whether and
//! how to correct it after the buffer is loaded.

mod orientation;
mod types;

use std::io::Cursor;

use image::ImageReader;

use crate::format::ImageType;

pub use orientation::read_orientation;
pub use types::{CodecError, FilterType, Orientation, OrientationFix, PixelBuffer, CHANNELS};

/// Decode encoded bytes of a known format into an RGBA buffer.
///
/// # Errors
///
/// * `CodecError::Unavailable` if the `image` crate has no decoder for the
///   format in this build.
/// * `CodecError::Corrupted` if the bytes do not decode.
pub fn decode_image(bytes: &[u8], format: ImageType) -> Result<PixelBuffer, CodecError> {
    let image_format = format
        .info()
        .image_format
        .filter(|f| f.reading_enabled())
        .ok_or(CodecError::Unavailable(format.name()))?;

    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(image_format);

    let img = reader
        .decode()
        .map_err(|e| CodecError::Corrupted(e.to_string()))?;

    Ok(PixelBuffer::from_rgba_image(img.into_rgba8()))
}
