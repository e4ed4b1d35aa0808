//! Image encoding for saving thumbnails.
//!
//! JPEG goes through a dedicated encoder so the quality setting applies;
//! every other format is written through `image::DynamicImage::write_to`.
//!
//! # Examples
//!
//! ```ignore
//! use thumbnailer_core::decode::PixelBuffer;
//! use thumbnailer_core::encode::encode_image;
//! use thumbnailer_core::ImageType;
//!
//! let image = PixelBuffer::blank(100, 100);
//! let png = encode_image(&image, ImageType::Png, None).unwrap();
//! ```

mod jpeg;

use std::io::Cursor;

use image::DynamicImage;
use thiserror::Error;

use crate::decode::{PixelBuffer, CHANNELS};
use crate::format::ImageType;

pub use jpeg::encode_jpeg;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// No encoder for the format in this build
    #[error("{0} encoding is not available")]
    Unavailable(&'static str),

    /// The encoder failed
    #[error("encoding failed: {0}")]
    EncodingFailed(String),
}

/// Default JPEG quality when none is given.
pub const DEFAULT_QUALITY: u8 = 75;

/// Encode a buffer in the given format.
///
/// `quality` is only consulted for formats where
/// [`ImageType::uses_quality`] is true; `None` means [`DEFAULT_QUALITY`].
pub fn encode_image(
    image: &PixelBuffer,
    format: ImageType,
    quality: Option<u8>,
) -> Result<Vec<u8>, EncodeError> {
    let image_format = format
        .info()
        .image_format
        .filter(|f| f.writing_enabled())
        .ok_or(EncodeError::Unavailable(format.name()))?;

    if format.uses_quality() {
        return encode_jpeg(image, quality.unwrap_or(DEFAULT_QUALITY));
    }

    validate(image)?;
    let rgba = image
        .to_rgba_image()
        .ok_or(EncodeError::InvalidPixelData {
            expected: expected_len(image),
            actual: image.pixels.len(),
        })?;

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut buffer, image_format)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn expected_len(image: &PixelBuffer) -> usize {
    image.width as usize * image.height as usize * CHANNELS
}

/// Check dimensions and pixel length before handing data to an encoder.
pub(crate) fn validate(image: &PixelBuffer) -> Result<(), EncodeError> {
    if image.width == 0 || image.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }

    let expected = expected_len(image);
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}
