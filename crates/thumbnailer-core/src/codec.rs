//! Codec collaborator: decode, encode and orientation metadata.
//!
//! The [`ImageCodec`] trait is the seam between the thumbnail pipeline and
//! whatever actually understands file formats. [`ImageCrateCodec`] is the
//! production implementation on top of the `image` crate and `kamadak-exif`.

use crate::decode::{self, CodecError, Orientation, PixelBuffer};
use crate::encode::{self, EncodeError};
use crate::format::{FormatSet, ImageType};

/// Encoded-bytes ⇄ pixel-buffer conversion.
pub trait ImageCodec {
    /// Formats this codec can decode in the current build.
    fn readable_formats(&self) -> FormatSet;

    /// Formats this codec can encode in the current build.
    fn writable_formats(&self) -> FormatSet;

    /// Decode bytes already identified as `format`.
    fn decode(&self, bytes: &[u8], format: ImageType) -> Result<PixelBuffer, CodecError>;

    /// Encode a buffer; `quality` is only meaningful for JPEG.
    fn encode(
        &self,
        image: &PixelBuffer,
        format: ImageType,
        quality: Option<u8>,
    ) -> Result<Vec<u8>, CodecError>;

    /// Read the orientation tag from encoded bytes.
    fn read_orientation(&self, bytes: &[u8]) -> Result<Option<Orientation>, CodecError>;
}

/// Codec backed by the `image` crate's compiled-in decoders and encoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec;

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self
    }
}

fn enabled(check: impl Fn(image::ImageFormat) -> bool) -> FormatSet {
    ImageType::ALL
        .into_iter()
        .filter(|f| f.info().image_format.is_some_and(&check))
        .collect()
}

impl ImageCodec for ImageCrateCodec {
    fn readable_formats(&self) -> FormatSet {
        enabled(|f| f.reading_enabled())
    }

    fn writable_formats(&self) -> FormatSet {
        enabled(|f| f.writing_enabled())
    }

    fn decode(&self, bytes: &[u8], format: ImageType) -> Result<PixelBuffer, CodecError> {
        decode::decode_image(bytes, format)
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        format: ImageType,
        quality: Option<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        encode::encode_image(image, format, quality).map_err(|e| match e {
            EncodeError::Unavailable(name) => CodecError::Unavailable(name),
            other => CodecError::EncodingFailed(other.to_string()),
        })
    }

    fn read_orientation(&self, bytes: &[u8]) -> Result<Option<Orientation>, CodecError> {
        decode::read_orientation(bytes)
    }
}
