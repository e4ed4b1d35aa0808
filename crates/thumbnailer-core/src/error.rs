//! Error taxonomy for the thumbnail pipeline.
//!
//! Every failing operation maps onto exactly one variant. Collaborator errors
//! ([`CodecError`](crate::decode::CodecError),
//! [`ResampleError`](crate::transform::ResampleError)) are translated by the
//! engine; nothing is retried.

use std::convert::Infallible;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::ImageType;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ThumbnailError>;

/// Errors raised by [`Thumbnailer`](crate::Thumbnailer) operations.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// The path does not resolve to readable image bytes.
    #[error("file '{}' doesn't exist or is not readable", .0.display())]
    NotFound(PathBuf),

    /// No image format could be recognised from the content signature.
    #[error("unknown file type")]
    UnknownFormat,

    /// The format is outside the supported set or has no codec in this build.
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The codec could not produce a pixel buffer.
    #[error("image not created successfully: {0}")]
    DecodeFailed(String),

    /// The operation needs a loaded image.
    #[error("no image is loaded")]
    NotLoaded,

    /// Aspect ratio requested for an image with zero height.
    #[error("image height is zero")]
    DivideByZero,

    /// Unrecognised alignment code.
    #[error("invalid alignment specified: {0}")]
    InvalidAlignment(String),

    /// The crop window does not fit inside the current image.
    #[error("crop window {width}x{height} at ({x}, {y}) exceeds image bounds {image_width}x{image_height}")]
    InvalidCropBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// Target aspect ratio is zero, negative or not finite.
    #[error("invalid aspect ratio: {0}")]
    InvalidAspectRatio(f64),

    /// Cropping could not allocate or fill the output canvas.
    #[error("error cropping image: {0}")]
    CropFailed(String),

    /// A thumbnail canvas could not be allocated.
    #[error("image creation for thumbnail failed: {0}")]
    CanvasAllocationFailed(String),

    /// Resampling or rotation did not complete.
    #[error("copying info for thumbnail failed: {0}")]
    ResampleFailed(String),

    /// Unrecognised flip mode code.
    #[error("invalid mode given for flip: {0}")]
    InvalidFlipMode(String),

    /// The flip collaborator reported failure.
    #[error("unable to flip image: {0}")]
    FlipFailed(String),

    /// The encoder rejected the image.
    #[error("failed to encode {format} image: {reason}")]
    EncodeFailed { format: ImageType, reason: String },

    /// Writing encoded output failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Infallible> for ThumbnailError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
