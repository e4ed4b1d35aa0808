//! Core types shared by the codec and resampler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by an [`ImageCodec`](crate::codec::ImageCodec).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The codec has no decoder or encoder for the format in this build.
    #[error("{0} support is not available")]
    Unavailable(&'static str),

    /// The bytes could not be decoded.
    #[error("corrupted or incomplete image data: {0}")]
    Corrupted(String),

    /// The encoder rejected the pixel data.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// EXIF parsing error.
    #[error("EXIF error: {0}")]
    Exif(String),
}

/// Filter used when resampling thumbnails.
///
/// Thumbnails are always interpolated; there is no nearest-neighbour option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Bicubic Catmull-Rom interpolation.
    #[default]
    CatmullRom,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

/// How to undo an orientation: rotate counter-clockwise first, then
/// optionally mirror horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationFix {
    /// Counter-clockwise rotation in degrees (0, 90, 180 or 270).
    pub rotate_ccw: u16,
    pub flip_horizontal: bool,
}

impl Orientation {
    /// Correction that brings an image with this tag upright.
    pub fn correction(self) -> OrientationFix {
        let (rotate_ccw, flip_horizontal) = match self {
            Orientation::Normal => (0, false),
            Orientation::FlipHorizontal => (0, true),
            Orientation::Rotate180 => (180, false),
            Orientation::FlipVertical => (180, true),
            Orientation::Transpose => (270, true),
            Orientation::Rotate90CW => (270, false),
            Orientation::Transverse => (90, true),
            Orientation::Rotate270CW => (90, false),
        };
        OrientationFix {
            rotate_ccw,
            flip_horizontal,
        }
    }

    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded image with RGBA pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * CHANNELS,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a fully transparent buffer.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * CHANNELS],
        }
    }

    /// Create a PixelBuffer from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Borrow the pixels as an image::RgbaImage view for imageops.
    ///
    /// Returns `None` if the pixel length does not match the dimensions.
    pub fn as_rgba_view(&self) -> Option<image::ImageBuffer<image::Rgba<u8>, &[u8]>> {
        image::ImageBuffer::from_raw(self.width, self.height, self.pixels.as_slice())
    }

    /// Convert to an owned image::RgbaImage.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Consume into an owned image::RgbaImage.
    pub fn into_rgba_image(self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels)
    }

    /// RGBA value at (x, y).
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
