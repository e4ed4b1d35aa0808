//! Supported image formats and content-signature detection.
//!
//! The format set is closed: BMP, GIF, JPEG, PNG, WBMP and WebP. Each
//! format has one immutable [`FormatInfo`] entry in a static table; whether
//! its codec is actually usable is a runtime question answered by the
//! [`ImageCodec`](crate::codec::ImageCodec).
//!
//! Formats are always detected from the leading bytes, never from the file
//! extension.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThumbnailError};

/// One of the supported raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Bmp,
    Gif,
    Jpeg,
    Png,
    Wbmp,
    Webp,
}

/// Static description of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Display name used in error messages.
    pub name: &'static str,
    /// MIME type for HTTP responses.
    pub mime_type: &'static str,
    /// Preferred file extension.
    pub extension: &'static str,
    /// Matching `image` crate format, if that crate knows the format at all.
    pub image_format: Option<ImageFormat>,
    /// Whether the encoder honours a quality setting.
    pub uses_quality: bool,
    /// Bit in a [`FormatSet`].
    pub flag: FormatSet,
}

const FORMATS: [FormatInfo; 6] = [
    FormatInfo {
        name: "BMP",
        mime_type: "image/bmp",
        extension: "bmp",
        image_format: Some(ImageFormat::Bmp),
        uses_quality: false,
        flag: FormatSet::BMP,
    },
    FormatInfo {
        name: "GIF",
        mime_type: "image/gif",
        extension: "gif",
        image_format: Some(ImageFormat::Gif),
        uses_quality: false,
        flag: FormatSet::GIF,
    },
    FormatInfo {
        name: "JPEG",
        mime_type: "image/jpeg",
        extension: "jpg",
        image_format: Some(ImageFormat::Jpeg),
        uses_quality: true,
        flag: FormatSet::JPEG,
    },
    FormatInfo {
        name: "PNG",
        mime_type: "image/png",
        extension: "png",
        image_format: Some(ImageFormat::Png),
        uses_quality: false,
        flag: FormatSet::PNG,
    },
    FormatInfo {
        name: "WBMP",
        mime_type: "image/vnd.wap.wbmp",
        extension: "wbmp",
        image_format: None,
        uses_quality: false,
        flag: FormatSet::WBMP,
    },
    FormatInfo {
        name: "WEBP",
        mime_type: "image/webp",
        extension: "webp",
        image_format: Some(ImageFormat::WebP),
        uses_quality: false,
        flag: FormatSet::WEBP,
    },
];

bitflags! {
    /// A set of [`ImageType`]s.
    ///
    /// Bit values follow the GD `IMG_*` constants so the set can be
    /// exchanged with code that still speaks them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FormatSet: u8 {
        const GIF = 1;
        const JPEG = 1 << 1;
        const PNG = 1 << 2;
        const WBMP = 1 << 3;
        const WEBP = 1 << 5;
        const BMP = 1 << 6;
    }
}

impl FormatSet {
    /// Check whether the set holds the given format.
    pub fn has(self, format: ImageType) -> bool {
        self.contains(format.flag())
    }

    /// Iterate the formats in the set, in table order.
    pub fn formats(self) -> impl Iterator<Item = ImageType> {
        ImageType::ALL.into_iter().filter(move |f| self.has(*f))
    }
}

impl From<ImageType> for FormatSet {
    fn from(format: ImageType) -> Self {
        format.flag()
    }
}

impl FromIterator<ImageType> for FormatSet {
    fn from_iter<I: IntoIterator<Item = ImageType>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FormatSet::empty(), |set, f| set | f.flag())
    }
}

impl ImageType {
    /// Every supported format, in table order.
    pub const ALL: [ImageType; 6] = [
        ImageType::Bmp,
        ImageType::Gif,
        ImageType::Jpeg,
        ImageType::Png,
        ImageType::Wbmp,
        ImageType::Webp,
    ];

    /// Static capability entry for this format.
    pub fn info(self) -> &'static FormatInfo {
        let index = match self {
            ImageType::Bmp => 0,
            ImageType::Gif => 1,
            ImageType::Jpeg => 2,
            ImageType::Png => 3,
            ImageType::Wbmp => 4,
            ImageType::Webp => 5,
        };
        &FORMATS[index]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn mime_type(self) -> &'static str {
        self.info().mime_type
    }

    pub fn extension(self) -> &'static str {
        self.info().extension
    }

    /// True for the JPEG family, whose encoder takes a quality value.
    pub fn uses_quality(self) -> bool {
        self.info().uses_quality
    }

    pub fn flag(self) -> FormatSet {
        self.info().flag
    }

    /// Map an `image` crate format into the supported set.
    ///
    /// Returns `None` for formats outside the enumeration (TIFF, ICO, ...).
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Bmp => Some(ImageType::Bmp),
            ImageFormat::Gif => Some(ImageType::Gif),
            ImageFormat::Jpeg => Some(ImageType::Jpeg),
            ImageFormat::Png => Some(ImageType::Png),
            ImageFormat::WebP => Some(ImageType::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImageType {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bmp" => Ok(ImageType::Bmp),
            "gif" => Ok(ImageType::Gif),
            "jpg" | "jpeg" => Ok(ImageType::Jpeg),
            "png" => Ok(ImageType::Png),
            "wbmp" => Ok(ImageType::Wbmp),
            "webp" => Ok(ImageType::Webp),
            _ => Err(ThumbnailError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Detect the format of an encoded image from its leading bytes.
///
/// # Errors
///
/// * `UnknownFormat` if the bytes match no known signature.
/// * `UnsupportedFormat` if they match a format outside the supported set.
pub fn detect_format(bytes: &[u8]) -> Result<ImageType> {
    if let Ok(format) = image::guess_format(bytes) {
        return ImageType::from_image_format(format)
            .ok_or_else(|| ThumbnailError::UnsupportedFormat(format!("{format:?}")));
    }

    if looks_like_wbmp(bytes) {
        return Ok(ImageType::Wbmp);
    }

    Err(ThumbnailError::UnknownFormat)
}

/// Largest side accepted by the WBMP header check.
const WBMP_MAX_SIDE: u32 = 2048;

/// Structural check for a type-0 WBMP header, which has no magic number.
///
/// Layout: multi-byte type field (must be 0), fix-header byte plus any
/// extension bytes, multi-byte width, multi-byte height, then one bit per
/// pixel with rows padded to whole bytes.
fn looks_like_wbmp(bytes: &[u8]) -> bool {
    let mut pos = 0;

    match read_multibyte(bytes, &mut pos) {
        Some(0) => {}
        _ => return false,
    }

    // Fix header; the high bit announces extension bytes.
    loop {
        let Some(&b) = bytes.get(pos) else {
            return false;
        };
        pos += 1;
        if b & 0x80 == 0 {
            break;
        }
    }

    let (Some(width), Some(height)) = (
        read_multibyte(bytes, &mut pos),
        read_multibyte(bytes, &mut pos),
    ) else {
        return false;
    };

    if width == 0 || height == 0 || width > WBMP_MAX_SIDE || height > WBMP_MAX_SIDE {
        return false;
    }

    let row_bytes = width.div_ceil(8) as usize;
    bytes.len() - pos >= row_bytes * height as usize
}

/// Read a WBMP multi-byte integer (7 bits per byte, high bit = continue).
fn read_multibyte(bytes: &[u8], pos: &mut usize) -> Option<u32> {
    let mut value: u32 = 0;
    loop {
        let b = *bytes.get(*pos)?;
        *pos += 1;
        value = (value << 7) | u32::from(b & 0x7F);
        if value >> 28 != 0 {
            return None;
        }
        if b & 0x80 == 0 {
            return Some(value);
        }
    }
}
