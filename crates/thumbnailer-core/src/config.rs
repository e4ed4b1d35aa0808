//! Engine and save configuration.
//!
//! All types deserialize with defaults for missing fields, so a partial
//! JSON/TOML document is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;
use crate::encode::DEFAULT_QUALITY;
use crate::format::ImageType;

/// What to do with a crop window that does not fit the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropBounds {
    /// Fail with `InvalidCropBounds`.
    #[default]
    Reject,
    /// Shrink the window to the image extent.
    Clamp,
}

/// Behaviour switches for a [`Thumbnailer`](crate::Thumbnailer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resampling filter for thumbnails.
    pub filter: FilterType,
    /// Out-of-bounds crop policy.
    pub crop_bounds: CropBounds,
    /// Apply EXIF orientation when loading JPEGs.
    pub correct_orientation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter: FilterType::default(),
            crop_bounds: CropBounds::default(),
            correct_orientation: true,
        }
    }
}

/// Output format and quality for a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveRequest {
    /// Target format; `None` keeps the loaded image's format.
    pub format: Option<ImageType>,
    /// JPEG quality, clamped into 0..=100 before use.
    pub quality: i32,
}

impl Default for SaveRequest {
    fn default() -> Self {
        Self {
            format: None,
            quality: i32::from(DEFAULT_QUALITY),
        }
    }
}

impl SaveRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: ImageType) -> Self {
        self.format = Some(format);
        self
    }

    pub fn quality(mut self, quality: i32) -> Self {
        self.quality = quality;
        self
    }
}
