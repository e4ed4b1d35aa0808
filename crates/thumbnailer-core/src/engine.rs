//! The thumbnail pipeline object.
//!
//! A [`Thumbnailer`] holds at most one decoded image together with the
//! format it was loaded from. Every transform builds its result in a new
//! buffer first and only then replaces the current one, so a failed
//! operation leaves the engine exactly as it was.
//!
//! # Example
//!
//! ```ignore
//! use thumbnailer_core::{Alignment, SaveRequest, Thumbnailer};
//!
//! let mut thumb = Thumbnailer::open("photo.jpg")?;
//! thumb.crop_image_by_aspect_ratio(1.0, Alignment::Center)?;
//! thumb.make_thumbnail(Some(256), Some(256), false)?;
//! thumb.save_image("photo-thumb.jpg", &SaveRequest::new().quality(85))?;
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::clamp;
use crate::codec::{ImageCodec, ImageCrateCodec};
use crate::config::{EngineConfig, SaveRequest};
use crate::decode::{CodecError, PixelBuffer};
use crate::error::{Result, ThumbnailError};
use crate::format::{detect_format, FormatSet, ImageType};
use crate::transform::{
    crop_window, thumbnail_dimensions, Alignment, FlipMode, ImageResampler, Resampler,
};

/// Width and height of the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
struct Loaded {
    image: PixelBuffer,
    format: ImageType,
}

/// Stateful load → orient → crop → scale → save pipeline.
pub struct Thumbnailer<C = ImageCrateCodec, R = ImageResampler> {
    codec: C,
    resampler: R,
    config: EngineConfig,
    loaded: Option<Loaded>,
}

impl Thumbnailer {
    /// Empty engine with the default codec, resampler and configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Empty engine with the default collaborators and `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_collaborators(
            ImageCrateCodec::new(),
            ImageResampler::with_filter(config.filter),
            config,
        )
    }

    /// Create an engine and load `path` into it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut engine = Self::new();
        engine.load_image(path)?;
        Ok(engine)
    }
}

impl Default for Thumbnailer {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec, R: Resampler> Thumbnailer<C, R> {
    pub fn with_collaborators(codec: C, resampler: R, config: EngineConfig) -> Self {
        Self {
            codec,
            resampler,
            config,
            loaded: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(ThumbnailError::NotLoaded)
    }

    fn replace_image(&mut self, image: PixelBuffer) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(ThumbnailError::NotLoaded)?;
        loaded.image = image;
        Ok(())
    }

    /// Load an image file, replacing any image already loaded.
    ///
    /// The format is detected from the file content. JPEGs are turned
    /// upright according to their EXIF orientation when
    /// [`EngineConfig::correct_orientation`] is set.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "cannot read image file");
            ThumbnailError::NotFound(path.to_path_buf())
        })?;
        self.load_bytes(&bytes)
    }

    /// Load an encoded image from memory, replacing any image already loaded.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let format = detect_format(bytes)?;

        if !self.codec.readable_formats().has(format) {
            return Err(ThumbnailError::UnsupportedFormat(format!(
                "{format} support is not available"
            )));
        }

        let image = self.codec.decode(bytes, format).map_err(|e| match e {
            CodecError::Unavailable(name) => {
                ThumbnailError::UnsupportedFormat(format!("{name} support is not available"))
            }
            other => ThumbnailError::DecodeFailed(other.to_string()),
        })?;

        if image.is_empty() {
            return Err(ThumbnailError::DecodeFailed(
                "decoder produced an empty buffer".to_string(),
            ));
        }

        let image = if format == ImageType::Jpeg && self.config.correct_orientation {
            self.correct_orientation(bytes, image)
        } else {
            image
        };

        debug!(
            %format,
            width = image.width,
            height = image.height,
            "loaded image"
        );

        // The previous buffer, if any, is dropped here.
        self.loaded = Some(Loaded { image, format });
        Ok(())
    }

    /// Apply the EXIF orientation of `bytes` to `image`, best effort.
    fn correct_orientation(&self, bytes: &[u8], image: PixelBuffer) -> PixelBuffer {
        let orientation = match self.codec.read_orientation(bytes) {
            Ok(Some(orientation)) => orientation,
            Ok(None) => return image,
            Err(e) => {
                debug!(error = %e, "no usable EXIF orientation, keeping decoded image");
                return image;
            }
        };

        let fix = orientation.correction();
        let mut image = if fix.rotate_ccw == 0 {
            image
        } else {
            match self.resampler.rotate(&image, f64::from(fix.rotate_ccw)) {
                Ok(rotated) => rotated,
                Err(e) => {
                    warn!(?orientation, error = %e, "orientation rotation failed");
                    return image;
                }
            }
        };

        if fix.flip_horizontal {
            if let Err(e) = self.resampler.flip(&mut image, FlipMode::Horizontal) {
                warn!(?orientation, error = %e, "orientation flip failed");
            }
        }

        image
    }

    /// Drop the loaded image and its format.
    pub fn unload_image(&mut self) -> Result<()> {
        self.loaded
            .take()
            .map(drop)
            .ok_or(ThumbnailError::NotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn size(&self) -> Result<Dimensions> {
        let image = &self.loaded()?.image;
        Ok(Dimensions {
            width: image.width,
            height: image.height,
        })
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> Result<f64> {
        let Dimensions { width, height } = self.size()?;
        if height == 0 {
            return Err(ThumbnailError::DivideByZero);
        }
        Ok(f64::from(width) / f64::from(height))
    }

    /// Format the current image was loaded from.
    pub fn format(&self) -> Result<ImageType> {
        Ok(self.loaded()?.format)
    }

    /// Borrow the current pixels.
    pub fn image(&self) -> Result<&PixelBuffer> {
        Ok(&self.loaded()?.image)
    }

    /// Shrink the image to fit within `max_width x max_height`.
    ///
    /// A bound of `None` or `Some(0)` is ignored; with neither bound given
    /// the box is 100x100. Images smaller than the box keep their size unless
    /// `force_resize` is set. See [`thumbnail_dimensions`] for the exact
    /// policy.
    pub fn make_thumbnail(
        &mut self,
        max_width: Option<u32>,
        max_height: Option<u32>,
        force_resize: bool,
    ) -> Result<()> {
        let current = &self.loaded()?.image;
        let (width, height) = thumbnail_dimensions(
            current.width,
            current.height,
            max_width,
            max_height,
            force_resize,
        );

        let mut canvas = self
            .resampler
            .create_canvas(width, height)
            .map_err(|e| ThumbnailError::CanvasAllocationFailed(e.to_string()))?;
        self.resampler
            .copy_resampled(&mut canvas, current)
            .map_err(|e| ThumbnailError::ResampleFailed(e.to_string()))?;

        debug!(
            from_width = current.width,
            from_height = current.height,
            width,
            height,
            "made thumbnail"
        );
        self.replace_image(canvas)
    }

    /// Crop to `width x height`, positioned by `alignment`.
    ///
    /// `alignment` may be an [`Alignment`] or a legacy integer code
    /// (`-1` top-left, `0` center, `1` bottom-right).
    pub fn crop_image<A>(&mut self, width: u32, height: u32, alignment: A) -> Result<()>
    where
        A: TryInto<Alignment>,
        ThumbnailError: From<A::Error>,
    {
        let current = &self.loaded()?.image;
        let alignment = alignment.try_into()?;

        let window = crop_window(
            current.width,
            current.height,
            width,
            height,
            alignment,
            self.config.crop_bounds,
        )?;

        let mut canvas = self
            .resampler
            .create_canvas(window.width, window.height)
            .map_err(|e| ThumbnailError::CropFailed(e.to_string()))?;
        self.resampler
            .copy_region(&mut canvas, current, window.x, window.y)
            .map_err(|e| ThumbnailError::CropFailed(e.to_string()))?;

        debug!(?window, %alignment, "cropped image");
        self.replace_image(canvas)
    }

    /// Crop to the given width/height ratio.
    ///
    /// A ratio exactly equal to the current one is a no-op. A wider target
    /// trims height; a taller one trims width.
    #[allow(clippy::float_cmp)]
    pub fn crop_image_by_aspect_ratio<A>(&mut self, aspect_ratio: f64, alignment: A) -> Result<()>
    where
        A: TryInto<Alignment>,
        ThumbnailError: From<A::Error>,
    {
        let current_ratio = self.aspect_ratio()?;
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(ThumbnailError::InvalidAspectRatio(aspect_ratio));
        }

        // Exact comparison: only an identical ratio skips the crop.
        if aspect_ratio == current_ratio {
            return Ok(());
        }

        let Dimensions { width, height } = self.size()?;
        let (width, height) = if aspect_ratio > current_ratio {
            // too tall
            (width, (f64::from(width) / aspect_ratio) as u32)
        } else {
            // too wide
            ((f64::from(height) * aspect_ratio) as u32, height)
        };

        self.crop_image(width, height, alignment)
    }

    /// Rotate counter-clockwise by `angle_degrees`; exposed corners are
    /// transparent.
    pub fn rotate_image(&mut self, angle_degrees: f64) -> Result<()> {
        let rotated = self
            .resampler
            .rotate(&self.loaded()?.image, angle_degrees)
            .map_err(|e| ThumbnailError::ResampleFailed(e.to_string()))?;
        self.replace_image(rotated)
    }

    /// Mirror the image in place.
    ///
    /// `mode` may be a [`FlipMode`] or a GD code (`1` horizontal,
    /// `2` vertical, `3` both).
    pub fn flip_image<M>(&mut self, mode: M) -> Result<()>
    where
        M: TryInto<FlipMode>,
        ThumbnailError: From<M::Error>,
    {
        let loaded = self.loaded.as_mut().ok_or(ThumbnailError::NotLoaded)?;
        let mode = mode.try_into()?;
        self.resampler
            .flip(&mut loaded.image, mode)
            .map_err(|e| ThumbnailError::FlipFailed(e.to_string()))
    }

    /// Encode the current image as described by `request`.
    pub fn encode_image(&self, request: &SaveRequest) -> Result<Vec<u8>> {
        let loaded = self.loaded()?;
        let format = request.format.unwrap_or(loaded.format);

        if !self.codec.writable_formats().has(format) {
            return Err(ThumbnailError::UnsupportedFormat(format!(
                "{format} support is not available"
            )));
        }

        let quality = format
            .uses_quality()
            .then(|| clamp(request.quality, 0, 100) as u8);

        self.codec
            .encode(&loaded.image, format, quality)
            .map_err(|e| match e {
                CodecError::Unavailable(name) => {
                    ThumbnailError::UnsupportedFormat(format!("{name} support is not available"))
                }
                other => ThumbnailError::EncodeFailed {
                    format,
                    reason: other.to_string(),
                },
            })
    }

    /// Encode the current image into `writer`.
    pub fn write_image<W: Write>(&self, mut writer: W, request: &SaveRequest) -> Result<()> {
        let bytes = self.encode_image(request)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Save the current image to `path`.
    ///
    /// An empty path writes the encoded bytes to standard output instead,
    /// e.g. to serve them as an HTTP response body.
    pub fn save_image(&self, path: impl AsRef<Path>, request: &SaveRequest) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return self.write_image(io::stdout().lock(), request);
        }

        let bytes = self.encode_image(request)?;
        fs::write(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "saved image");
        Ok(())
    }

    /// Formats that can be both loaded and saved in this runtime.
    pub fn supported_formats(&self) -> FormatSet {
        self.codec.readable_formats() & self.codec.writable_formats()
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_helpers::encode_test_png;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: The aspect ratio is always width over height.
        #[test]
        fn prop_aspect_ratio_matches_size(w in 1u32..=32, h in 1u32..=32) {
            let mut engine = Thumbnailer::new();
            engine.load_bytes(&encode_test_png(w, h)).unwrap();

            prop_assert_eq!(engine.aspect_ratio().unwrap(), f64::from(w) / f64::from(h));
        }

        /// Property: An aspect crop never grows either side.
        #[test]
        fn prop_aspect_crop_shrinks(
            (w, h) in (8u32..=32, 8u32..=32),
            ratio in 0.25f64..=4.0,
        ) {
            let mut engine = Thumbnailer::new();
            engine.load_bytes(&encode_test_png(w, h)).unwrap();
            engine.crop_image_by_aspect_ratio(ratio, Alignment::Center).unwrap();

            let size = engine.size().unwrap();
            prop_assert!(size.width <= w && size.height <= h);
            prop_assert!(size.width == w || size.height == h);
        }

        /// Property: A thumbnail never exceeds the original without force.
        #[test]
        fn prop_thumbnail_never_upscales(
            (w, h) in (1u32..=48, 1u32..=48),
            (max_w, max_h) in (0u32..=64, 0u32..=64),
        ) {
            let mut engine = Thumbnailer::new();
            engine.load_bytes(&encode_test_png(w, h)).unwrap();
            engine.make_thumbnail(Some(max_w), Some(max_h), false).unwrap();

            let size = engine.size().unwrap();
            prop_assert!(size.width <= w && size.height <= h);
        }
    }
}
