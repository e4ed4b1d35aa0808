//! Pixel geometry: canvases, resampling, cropping, rotation and flipping.
//!
//! The engine never touches pixels directly. It asks a [`Resampler`] for a
//! canvas, then asks it to fill that canvas. [`ImageResampler`] is the
//! production implementation using `image::imageops`.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downwards
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Exposed canvas areas are transparent black (all channels zero)

mod crop;
mod flip;
mod resize;
mod rotation;

use thiserror::Error;

use crate::decode::{FilterType, PixelBuffer, CHANNELS};

pub use crop::{crop_window, Alignment, CropWindow};
pub use flip::FlipMode;
pub use resize::{scale_factor, thumbnail_dimensions, DEFAULT_THUMBNAIL_SIZE};
pub use rotation::{compute_rotated_bounds, rotate};

/// Errors reported by a [`Resampler`].
#[derive(Debug, Error)]
pub enum ResampleError {
    /// Canvas dimensions are zero or overflow the address space.
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    /// The allocator refused the canvas.
    #[error("canvas allocation failed: {0}")]
    Allocation(String),

    /// A buffer's pixel length does not match its dimensions.
    #[error("pixel buffer does not match its {width}x{height} dimensions")]
    MalformedBuffer { width: u32, height: u32 },

    /// Source region lies outside the source image.
    #[error("region {width}x{height} at ({x}, {y}) is outside the {src_width}x{src_height} source")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        src_width: u32,
        src_height: u32,
    },

    /// Rotation angle is NaN or infinite.
    #[error("rotation angle must be finite, got {0}")]
    NonFiniteAngle(f64),
}

/// Pixel-geometry collaborator.
///
/// Implementations must leave their output untouched when they return an
/// error, so the engine can keep its previous buffer.
pub trait Resampler {
    /// Allocate a transparent canvas.
    fn create_canvas(&self, width: u32, height: u32) -> Result<PixelBuffer, ResampleError>;

    /// Resample the whole of `src` into the whole of `dst` (interpolated).
    fn copy_resampled(&self, dst: &mut PixelBuffer, src: &PixelBuffer)
        -> Result<(), ResampleError>;

    /// Copy the `dst`-sized window of `src` starting at `(x, y)` into `dst`.
    fn copy_region(
        &self,
        dst: &mut PixelBuffer,
        src: &PixelBuffer,
        x: u32,
        y: u32,
    ) -> Result<(), ResampleError>;

    /// Rotate counter-clockwise by `angle_degrees` onto an expanded canvas.
    fn rotate(&self, src: &PixelBuffer, angle_degrees: f64) -> Result<PixelBuffer, ResampleError>;

    /// Mirror in place.
    fn flip(&self, image: &mut PixelBuffer, mode: FlipMode) -> Result<(), ResampleError>;
}

/// Resampler built on `image::imageops`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageResampler {
    filter: FilterType,
}

impl ImageResampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

fn check_buffer(image: &PixelBuffer) -> Result<(), ResampleError> {
    let expected = image.width as usize * image.height as usize * CHANNELS;
    if image.is_empty() || image.pixels.len() != expected {
        return Err(ResampleError::MalformedBuffer {
            width: image.width,
            height: image.height,
        });
    }
    Ok(())
}

impl Resampler for ImageResampler {
    fn create_canvas(&self, width: u32, height: u32) -> Result<PixelBuffer, ResampleError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .filter(|n| *n > 0)
            .ok_or(ResampleError::InvalidCanvas { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|e| ResampleError::Allocation(e.to_string()))?;
        pixels.resize(len, 0);

        Ok(PixelBuffer::new(width, height, pixels))
    }

    fn copy_resampled(
        &self,
        dst: &mut PixelBuffer,
        src: &PixelBuffer,
    ) -> Result<(), ResampleError> {
        check_buffer(src)?;
        check_buffer(dst)?;

        // Fast path: same size is a plain copy
        if (src.width, src.height) == (dst.width, dst.height) {
            dst.pixels.copy_from_slice(&src.pixels);
            return Ok(());
        }

        let view = src.as_rgba_view().ok_or(ResampleError::MalformedBuffer {
            width: src.width,
            height: src.height,
        })?;
        let resized =
            image::imageops::resize(&view, dst.width, dst.height, self.filter.to_image_filter());
        dst.pixels = resized.into_raw();
        Ok(())
    }

    fn copy_region(
        &self,
        dst: &mut PixelBuffer,
        src: &PixelBuffer,
        x: u32,
        y: u32,
    ) -> Result<(), ResampleError> {
        check_buffer(src)?;
        check_buffer(dst)?;
        crop::copy_region(dst, src, x, y)
    }

    fn rotate(&self, src: &PixelBuffer, angle_degrees: f64) -> Result<PixelBuffer, ResampleError> {
        check_buffer(src)?;
        rotation::rotate(src, angle_degrees)
    }

    fn flip(&self, image: &mut PixelBuffer, mode: FlipMode) -> Result<(), ResampleError> {
        check_buffer(image)?;
        flip::flip_in_place(image, mode)
    }
}
