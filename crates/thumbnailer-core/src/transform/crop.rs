//! Crop window placement and region copying.
//!
//! A crop keeps a `width x height` window of the current image. Where that
//! window sits is decided by an [`Alignment`]; what happens when it does not
//! fit is decided by [`CropBounds`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ResampleError;
use crate::config::CropBounds;
use crate::decode::{PixelBuffer, CHANNELS};
use crate::error::{Result, ThumbnailError};

/// Where a crop window is anchored within the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    TopLeft,
    #[default]
    Center,
    BottomRight,
}

impl Alignment {
    /// Legacy integer code (`-1`, `0`, `1`).
    pub fn code(self) -> i32 {
        match self {
            Alignment::TopLeft => -1,
            Alignment::Center => 0,
            Alignment::BottomRight => 1,
        }
    }
}

impl TryFrom<i32> for Alignment {
    type Error = ThumbnailError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            -1 => Ok(Alignment::TopLeft),
            0 => Ok(Alignment::Center),
            1 => Ok(Alignment::BottomRight),
            other => Err(ThumbnailError::InvalidAlignment(other.to_string())),
        }
    }
}

impl FromStr for Alignment {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top-left" => Ok(Alignment::TopLeft),
            "center" => Ok(Alignment::Center),
            "bottom-right" => Ok(Alignment::BottomRight),
            other => Err(ThumbnailError::InvalidAlignment(other.to_string())),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Alignment::TopLeft => "top-left",
            Alignment::Center => "center",
            Alignment::BottomRight => "bottom-right",
        })
    }
}

/// A resolved crop window in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Place a `width x height` window inside a `src_width x src_height` image.
///
/// Offsets:
/// - TopLeft: `(0, 0)`
/// - Center: `(floor((W - w) / 2), floor((H - h) / 2))`
/// - BottomRight: `(W - w, H - h)`
///
/// With [`CropBounds::Clamp`] the window is first shrunk to the source
/// extent. With [`CropBounds::Reject`] a window that does not fit fails with
/// `InvalidCropBounds`.
pub fn crop_window(
    src_width: u32,
    src_height: u32,
    width: u32,
    height: u32,
    alignment: Alignment,
    bounds: CropBounds,
) -> Result<CropWindow> {
    let (width, height) = match bounds {
        CropBounds::Clamp => (width.min(src_width), height.min(src_height)),
        CropBounds::Reject => (width, height),
    };

    let free_x = i64::from(src_width) - i64::from(width);
    let free_y = i64::from(src_height) - i64::from(height);

    let (x, y) = match alignment {
        Alignment::TopLeft => (0, 0),
        Alignment::Center => (free_x.div_euclid(2), free_y.div_euclid(2)),
        Alignment::BottomRight => (free_x, free_y),
    };

    if free_x < 0 || free_y < 0 {
        return Err(ThumbnailError::InvalidCropBounds {
            x,
            y,
            width,
            height,
            image_width: src_width,
            image_height: src_height,
        });
    }

    // Both offsets are within 0..=free, which fits u32.
    Ok(CropWindow {
        x: x as u32,
        y: y as u32,
        width,
        height,
    })
}

/// Copy the `dst`-sized window of `src` at `(x, y)` into `dst`, row by row.
pub(super) fn copy_region(
    dst: &mut PixelBuffer,
    src: &PixelBuffer,
    x: u32,
    y: u32,
) -> std::result::Result<(), ResampleError> {
    let fits_x = x.checked_add(dst.width).is_some_and(|r| r <= src.width);
    let fits_y = y.checked_add(dst.height).is_some_and(|b| b <= src.height);
    if !fits_x || !fits_y {
        return Err(ResampleError::OutOfBounds {
            x,
            y,
            width: dst.width,
            height: dst.height,
            src_width: src.width,
            src_height: src.height,
        });
    }

    let src_stride = src.width as usize * CHANNELS;
    let row_len = dst.width as usize * CHANNELS;
    if row_len == 0 {
        return Ok(());
    }

    for (row, dst_row) in dst.pixels.chunks_exact_mut(row_len).enumerate() {
        let start = (y as usize + row) * src_stride + x as usize * CHANNELS;
        dst_row.copy_from_slice(&src.pixels[start..start + row_len]);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::tests::test_image;

    fn window(w: u32, h: u32, cw: u32, ch: u32, alignment: Alignment) -> Result<CropWindow> {
        crop_window(w, h, cw, ch, alignment, CropBounds::Reject)
    }

    #[test]
    fn test_center_window_offsets() {
        let win = window(100, 100, 50, 50, Alignment::Center).unwrap();
        assert_eq!((win.x, win.y), (25, 25));
    }

    #[test]
    fn test_center_window_floors_odd_slack() {
        let win = window(101, 10, 50, 7, Alignment::Center).unwrap();
        assert_eq!((win.x, win.y), (25, 1));
    }

    #[test]
    fn test_top_left_and_bottom_right() {
        let tl = window(100, 80, 30, 20, Alignment::TopLeft).unwrap();
        assert_eq!((tl.x, tl.y), (0, 0));

        let br = window(100, 80, 30, 20, Alignment::BottomRight).unwrap();
        assert_eq!((br.x, br.y), (70, 60));
    }

    #[test]
    fn test_oversized_window_rejected() {
        let err = window(100, 100, 150, 50, Alignment::Center).unwrap_err();
        match err {
            ThumbnailError::InvalidCropBounds { x, width, .. } => {
                assert_eq!(x, -25);
                assert_eq!(width, 150);
            }
            other => panic!("expected InvalidCropBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_window_top_left_rejected() {
        assert!(window(10, 10, 11, 10, Alignment::TopLeft).is_err());
    }

    #[test]
    fn test_oversized_window_clamped() {
        let win = crop_window(100, 60, 150, 50, Alignment::Center, CropBounds::Clamp).unwrap();
        assert_eq!(
            win,
            CropWindow {
                x: 0,
                y: 5,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn test_alignment_codes() {
        assert_eq!(Alignment::try_from(-1).unwrap(), Alignment::TopLeft);
        assert_eq!(Alignment::try_from(0).unwrap(), Alignment::Center);
        assert_eq!(Alignment::try_from(1).unwrap(), Alignment::BottomRight);
        assert!(matches!(
            Alignment::try_from(2),
            Err(ThumbnailError::InvalidAlignment(_))
        ));
        for a in [Alignment::TopLeft, Alignment::Center, Alignment::BottomRight] {
            assert_eq!(Alignment::try_from(a.code()).unwrap(), a);
            assert_eq!(a.to_string().parse::<Alignment>().unwrap(), a);
        }
        assert!("middle".parse::<Alignment>().is_err());
    }

    #[test]
    fn test_copy_region_pixel_values() {
        let src = test_image(10, 10);
        let mut dst = PixelBuffer::blank(4, 3);

        copy_region(&mut dst, &src, 3, 2).unwrap();

        // First pixel should be from (3, 2) in the original
        assert_eq!(dst.pixel(0, 0), src.pixel(3, 2));
        assert_eq!(dst.pixel(3, 2), src.pixel(6, 4));
    }

    #[test]
    fn test_copy_region_out_of_bounds() {
        let src = test_image(10, 10);
        let mut dst = PixelBuffer::blank(4, 4);

        let result = copy_region(&mut dst, &src, 8, 0);
        assert!(matches!(result, Err(ResampleError::OutOfBounds { .. })));
        assert!(dst.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_copy_full_region_is_identity() {
        let src = test_image(7, 5);
        let mut dst = PixelBuffer::blank(7, 5);
        copy_region(&mut dst, &src, 0, 0).unwrap();
        assert_eq!(dst, src);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
