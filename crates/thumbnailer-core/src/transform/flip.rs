//! In-place mirroring.

use std::str::FromStr;

use image::imageops;
use serde::{Deserialize, Serialize};

use super::ResampleError;
use crate::decode::PixelBuffer;
use crate::error::{Result, ThumbnailError};

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipMode {
    /// Mirror left and right.
    Horizontal,
    /// Mirror top and bottom.
    Vertical,
    /// Both axes (a 180° turn).
    Both,
}

impl FlipMode {
    /// GD code (`IMG_FLIP_HORIZONTAL` = 1, `VERTICAL` = 2, `BOTH` = 3).
    pub fn code(self) -> i32 {
        match self {
            FlipMode::Horizontal => 1,
            FlipMode::Vertical => 2,
            FlipMode::Both => 3,
        }
    }
}

impl TryFrom<i32> for FlipMode {
    type Error = ThumbnailError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            1 => Ok(FlipMode::Horizontal),
            2 => Ok(FlipMode::Vertical),
            3 => Ok(FlipMode::Both),
            other => Err(ThumbnailError::InvalidFlipMode(other.to_string())),
        }
    }
}

impl FromStr for FlipMode {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "horizontal" => Ok(FlipMode::Horizontal),
            "vertical" => Ok(FlipMode::Vertical),
            "both" => Ok(FlipMode::Both),
            other => Err(ThumbnailError::InvalidFlipMode(other.to_string())),
        }
    }
}

pub(super) fn flip_in_place(
    image: &mut PixelBuffer,
    mode: FlipMode,
) -> std::result::Result<(), ResampleError> {
    let (width, height) = (image.width, image.height);
    let mut view = image::ImageBuffer::<image::Rgba<u8>, &mut [u8]>::from_raw(
        width,
        height,
        image.pixels.as_mut_slice(),
    )
    .ok_or(ResampleError::MalformedBuffer { width, height })?;

    match mode {
        FlipMode::Horizontal => imageops::flip_horizontal_in_place(&mut view),
        FlipMode::Vertical => imageops::flip_vertical_in_place(&mut view),
        FlipMode::Both => imageops::rotate180_in_place(&mut view),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::tests::test_image;

    #[test]
    fn test_flip_horizontal() {
        let src = test_image(3, 2);
        let mut img = src.clone();
        flip_in_place(&mut img, FlipMode::Horizontal).unwrap();

        assert_eq!(img.pixel(0, 0), src.pixel(2, 0));
        assert_eq!(img.pixel(2, 1), src.pixel(0, 1));
    }

    #[test]
    fn test_flip_vertical() {
        let src = test_image(3, 2);
        let mut img = src.clone();
        flip_in_place(&mut img, FlipMode::Vertical).unwrap();

        assert_eq!(img.pixel(0, 0), src.pixel(0, 1));
        assert_eq!(img.pixel(1, 1), src.pixel(1, 0));
    }

    #[test]
    fn test_flip_both() {
        let src = test_image(3, 2);
        let mut img = src.clone();
        flip_in_place(&mut img, FlipMode::Both).unwrap();

        assert_eq!(img.pixel(0, 0), src.pixel(2, 1));
        assert_eq!(img.pixel(2, 1), src.pixel(0, 0));
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let src = test_image(5, 4);
        for mode in [FlipMode::Horizontal, FlipMode::Vertical, FlipMode::Both] {
            let mut img = src.clone();
            flip_in_place(&mut img, mode).unwrap();
            flip_in_place(&mut img, mode).unwrap();
            assert_eq!(img, src, "{:?}", mode);
        }
    }

    #[test]
    fn test_flip_mode_codes() {
        for mode in [FlipMode::Horizontal, FlipMode::Vertical, FlipMode::Both] {
            assert_eq!(FlipMode::try_from(mode.code()).unwrap(), mode);
        }
        assert!(matches!(
            FlipMode::try_from(0),
            Err(ThumbnailError::InvalidFlipMode(_))
        ));
        assert!(matches!(
            "diagonal".parse::<FlipMode>(),
            Err(ThumbnailError::InvalidFlipMode(_))
        ));
        assert_eq!("both".parse::<FlipMode>().unwrap(), FlipMode::Both);
    }
}
