//! JPEG encoding with configurable quality.
//!
//! JPEG has no alpha channel, so RGBA input is composited by dropping alpha
//! before it reaches the encoder.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate, EncodeError};
use crate::decode::PixelBuffer;

/// Encode an RGBA buffer to JPEG bytes.
///
/// `quality` is expected in 0..=100 (callers clamp first). The encoder's
/// quality scale starts at 1, so 0 encodes like 1.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 75: Default thumbnail quality
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(image: &PixelBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate(image)?;

    let rgb: Vec<u8> = image
        .pixels
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));

    encoder
        .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Encoding always produces valid JPEG when given valid input.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            width in 1u32..=40,
            height in 1u32..=40,
            quality in 0u8..=100,
        ) {
            let img = PixelBuffer::new(width, height, vec![100u8; (width * height * 4) as usize]);
            let jpeg = encode_jpeg(&img, quality);
            prop_assert!(jpeg.is_ok(), "Valid input should produce valid output");

            let jpeg = jpeg.unwrap();
            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8], "Should have SOI marker");
            let len = jpeg.len();
            prop_assert_eq!(&jpeg[len - 2..], &[0xFF, 0xD9], "Should have EOI marker");
        }

        /// Property: Same input always produces same output (deterministic).
        #[test]
        fn prop_deterministic_output(
            width in 1u32..=20,
            height in 1u32..=20,
            quality in 0u8..=100,
        ) {
            let img = PixelBuffer::new(width, height, vec![100u8; (width * height * 4) as usize]);
            let first = encode_jpeg(&img, quality).unwrap();
            let second = encode_jpeg(&img, quality).unwrap();
            prop_assert_eq!(first, second, "Same input should produce same output");
        }
    }
}
