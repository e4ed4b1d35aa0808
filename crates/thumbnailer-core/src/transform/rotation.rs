//! Rotation by arbitrary angles.
//!
//! Multiples of 90° are exact pixel permutations. Any other angle uses
//! inverse mapping with bilinear interpolation: for each output pixel we
//! find the source position it came from and blend its four neighbours.
//!
//! For counter-clockwise rotation by θ in y-down image coordinates, the
//! inverse transform is:
//! ```text
//! src_x =  dx * cos(θ) - dy * sin(θ) + src_cx
//! src_y =  dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//! where `(dx, dy)` is the output pixel centre relative to the output
//! centre. Output pixels with no source are transparent.

use image::imageops;

use super::ResampleError;
use crate::decode::{PixelBuffer, CHANNELS};

/// Angles within this many degrees of a right angle snap to it.
const RIGHT_ANGLE_EPSILON: f64 = 0.001;

/// Normalise an angle into `[0, 360)`.
fn normalize(angle_degrees: f64) -> f64 {
    angle_degrees.rem_euclid(360.0)
}

/// Quarter turns (0..=3) if the angle is a multiple of 90°.
fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let turns = normalize(angle_degrees) / 90.0;
    let nearest = turns.round();
    if (turns - nearest).abs() * 90.0 < RIGHT_ANGLE_EPSILON {
        Some((nearest as u8) % 4)
    } else {
        None
    }
}

/// Compute the dimensions of the bounding box for a rotated image.
///
/// # Example
///
/// ```
/// use thumbnailer_core::transform::compute_rotated_bounds;
///
/// // 90-degree rotation swaps dimensions
/// assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
/// // No rotation preserves dimensions
/// assert_eq!(compute_rotated_bounds(100, 50, 0.0), (100, 50));
/// ```
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turns(angle_degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = f64::from(width);
    let h = f64::from(height);

    // The bounding box of a rotated rectangle is:
    // new_w = |w*cos| + |h*sin|
    // new_h = |w*sin| + |h*cos|
    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate counter-clockwise around the image centre onto an expanded canvas.
pub fn rotate(image: &PixelBuffer, angle_degrees: f64) -> Result<PixelBuffer, ResampleError> {
    if !angle_degrees.is_finite() {
        return Err(ResampleError::NonFiniteAngle(angle_degrees));
    }

    if let Some(turns) = quarter_turns(angle_degrees) {
        return rotate_quarter_turns(image, turns);
    }

    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, angle_degrees);

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = f64::from(image.width) / 2.0;
    let src_cy = f64::from(image.height) / 2.0;
    let dst_cx = f64::from(dst_w) / 2.0;
    let dst_cy = f64::from(dst_h) / 2.0;

    let mut output = PixelBuffer::blank(dst_w, dst_h);
    let row_len = dst_w as usize * CHANNELS;

    for (dst_y, row) in output.pixels.chunks_exact_mut(row_len).enumerate() {
        let dy = dst_y as f64 + 0.5 - dst_cy;
        for (dst_x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let dx = dst_x as f64 + 0.5 - dst_cx;

            // Source position in pixel-index space (centres at .0)
            let src_x = dx * cos - dy * sin + src_cx - 0.5;
            let src_y = dx * sin + dy * cos + src_cy - 0.5;

            if let Some(sample) = sample_bilinear(image, src_x, src_y) {
                px.copy_from_slice(&sample);
            }
        }
    }

    Ok(output)
}

fn rotate_quarter_turns(image: &PixelBuffer, turns: u8) -> Result<PixelBuffer, ResampleError> {
    let view = image.as_rgba_view().ok_or(ResampleError::MalformedBuffer {
        width: image.width,
        height: image.height,
    })?;

    // imageops rotates clockwise, so a CCW quarter turn is a CW three-quarter turn.
    let rotated = match turns {
        0 => return Ok(image.clone()),
        1 => imageops::rotate270(&view),
        2 => imageops::rotate180(&view),
        _ => imageops::rotate90(&view),
    };
    Ok(PixelBuffer::from_rgba_image(rotated))
}

/// Get a pixel as [f64; 4] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &PixelBuffer, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * image.width as usize + px) * CHANNELS;
    [
        f64::from(image.pixels[idx]),
        f64::from(image.pixels[idx + 1]),
        f64::from(image.pixels[idx + 2]),
        f64::from(image.pixels[idx + 3]),
    ]
}

/// Sample a pixel using bilinear interpolation.
///
/// Returns `None` when the position lies outside the source footprint.
/// Positions within half a pixel of the border clamp to the edge pixels.
fn sample_bilinear(image: &PixelBuffer, x: f64, y: f64) -> Option<[u8; 4]> {
    let max_x = f64::from(image.width) - 1.0;
    let max_y = f64::from(image.height) - 1.0;

    if x < -0.5 || y < -0.5 || x >= max_x + 0.5 || y >= max_y + 0.5 {
        return None;
    }

    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 4];
    for i in 0..CHANNELS {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Some(result)
}
