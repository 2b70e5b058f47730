//! Radial vignette
//!
//! Darkens towards a flat paper tone near the corners, the way edge shading
//! looks on a photocopy.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Paper tone blended in at the corners
pub const BACKGROUND: Rgb<u8> = Rgb([235, 235, 235]);

/// Radius where shading starts
const INNER_RADIUS: f64 = 0.6;
/// Mask growth per unit radius past [`INNER_RADIUS`]
const FALLOFF: f64 = 2.0;

/// Position `index` of `len` evenly spaced samples over `[-1, 1]`
///
/// A single sample sits at `-1`. Written so that mirrored indices give
/// exactly negated values.
#[inline]
fn axis(index: u32, len: u32) -> f64 {
    if len <= 1 {
        return -1.0;
    }
    let span = (len - 1) as f64;
    (2.0 * index as f64 - span) / span
}

/// Mask value for a normalized radius, 0 at the center to 255 at the rim
#[inline]
pub fn mask_value(radius: f64) -> u8 {
    (((radius - INNER_RADIUS) * FALLOFF).clamp(0.0, 1.0) * 255.0) as u8
}

/// Build the blend mask for an image of the given size
pub fn vignette_mask(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let (nx, ny) = (axis(x, width), axis(y, height));
        Luma([mask_value((nx * nx + ny * ny).sqrt())])
    })
}

/// Composite the image over [`BACKGROUND`] using the vignette mask
///
/// Mask 0 keeps the pixel, mask 255 replaces it with the background.
pub fn apply_vignette(image: &RgbImage) -> RgbImage {
    let mask = vignette_mask(image.width(), image.height());
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let weight = mask.get_pixel(x, y).0[0] as u32;
        let pixel = image.get_pixel(x, y).0;
        let mut out = [0u8; 3];
        for ((dst, src), bg) in out.iter_mut().zip(pixel).zip(BACKGROUND.0) {
            *dst = ((src as u32 * (255 - weight) + bg as u32 * weight + 127) / 255) as u8;
        }
        Rgb(out)
    })
}
