//! Smoothing filter

use image::{Rgb, RgbImage};

/// 3x3 smoothing kernel, weights sum to [`SMOOTH_SCALE`]
const SMOOTH_KERNEL: [[u32; 3]; 3] = [[1, 1, 1], [1, 5, 1], [1, 1, 1]];
const SMOOTH_SCALE: u32 = 13;

/// Soften aliasing with a small weighted blur
///
/// Neighbors outside the image are replaced by the nearest edge pixel, so
/// border pixels are averaged like interior ones.
pub fn smooth(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let clamp = |value: i64, len: u32| value.clamp(0, len as i64 - 1) as u32;

    RgbImage::from_fn(width, height, |x, y| {
        let mut sums = [0u32; 3];
        for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
            let sy = clamp(y as i64 + ky as i64 - 1, height);
            for (kx, &weight) in row.iter().enumerate() {
                let sx = clamp(x as i64 + kx as i64 - 1, width);
                let pixel = image.get_pixel(sx, sy).0;
                for (sum, channel) in sums.iter_mut().zip(pixel) {
                    *sum += weight * channel as u32;
                }
            }
        }
        Rgb(sums.map(|sum| ((sum + SMOOTH_SCALE / 2) / SMOOTH_SCALE) as u8))
    })
}
