//! Tone and color enhancement
//!
//! Enhancements blend the image with a "degenerate" version of itself:
//! `out = degenerate + factor * (in - degenerate)`. A factor of 1.0 returns
//! the input, 0.0 returns the degenerate image, values above 1.0 push away
//! from it. Results are clamped to `0..=255` and truncated.

use image::{GrayImage, Luma, Rgb, RgbImage};

#[inline]
fn blend(degenerate: u8, value: u8, factor: f32) -> u8 {
    let degenerate = degenerate as f32;
    (degenerate + factor * (value as f32 - degenerate)).clamp(0.0, 255.0) as u8
}

/// ITU-R 601-2 luma in 16-bit fixed point
#[inline]
pub fn luma([r, g, b]: [u8; 3]) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Single-channel luminance of an RGB image
pub fn luminance(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([luma(image.get_pixel(x, y).0)])
    })
}

/// Rounded mean sample value, 0 for an empty image
fn mean(gray: &GrayImage) -> u8 {
    let count = gray.as_raw().len() as u64;
    if count == 0 {
        return 0;
    }
    let sum: u64 = gray.as_raw().iter().map(|&v| v as u64).sum();
    ((sum as f64 / count as f64) + 0.5) as u8
}

/// Scale contrast around the mean luminance
pub fn enhance_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let mean = mean(gray);
    let mut out = gray.clone();
    for sample in out.iter_mut() {
        *sample = blend(mean, *sample, factor);
    }
    out
}

/// Samples above `threshold` become white, everything else black
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = gray.clone();
    for sample in out.iter_mut() {
        *sample = if *sample > threshold { 255 } else { 0 };
    }
    out
}

/// Scale saturation by blending towards the pixel's own luminance
pub fn enhance_color(image: &RgbImage, factor: f32) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let pixel = image.get_pixel(x, y).0;
        let gray = luma(pixel);
        Rgb(pixel.map(|channel| blend(gray, channel, factor)))
    })
}

/// Scale every sample towards or away from black
pub fn enhance_brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for sample in out.iter_mut() {
        *sample = blend(0, *sample, factor);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma([0, 0, 0]), 0);
        assert_eq!(luma([255, 255, 255]), 255);
        assert_eq!(luma([255, 0, 0]), 76);
        assert_eq!(luma([0, 255, 0]), 150);
        assert_eq!(luma([0, 0, 255]), 29);
    }

    #[test]
    fn test_contrast_pushes_away_from_mean() {
        let gray = GrayImage::from_raw(4, 1, vec![100, 100, 200, 200]).unwrap();
        let out = enhance_contrast(&gray, 1.5);

        // mean 150: 150 + 1.5 * (100 - 150) = 75, 150 + 1.5 * 50 = 225
        assert_eq!(out.into_raw(), vec![75, 75, 225, 225]);
    }

    #[test]
    fn test_contrast_clamps() {
        let gray = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let out = enhance_contrast(&gray, 3.0);
        assert_eq!(out.into_raw(), vec![0, 255]);
    }

    #[test]
    fn test_contrast_of_empty_image() {
        let gray = GrayImage::new(0, 0);
        assert!(enhance_contrast(&gray, 1.1).is_empty());
    }

    #[test]
    fn test_binarize_threshold_is_exclusive() {
        let gray = GrayImage::from_raw(3, 1, vec![180, 181, 20]).unwrap();
        assert_eq!(binarize(&gray, 180).into_raw(), vec![0, 255, 0]);
    }

    #[test]
    fn test_color_enhance_desaturates() {
        let image = RgbImage::from_pixel(1, 1, Rgb([200, 100, 50]));
        let out = enhance_color(&image, 0.9);
        let gray = luma([200, 100, 50]);
        let [r, g, b] = out.get_pixel(0, 0).0;

        assert!(r < 200 && r > gray);
        assert!(b > 50 && b < gray);
        assert!((g as i32 - 100).abs() <= 2);
    }

    #[test]
    fn test_gray_pixels_unchanged_by_color_enhance() {
        let image = RgbImage::from_pixel(2, 2, Rgb([77, 77, 77]));
        assert_eq!(enhance_color(&image, 0.9), image);
    }

    #[test]
    fn test_brightness_scales_and_clamps() {
        let image = RgbImage::from_raw(2, 1, vec![100, 0, 250, 20, 40, 60]).unwrap();
        let out = enhance_brightness(&image, 1.5);
        assert_eq!(out.into_raw(), vec![150, 0, 255, 30, 60, 90]);
    }
}
