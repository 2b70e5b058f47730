//! Scan effect pipeline
//!
//! Turns a clean page render into something that looks like it went through
//! a photocopier. Stages, in order:
//!
//! 1. Tone mapping selected by [`EffectMode`]
//! 2. Channel normalization back to RGB
//! 3. Brightness lift
//! 4. Smoothing
//! 5. Gaussian grain (stochastic)
//! 6. Radial vignette over a paper-colored background
//!
//! Every stage returns a new buffer with the input's dimensions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use docscan_server::effects::{apply_scan_effect, EffectMode};
//!
//! let scanned = apply_scan_effect(&page, EffectMode::Bw, &mut rand::thread_rng());
//! assert_eq!(scanned.dimensions(), page.dimensions());
//! ```

mod filter;
mod grain;
mod tone;
mod vignette;

use std::fmt;

use image::{DynamicImage, RgbImage};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use filter::smooth;
pub use grain::add_grain;
pub use tone::{binarize, enhance_brightness, enhance_color, enhance_contrast, luminance};
pub use vignette::{apply_vignette, vignette_mask, BACKGROUND};

const GRAY_CONTRAST: f32 = 1.1;
const BW_CONTRAST: f32 = 1.5;
const BW_THRESHOLD: u8 = 180;
const COLOR_SATURATION: f32 = 0.9;
const BRIGHTNESS: f32 = 1.05;
const GRAIN_SIGMA: f64 = 8.0;
const BW_GRAIN_SIGMA: f64 = 12.0;

/// Tone mapping chain applied to every page of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    /// Slightly desaturated color (also the fallback)
    #[default]
    Color,
    /// Grayscale with a mild contrast boost
    Gray,
    /// High-contrast black and white
    Bw,
}

impl EffectMode {
    /// Parse a mode name; anything unrecognized selects [`EffectMode::Color`]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "gray" => Self::Gray,
            "bw" => Self::Bw,
            _ => Self::Color,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Gray => "gray",
            Self::Bw => "bw",
        }
    }

    /// Standard deviation of the grain noise
    pub fn grain_sigma(&self) -> f64 {
        match self {
            Self::Bw => BW_GRAIN_SIGMA,
            Self::Color | Self::Gray => GRAIN_SIGMA,
        }
    }
}

impl From<&str> for EffectMode {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl fmt::Display for EffectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage 1: mode-specific tone mapping
///
/// Gray and black-and-white modes return a single-channel image.
pub fn tone_map(image: &RgbImage, mode: EffectMode) -> DynamicImage {
    match mode {
        EffectMode::Gray => {
            let gray = luminance(image);
            DynamicImage::ImageLuma8(enhance_contrast(&gray, GRAY_CONTRAST))
        }
        EffectMode::Bw => {
            let gray = luminance(image);
            let contrasted = enhance_contrast(&gray, BW_CONTRAST);
            DynamicImage::ImageLuma8(binarize(&contrasted, BW_THRESHOLD))
        }
        EffectMode::Color => DynamicImage::ImageRgb8(enhance_color(image, COLOR_SATURATION)),
    }
}

/// Run the full effect chain on one page
pub fn apply_scan_effect<R: Rng + ?Sized>(
    image: &RgbImage,
    mode: EffectMode,
    rng: &mut R,
) -> RgbImage {
    // Later stages assume three channels
    let toned = tone_map(image, mode).to_rgb8();
    let brightened = enhance_brightness(&toned, BRIGHTNESS);
    let smoothed = smooth(&brightened);
    let grained = add_grain(&smoothed, mode.grain_sigma(), rng);
    apply_vignette(&grained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MODES: [EffectMode; 3] = [EffectMode::Color, EffectMode::Gray, EffectMode::Bw];

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) % 256) as u8,
            ])
        })
    }

    #[test]
    fn test_mode_parsing_falls_back_to_color() {
        assert_eq!(EffectMode::parse("gray"), EffectMode::Gray);
        assert_eq!(EffectMode::parse("bw"), EffectMode::Bw);
        assert_eq!(EffectMode::parse("color"), EffectMode::Color);
        assert_eq!(EffectMode::parse("sepia"), EffectMode::Color);
        assert_eq!(EffectMode::parse(""), EffectMode::Color);
        assert_eq!(EffectMode::from("BW"), EffectMode::Bw);
    }

    #[test]
    fn test_grain_sigma_per_mode() {
        assert_eq!(EffectMode::Bw.grain_sigma(), 12.0);
        assert_eq!(EffectMode::Gray.grain_sigma(), 8.0);
        assert_eq!(EffectMode::Color.grain_sigma(), 8.0);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&EffectMode::Bw).unwrap(), "\"bw\"");
        let mode: EffectMode = serde_json::from_str("\"gray\"").unwrap();
        assert_eq!(mode, EffectMode::Gray);
    }

    #[test]
    fn test_bw_tone_is_binary() {
        let toned = tone_map(&gradient(64, 32), EffectMode::Bw);
        let gray = toned.as_luma8().expect("bw produces a single channel");

        assert!(gray.iter().all(|&v| v == 0 || v == 255));
        assert!(gray.iter().any(|&v| v == 0));
        assert!(gray.iter().any(|&v| v == 255));
    }

    #[test]
    fn test_gray_tone_is_single_channel() {
        let toned = tone_map(&gradient(16, 16), EffectMode::Gray);
        assert!(toned.as_luma8().is_some());

        let toned = tone_map(&gradient(16, 16), EffectMode::Color);
        assert!(toned.as_rgb8().is_some());
    }

    #[test]
    fn test_output_shape_for_every_mode() {
        let mut rng = StdRng::seed_from_u64(42);
        for (width, height) in [(40, 30), (1, 1), (7, 1), (0, 0)] {
            let page = gradient(width, height);
            for mode in MODES {
                let out = apply_scan_effect(&page, mode, &mut rng);
                assert_eq!(out.dimensions(), (width, height), "{} {}x{}", mode, width, height);
                assert_eq!(out.as_raw().len(), (width * height * 3) as usize);
            }
        }
    }

    #[test]
    fn test_gray_output_channels_match_before_grain() {
        let toned = tone_map(&gradient(8, 8), EffectMode::Gray).to_rgb8();
        assert!(toned.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn test_corners_fade_to_background() {
        let mut rng = StdRng::seed_from_u64(3);
        let page = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
        let out = apply_scan_effect(&page, EffectMode::Color, &mut rng);

        assert_eq!(out.get_pixel(0, 0).0, BACKGROUND.0);
        assert_eq!(out.get_pixel(49, 49).0, BACKGROUND.0);
    }
}
