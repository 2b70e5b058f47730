//! Film grain
//!
//! Adds zero-mean Gaussian noise to every sample. The random source is a
//! parameter: production passes a freshly seeded generator per request,
//! tests pass a seeded `StdRng` and check statistics rather than exact
//! pixels.

use image::RgbImage;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Perturb each sample by `N(0, sigma)`, truncated toward zero, then clamp
pub fn add_grain<R: Rng + ?Sized>(image: &RgbImage, sigma: f64, rng: &mut R) -> RgbImage {
    let mut out = image.clone();
    for sample in out.iter_mut() {
        let z: f64 = StandardNormal.sample(rng);
        let noise = (z * sigma) as i16;
        *sample = (*sample as i16 + noise).clamp(0, 255) as u8;
    }
    out
}
