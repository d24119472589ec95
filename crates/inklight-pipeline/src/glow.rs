//! Glow construction: widening Gaussian passes folded into halos, plus
//! the saturating weighted add used to composite layers.
//!
//! `imageproc`'s Gaussian blur only accepts grayscale images, so color
//! layers are split into channels, blurred independently, and
//! reassembled; Gaussian blur is linear and per-channel, so the result
//! matches blurring in color space.

use image::{GrayImage, Rgb, RgbImage};

use crate::edge::{force_odd, kernel_sigma};

/// Blend weight of every blur pass after the first.
const FOLD_WEIGHT: f32 = 0.5;
/// Kernel growth per pass in pixels, so later passes halo wider.
const PASS_WIDENING: u32 = 10;

/// Fold `strength` successively wider blur passes of `layer` into one
/// glow layer.
///
/// Pass `p` blurs the original layer with a forced-odd kernel of
/// `base_kernel + 10p`; pass 0 lands at full weight and every later
/// pass at half weight, saturating per channel. Zero strength yields a
/// black layer.
#[must_use = "returns the folded glow layer"]
pub fn glow(layer: &RgbImage, strength: u32, base_kernel: u32) -> RgbImage {
    let mut accumulator = RgbImage::new(layer.width(), layer.height());
    if layer.width() == 0 || layer.height() == 0 {
        return accumulator;
    }
    for pass in 0..strength {
        let kernel = force_odd(base_kernel.saturating_add(PASS_WIDENING.saturating_mul(pass)));
        let blurred = blur_rgb(layer, kernel_sigma(kernel));
        let weight = if pass == 0 { 1.0 } else { FOLD_WEIGHT };
        add_weighted(&mut accumulator, &blurred, weight);
    }
    accumulator
}

/// Add `weight ×` layer onto the accumulator, saturating each channel
/// at 255. Both images must share dimensions.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn add_weighted(accumulator: &mut RgbImage, layer: &RgbImage, weight: f32) {
    for (acc, src) in accumulator.pixels_mut().zip(layer.pixels()) {
        for c in 0..3 {
            let sum = f32::from(src.0[c]).mul_add(weight, f32::from(acc.0[c]));
            acc.0[c] = sum.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Blur an RGB image by splitting it into grayscale channels, blurring
/// each, and reassembling. Non-positive sigma returns the image
/// unchanged.
fn blur_rgb(image: &RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 {
        return image.clone();
    }

    let (w, h) = image.dimensions();
    let channels: [GrayImage; 3] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]))
    });
    let blurred: [GrayImage; 3] =
        std::array::from_fn(|c| imageproc::filter::gaussian_blur_f32(&channels[c], sigma));

    RgbImage::from_fn(w, h, |x, y| {
        Rgb([
            blurred[0].get_pixel(x, y).0[0],
            blurred[1].get_pixel(x, y).0[0],
            blurred[2].get_pixel(x, y).0[0],
        ])
    })
}
