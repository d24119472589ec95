//! Edge-density field: how crowded with edges each neighborhood is.
//!
//! Stroke synthesis modulates skip probability, jitter, and brightness
//! by local edge density so busy regions get fewer, straighter, darker
//! strokes. The field is the mean of the binary mask over a 21x21
//! window, held in [0, 1]. A summed-area table makes each sample O(1),
//! and keeps the field in floating point (an integer box filter would
//! quantize away the small densities sparse regions produce).

use image::GrayImage;

/// Box window radius; the window spans `2 * RADIUS + 1` pixels per axis.
const RADIUS: i64 = 10;

/// Precomputed edge-density field over a binary mask.
#[derive(Debug, Clone)]
pub struct DensityField {
    /// Summed-area table of edge-pixel counts, `(width + 1) * (height + 1)`.
    integral: Vec<u32>,
    width: i64,
    height: i64,
}

/// Build the density field for a binary edge mask.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn edge_density(mask: &GrayImage) -> DensityField {
    let width = i64::from(mask.width());
    let height = i64::from(mask.height());
    let stride = (width + 1) as usize;

    let mut integral = vec![0_u32; stride * (height + 1) as usize];
    for (x, y, pixel) in mask.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let count = u32::from(pixel.0[0] != 0);
        integral[(y + 1) * stride + (x + 1)] =
            count + integral[y * stride + (x + 1)] + integral[(y + 1) * stride + x]
                - integral[y * stride + x];
    }

    DensityField {
        integral,
        width,
        height,
    }
}

impl DensityField {
    /// Mean edge coverage of the 21x21 window centered at `(x, y)`,
    /// in [0, 1]. Coordinates clamp to the field, and windows shrink at
    /// the borders so border samples stay true means.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn sample(&self, x: i32, y: i32) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }

        let cx = i64::from(x).clamp(0, self.width - 1);
        let cy = i64::from(y).clamp(0, self.height - 1);
        let x0 = (cx - RADIUS).max(0);
        let x1 = (cx + RADIUS).min(self.width - 1);
        let y0 = (cy - RADIUS).max(0);
        let y1 = (cy + RADIUS).min(self.height - 1);

        let stride = (self.width + 1) as usize;
        let at = |x: i64, y: i64| -> u32 { self.integral[y as usize * stride + x as usize] };

        let count = at(x1 + 1, y1 + 1) + at(x0, y0) - at(x0, y1 + 1) - at(x1 + 1, y0);
        let window = (x1 - x0 + 1) * (y1 - y0 + 1);
        count as f32 / window as f32
    }
}
