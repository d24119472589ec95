//! Edge detection: grayscale conversion, noise reduction, Canny, and
//! optional mask cleanup.
//!
//! Produces a strictly binary mask (255 = edge, 0 = background) with the
//! same dimensions as the input. The optional cleanup steps run in a
//! fixed order: morphological close/open, dilation with re-thinning,
//! then smoothing with re-thresholding, so the mask stays binary no
//! matter which combination is enabled.

use image::{GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::bilateral::GaussianEuclideanColorDistance;
use imageproc::morphology::{close, dilate, open};

use crate::config::PipelineConfig;
use crate::thin;

/// Minimum allowed Canny threshold.
///
/// A low threshold of zero causes every pixel with any gradient to be
/// treated as a potential edge, producing an extremely dense edge map
/// that overwhelms downstream contour extraction and stroke synthesis.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Binarization cutoff applied after mask smoothing.
const SMOOTHING_CUTOFF: u8 = 30;

/// Normalize a kernel size: at least 1, and odd.
///
/// Even sizes round up so a slider sweeping 0..n never produces a kernel
/// the filters reject.
#[must_use]
pub const fn force_odd(size: u32) -> u32 {
    let size = if size == 0 { 1 } else { size };
    if size % 2 == 0 { size + 1 } else { size }
}

/// Gaussian sigma equivalent to an odd kernel of size `k`, matching the
/// usual `0.3 * ((k - 1) * 0.5 - 1) + 0.8` convention so kernel-size
/// sliders behave like their convolution counterparts.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn kernel_sigma(k: u32) -> f32 {
    0.3 * ((k as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Detect edges in a color image.
///
/// Steps, in order:
///
/// 1. Grayscale conversion.
/// 2. Noise reduction: Gaussian blur sized by `config.blur`, or an
///    edge-preserving bilateral filter when `config.use_bilateral`.
/// 3. Canny edge detection with clamped thresholds.
/// 4. Optional morphological close-then-open (`config.morphology_size`).
/// 5. Optional dilation followed by re-thinning to single-pixel width
///    (`config.edge_dilation`).
/// 6. Optional Gaussian smoothing followed by re-thresholding
///    (`config.edge_smoothing`).
///
/// The output is binary (every pixel 0 or 255) and dimension-equal to
/// the input. Zero-dimension inputs short-circuit to an empty mask.
#[must_use = "returns the binary edge mask"]
pub fn detect_edges(image: &RgbImage, config: &PipelineConfig) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let gray = image::imageops::grayscale(image);
    let smoothed = reduce_noise(&gray, config);

    let (low, high) = clamped_thresholds(config);
    let mut edges = imageproc::edges::canny(&smoothed, low, high);

    if config.morphology_size > 0 {
        let radius = kernel_radius(config.morphology_size);
        if radius > 0 {
            edges = open(&close(&edges, Norm::L2, radius), Norm::L2, radius);
        }
    }

    if config.edge_dilation > 0 {
        let radius = kernel_radius(config.edge_dilation);
        if radius > 0 {
            edges = thin::thin(&dilate(&edges, Norm::L2, radius));
        }
    }

    if config.edge_smoothing > 0 {
        let k = force_odd(config.edge_smoothing);
        let blurred = imageproc::filter::gaussian_blur_f32(&edges, kernel_sigma(k));
        edges = binarize(&blurred, SMOOTHING_CUTOFF);
    }

    edges
}

/// Canny thresholds after clamping: both at least [`MIN_THRESHOLD`],
/// and low never above high.
pub(crate) fn clamped_thresholds(config: &PipelineConfig) -> (f32, f32) {
    let high = config.canny_high.max(MIN_THRESHOLD);
    let low = config.canny_low.max(MIN_THRESHOLD).min(high);
    (low, high)
}

/// Pre-detection noise reduction: bilateral when requested, otherwise a
/// Gaussian blur sized by the (odd-forced) `blur` kernel. A kernel of 1
/// leaves the image untouched.
#[allow(clippy::cast_possible_truncation)]
fn reduce_noise(gray: &GrayImage, config: &PipelineConfig) -> GrayImage {
    if config.use_bilateral {
        // `bilateral_filter` takes a radius; the config stores the window
        // diameter, so convert with the usual `(d - 1) / 2`.
        let radius = ((config.bilateral_diameter.max(1) - 1) / 2).min(255) as u8;
        return imageproc::filter::bilateral_filter(
            gray,
            radius,
            config.bilateral_sigma_space.max(0.1),
            GaussianEuclideanColorDistance::new(config.bilateral_sigma_color.max(0.1)),
        );
    }

    let k = force_odd(config.blur);
    if k <= 1 {
        return gray.clone();
    }
    imageproc::filter::gaussian_blur_f32(gray, kernel_sigma(k))
}

/// Threshold a grayscale image into a strict binary mask: values above
/// `cutoff` become 255, everything else 0.
#[must_use = "returns the binarized mask"]
pub fn binarize(image: &GrayImage, cutoff: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([if image.get_pixel(x, y).0[0] > cutoff {
            255
        } else {
            0
        }])
    })
}

/// Disc radius for an odd-forced kernel size: `(k - 1) / 2`, capped at
/// the `u8` range the morphology operators accept.
#[allow(clippy::cast_possible_truncation)]
fn kernel_radius(size: u32) -> u8 {
    ((force_odd(size) - 1) / 2).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 40x40 color image with a filled white square on black.
    fn square_image() -> RgbImage {
        RgbImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        })
    }

    fn assert_binary(mask: &GrayImage) {
        for pixel in mask.pixels() {
            assert!(
                pixel.0[0] == 0 || pixel.0[0] == 255,
                "mask must be binary, found {}",
                pixel.0[0],
            );
        }
    }

    #[test]
    fn force_odd_normalizes() {
        assert_eq!(force_odd(0), 1);
        assert_eq!(force_odd(1), 1);
        assert_eq!(force_odd(4), 5);
        assert_eq!(force_odd(5), 5);
        assert_eq!(force_odd(20), 21);
    }

    #[test]
    fn kernel_sigma_grows_with_kernel() {
        assert!(kernel_sigma(3) < kernel_sigma(5));
        assert!(kernel_sigma(5) < kernel_sigma(15));
        assert!(kernel_sigma(1) > 0.0);
    }

    #[test]
    fn blank_image_produces_empty_mask() {
        let img = RgbImage::from_pixel(30, 30, image::Rgb([128, 128, 128]));
        let mask = detect_edges(&img, &PipelineConfig::default());
        assert_eq!(mask.dimensions(), (30, 30));
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn square_produces_binary_edges() {
        let mask = detect_edges(&square_image(), &PipelineConfig::default());
        assert_eq!(mask.dimensions(), (40, 40));
        assert_binary(&mask);
        let edge_count: u32 = mask.pixels().map(|p| u32::from(p.0[0] == 255)).sum();
        assert!(edge_count > 0, "expected edges around the square");
    }

    #[test]
    fn zero_dimension_input_short_circuits() {
        let img = RgbImage::new(0, 0);
        let mask = detect_edges(&img, &PipelineConfig::default());
        assert_eq!(mask.dimensions(), (0, 0));
    }

    #[test]
    fn clamped_thresholds_enforce_floor_and_order() {
        let config = PipelineConfig {
            canny_low: 0.0,
            canny_high: -5.0,
            ..PipelineConfig::default()
        };
        let (low, high) = clamped_thresholds(&config);
        assert!((low - MIN_THRESHOLD).abs() < f32::EPSILON);
        assert!((high - MIN_THRESHOLD).abs() < f32::EPSILON);
        assert!(low <= high);
    }

    #[test]
    fn inverted_thresholds_are_clamped() {
        let config = PipelineConfig {
            canny_low: 200.0,
            canny_high: 100.0,
            ..PipelineConfig::default()
        };
        let swapped = detect_edges(&square_image(), &config);
        let equal = detect_edges(
            &square_image(),
            &PipelineConfig {
                canny_low: 100.0,
                canny_high: 100.0,
                ..PipelineConfig::default()
            },
        );
        assert_eq!(swapped, equal);
    }

    #[test]
    fn mask_stays_binary_with_all_cleanup_steps() {
        let config = PipelineConfig {
            morphology_size: 3,
            edge_dilation: 4, // even on purpose; forced odd internally
            edge_smoothing: 5,
            ..PipelineConfig::default()
        };
        let mask = detect_edges(&square_image(), &config);
        assert_binary(&mask);
        assert_eq!(mask.dimensions(), (40, 40));
    }

    #[test]
    fn bilateral_path_produces_binary_mask() {
        let config = PipelineConfig {
            use_bilateral: true,
            ..PipelineConfig::default()
        };
        let mask = detect_edges(&square_image(), &config);
        assert_binary(&mask);
    }

    #[test]
    fn binarize_thresholds_strictly() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, image::Luma([30]));
        img.put_pixel(1, 0, image::Luma([31]));
        img.put_pixel(2, 0, image::Luma([0]));
        let mask = binarize(&img, 30);
        assert_eq!(mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(mask.get_pixel(1, 0).0[0], 255);
        assert_eq!(mask.get_pixel(2, 0).0[0], 0);
    }
}
