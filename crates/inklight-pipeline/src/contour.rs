//! Contour extraction: trace closed boundaries from a binary edge mask
//! and filter out the ones too small to stylize.
//!
//! Tracing uses Suzuki-Abe border following via
//! [`imageproc::contours::find_contours`]; the reported hierarchy is
//! discarded since both stylizers treat contours as a flat list. Traced
//! borders visit every boundary pixel, so straight runs are compressed
//! to their endpoints before anything downstream walks the points.

use image::GrayImage;

use crate::config::PipelineConfig;
use crate::simplify;
use crate::types::{Contour, Point};

/// Trace all contours in a binary edge mask.
///
/// Returns contours in discovery order (scanline order of each
/// contour's first pixel), which downstream coloring relies on being
/// deterministic. Straight pixel runs are collapsed to their endpoints;
/// contours left with fewer than 2 points are dropped.
#[must_use = "returns the traced contours"]
pub fn trace_contours(mask: &GrayImage) -> Vec<Contour> {
    let raw: Vec<imageproc::contours::Contour<i32>> = imageproc::contours::find_contours(mask);

    raw.into_iter()
        .map(|c| {
            let points: Vec<Point> = c.points.iter().map(|p| Point::new(p.x, p.y)).collect();
            Contour::new(compress_collinear(&points))
        })
        .filter(|c| c.len() >= 2)
        .collect()
}

/// Keep only contours large enough to matter: enclosed area strictly
/// greater than `config.min_area` and closed perimeter strictly greater
/// than `config.min_length`.
///
/// When `config.simplify_epsilon` is positive, survivors are simplified
/// with Ramer-Douglas-Peucker afterwards; simplification never reduces
/// a contour below 2 points.
#[must_use = "returns the surviving contours"]
pub fn filter_contours(contours: Vec<Contour>, config: &PipelineConfig) -> Vec<Contour> {
    let kept = contours
        .into_iter()
        .filter(|c| c.area() > config.min_area && c.perimeter() > config.min_length);

    if config.simplify_epsilon > 0.0 {
        kept.map(|c| simplify::simplify(&c, config.simplify_epsilon))
            .filter(|c| c.len() >= 2)
            .collect()
    } else {
        kept.collect()
    }
}

/// Drop interior points of straight runs around the closed ring: a
/// point survives only when the step direction into it differs from the
/// step direction out of it. The wrap from the last point back to the
/// first counts as a step, so a traced square compresses to exactly its
/// corners.
fn compress_collinear(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut compressed = Vec::with_capacity(n);
    for i in 0..n {
        let into = step(points[(i + n - 1) % n], points[i]);
        let out = step(points[i], points[(i + 1) % n]);
        if into != out {
            compressed.push(points[i]);
        }
    }

    // A ring of duplicate points has no direction changes at all.
    if compressed.len() < 2 {
        return vec![points[0], points[n - 1]];
    }
    compressed
}

/// Unit step direction between adjacent traced pixels.
const fn step(a: Point, b: Point) -> (i32, i32) {
    ((b.x - a.x).signum(), (b.y - a.y).signum())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mask with a filled white square covering `range` in both axes.
    fn square_mask(size: u32, range: std::ops::Range<u32>) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if range.contains(&x) && range.contains(&y) {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        })
    }

    #[test]
    fn empty_mask_produces_no_contours() {
        let mask = GrayImage::new(20, 20);
        assert!(trace_contours(&mask).is_empty());
    }

    #[test]
    fn filled_square_produces_one_compressed_contour() {
        let contours = trace_contours(&square_mask(30, 5..25));
        assert_eq!(contours.len(), 1);
        // A square boundary compresses to its corners.
        assert_eq!(contours[0].len(), 4);
    }

    #[test]
    fn single_pixel_is_dropped() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(5, 5, image::Luma([255]));
        for contour in trace_contours(&mask) {
            assert!(contour.len() >= 2);
        }
    }

    #[test]
    fn discovery_order_is_deterministic() {
        let mut mask = GrayImage::new(40, 40);
        for (cx, cy) in [(8_u32, 8_u32), (28, 8), (8, 28)] {
            for y in cy - 3..cy + 3 {
                for x in cx - 3..cx + 3 {
                    mask.put_pixel(x, y, image::Luma([255]));
                }
            }
        }
        let a = trace_contours(&mask);
        let b = trace_contours(&mask);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn filter_enforces_both_minimums() {
        let big = Contour::new(vec![
            Point::new(0, 0),
            Point::new(30, 0),
            Point::new(30, 30),
            Point::new(0, 30),
        ]);
        // Large area but tiny perimeter threshold exercises the AND.
        let small = Contour::new(vec![
            Point::new(0, 0),
            Point::new(5, 0),
            Point::new(5, 5),
            Point::new(0, 5),
        ]);

        let config = PipelineConfig {
            min_area: 100.0,
            min_length: 10.0,
            ..PipelineConfig::default()
        };
        let kept = filter_contours(vec![big.clone(), small], &config);
        assert_eq!(kept, vec![big.clone()]);

        // Area passes (900 > 100) but perimeter must also pass.
        let strict_length = PipelineConfig {
            min_area: 100.0,
            min_length: 200.0,
            ..PipelineConfig::default()
        };
        assert!(filter_contours(vec![big], &strict_length).is_empty());
    }

    #[test]
    fn filter_thresholds_are_strict() {
        // Exactly at the thresholds: area == min_area, perimeter == min_length.
        let square = Contour::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ]);
        let config = PipelineConfig {
            min_area: 100.0,
            min_length: 40.0,
            ..PipelineConfig::default()
        };
        assert!(filter_contours(vec![square], &config).is_empty());
    }

    #[test]
    fn simplification_applies_when_enabled() {
        // A square with collinear midpoints on each side.
        let square = Contour::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(20, 0),
            Point::new(20, 10),
            Point::new(20, 20),
            Point::new(10, 20),
            Point::new(0, 20),
            Point::new(0, 10),
        ]);
        let config = PipelineConfig {
            min_area: 1.0,
            min_length: 1.0,
            simplify_epsilon: 0.5,
            ..PipelineConfig::default()
        };
        let kept = filter_contours(vec![square], &config);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].len() < 8, "midpoints should be removed");
        assert!(kept[0].len() >= 2);
    }

    #[test]
    fn compress_collinear_keeps_corners() {
        let points = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(3, 0),
            Point::new(3, 1),
            Point::new(3, 2),
        ];
        let compressed = compress_collinear(&points);
        assert_eq!(
            compressed,
            vec![Point::new(0, 0), Point::new(3, 0), Point::new(3, 2)],
        );
    }

    #[test]
    fn compress_collinear_keeps_diagonal_turns() {
        let points = vec![
            Point::new(0, 0),
            Point::new(1, 1),
            Point::new(2, 2),
            Point::new(3, 2),
        ];
        let compressed = compress_collinear(&points);
        assert_eq!(
            compressed,
            vec![Point::new(0, 0), Point::new(2, 2), Point::new(3, 2)],
        );
    }
}
