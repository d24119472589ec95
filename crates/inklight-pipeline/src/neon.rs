//! Neon composition: colored contour strokes over glowing edges.
//!
//! Two mutually exclusive coloring strategies pick a color per contour:
//!
//! - Per-contour mode hashes each contour's id onto the hue wheel with
//!   the golden angle, optionally clustering contour centroids first so
//!   nearby contours share a hue.
//! - Object-grouping mode fuses thickly rasterized boundaries into
//!   blobs, keeps the largest few as objects, and colors each object's
//!   member contours from a fixed neon palette by size rank. Contours
//!   that belong to no kept object are left out of the colored layer.
//!
//! Either way, the final image is a weighted saturating sum of glowing
//! and sharp renditions of two layers: uncovered edge-mask pixels in
//! the configured edge color, and the colored contour strokes.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::definitions::Image;
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;
use imageproc::region_labelling::{Connectivity, connected_components};
use palette::{Hsv, IntoColor, Srgb};

use crate::canvas::Canvas;
use crate::cluster::{self, Clustering};
use crate::config::PipelineConfig;
use crate::edge::force_odd;
use crate::glow;
use crate::types::Contour;

/// Golden angle in degrees; successive indices land far apart on the
/// hue wheel.
const GOLDEN_ANGLE: f64 = 137.508;
/// Stroke width of the colored contour lines.
const CONTOUR_WIDTH: f32 = 2.5;
/// Stroke width used when rasterizing boundaries for object grouping,
/// thick enough that nearby boundaries touch.
const GROUPING_WIDTH: f32 = 6.0;
/// Stroke width of the white core overlay.
const CORE_WIDTH: f32 = 1.0;
/// Evenly spaced sample points per contour for the object vote.
const OBJECT_SAMPLES: usize = 24;
/// Absolute floor on object area in pixels.
const MIN_OBJECT_AREA: f64 = 100.0;
/// Components covering more than this fraction of the image are
/// treated as a spuriously merged background, not an object.
const MAX_OBJECT_AREA_RATIO: f64 = 0.60;
/// The largest kept objects, by rank, that receive a white core.
const CORE_RANKS: usize = 3;

/// Composite weights: glowing edge, glowing contour, sharp edge, sharp
/// contour, white core.
const EDGE_GLOW_WEIGHT: f32 = 0.6;
const CONTOUR_GLOW_WEIGHT: f32 = 1.2;
const EDGE_SHARP_WEIGHT: f32 = 0.5;
const CONTOUR_SHARP_WEIGHT: f32 = 1.0;
const CORE_WEIGHT: f32 = 0.5;

/// Object colors by size rank: a fixed wheel of saturated neon tones.
const NEON_PALETTE: [[u8; 3]; 12] = [
    [255, 0, 255],   // magenta
    [0, 255, 255],   // cyan
    [57, 255, 20],   // green
    [255, 95, 31],   // orange
    [31, 81, 255],   // blue
    [255, 240, 31],  // yellow
    [255, 16, 146],  // pink
    [111, 255, 233], // aqua
    [189, 31, 255],  // violet
    [255, 49, 49],   // red
    [148, 255, 49],  // lime
    [255, 53, 184],  // rose
];

/// Product of neon composition.
#[derive(Debug, Clone)]
pub struct NeonRender {
    /// The composited neon image, sized like the mask.
    pub image: RgbImage,
    /// Distinct color groups: clusters in per-contour mode, kept
    /// objects in object-grouping mode.
    pub color_groups: usize,
    /// Contours that made it into the colored layer.
    pub contours_drawn: usize,
}

/// Compose the neon rendering for an edge mask and its contours.
#[must_use = "returns the composed neon rendering"]
pub fn compose(mask: &GrayImage, contours: &[Contour], config: &PipelineConfig) -> NeonRender {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return NeonRender {
            image: RgbImage::new(width, height),
            color_groups: 0,
            contours_drawn: 0,
        };
    }

    let (colors, color_groups, core_contours) = if config.per_contour_mode {
        let (colors, groups) = per_contour_colors(contours, config);
        (colors, groups, Vec::new())
    } else {
        let grouping = group_objects(mask, contours, config);
        (grouping.colors, grouping.object_count, grouping.core_contours)
    };

    let Some(mut contour_canvas) = Canvas::new(width, height) else {
        return NeonRender {
            image: RgbImage::new(width, height),
            color_groups,
            contours_drawn: 0,
        };
    };
    let mut contours_drawn = 0;
    for (contour, color) in contours.iter().zip(&colors) {
        let Some(color) = color else { continue };
        contour_canvas.stroke_closed(contour.points(), *color, CONTOUR_WIDTH);
        contours_drawn += 1;
    }
    let coverage = contour_canvas.coverage_mask();
    let contour_layer = contour_canvas.into_rgb();

    // Edge pixels not under any drawn contour keep the flat edge color.
    let mut edge_layer = RgbImage::new(width, height);
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] > 0 && coverage.get_pixel(x, y).0[0] == 0 {
            edge_layer.put_pixel(x, y, Rgb(config.edge_color));
        }
    }

    let core = core_layer(width, height, contours, &core_contours);

    let mut image = RgbImage::new(width, height);
    let edge_glow = glow::glow(&edge_layer, config.glow_strength, config.glow_size);
    let contour_glow = glow::glow(&contour_layer, config.glow_strength, config.glow_size);
    glow::add_weighted(&mut image, &edge_glow, EDGE_GLOW_WEIGHT);
    glow::add_weighted(&mut image, &contour_glow, CONTOUR_GLOW_WEIGHT);
    glow::add_weighted(&mut image, &edge_layer, EDGE_SHARP_WEIGHT);
    glow::add_weighted(&mut image, &contour_layer, CONTOUR_SHARP_WEIGHT);
    if let Some(core) = &core {
        glow::add_weighted(&mut image, core, CORE_WEIGHT);
    }

    NeonRender {
        image,
        color_groups,
        contours_drawn,
    }
}

/// Hue-wheel color for a cluster or contour id: `137.508° × id`, full
/// saturation and value.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn golden_angle_color(index: usize) -> Rgb<u8> {
    let hue = (GOLDEN_ANGLE * index as f64) % 360.0;
    let hsv = Hsv::new(hue as f32, 1.0, 1.0);
    let rgb: Srgb = hsv.into_color();
    let (r, g, b) = rgb.into_components();
    Rgb([
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    ])
}

/// Per-contour coloring: cluster centroids when enabled and there are
/// at least two contours, otherwise every contour is its own cluster;
/// either way the compacted cluster id picks the hue.
fn per_contour_colors(
    contours: &[Contour],
    config: &PipelineConfig,
) -> (Vec<Option<Rgb<u8>>>, usize) {
    let clustering = if config.kmeans_enabled && contours.len() >= 2 {
        let centroids: Vec<(f64, f64)> = contours.iter().map(Contour::centroid).collect();
        cluster::cluster_points(&centroids, config.kmeans_k, config.kmeans_near_distance)
    } else {
        Clustering::identity(contours.len())
    };
    let colors = clustering
        .assignments
        .iter()
        .map(|&id| Some(golden_angle_color(id)))
        .collect();
    (colors, clustering.cluster_count)
}

/// Result of object grouping: a color per contour (None for contours
/// outside every kept object), the number of kept objects, and the
/// contours belonging to the largest objects.
struct ObjectGrouping {
    colors: Vec<Option<Rgb<u8>>>,
    object_count: usize,
    core_contours: Vec<usize>,
}

/// Fuse contour boundaries into blobs, keep the largest as objects,
/// and vote each contour into the object most of its samples land on.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn group_objects(mask: &GrayImage, contours: &[Contour], config: &PipelineConfig) -> ObjectGrouping {
    let none = ObjectGrouping {
        colors: vec![None; contours.len()],
        object_count: 0,
        core_contours: Vec::new(),
    };
    if contours.is_empty() {
        return none;
    }
    let (width, height) = mask.dimensions();
    let Some(mut canvas) = Canvas::new(width, height) else {
        return none;
    };
    for contour in contours {
        canvas.stroke_closed(contour.points(), Rgb([255, 255, 255]), GROUPING_WIDTH);
    }
    let mut blob = canvas.coverage_mask();
    let radius = ((force_odd(config.join_size) - 1) / 2).min(255) as u8;
    if radius > 0 {
        blob = close(&blob, Norm::L2, radius);
    }
    let labels = connected_components(&blob, Connectivity::Eight, Luma([0u8]));

    let mut areas: Vec<u64> = Vec::new();
    for pixel in labels.pixels() {
        let id = pixel.0[0] as usize;
        if id >= areas.len() {
            areas.resize(id + 1, 0);
        }
        areas[id] += 1;
    }

    let image_area = f64::from(width) * f64::from(height);
    let floor = (config.min_object_area_ratio * image_area).max(MIN_OBJECT_AREA);
    let ceiling = MAX_OBJECT_AREA_RATIO * image_area;
    let mut kept: Vec<usize> = (1..areas.len())
        .filter(|&id| {
            let area = areas[id] as f64;
            area >= floor && area <= ceiling
        })
        .collect();
    kept.sort_by(|a, b| areas[*b].cmp(&areas[*a]).then(a.cmp(b)));
    kept.truncate(config.max_objects);

    let mut rank_of: Vec<Option<usize>> = vec![None; areas.len()];
    for (rank, &id) in kept.iter().enumerate() {
        rank_of[id] = Some(rank);
    }

    let mut colors = vec![None; contours.len()];
    let mut core_contours = Vec::new();
    for (i, contour) in contours.iter().enumerate() {
        let Some(rank) = vote_rank(contour, &labels, &rank_of, kept.len()) else {
            continue;
        };
        colors[i] = Some(Rgb(NEON_PALETTE[rank % NEON_PALETTE.len()]));
        if rank < CORE_RANKS {
            core_contours.push(i);
        }
    }

    ObjectGrouping {
        colors,
        object_count: kept.len(),
        core_contours,
    }
}

/// The kept-object rank receiving the most of this contour's sample
/// votes; ties go to the larger object. `None` when no sample lands on
/// a kept object.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn vote_rank(
    contour: &Contour,
    labels: &Image<Luma<u32>>,
    rank_of: &[Option<usize>],
    kept: usize,
) -> Option<usize> {
    if kept == 0 || contour.is_empty() {
        return None;
    }
    let points = contour.points();
    let mut votes = vec![0usize; kept];
    for sample in 0..OBJECT_SAMPLES {
        let point = points[sample * points.len() / OBJECT_SAMPLES];
        let x = point.x.clamp(0, labels.width() as i32 - 1) as u32;
        let y = point.y.clamp(0, labels.height() as i32 - 1) as u32;
        let id = labels.get_pixel(x, y).0[0] as usize;
        if let Some(Some(rank)) = rank_of.get(id) {
            votes[*rank] += 1;
        }
    }
    let mut best = 0;
    let mut best_votes = 0;
    for (rank, &count) in votes.iter().enumerate() {
        if count > best_votes {
            best_votes = count;
            best = rank;
        }
    }
    (best_votes > 0).then_some(best)
}

/// Thin white strokes along the member contours of the largest
/// objects. `None` when there is nothing to trace.
fn core_layer(
    width: u32,
    height: u32,
    contours: &[Contour],
    core_contours: &[usize],
) -> Option<RgbImage> {
    if core_contours.is_empty() {
        return None;
    }
    let mut canvas = Canvas::new(width, height)?;
    for &i in core_contours {
        canvas.stroke_closed(contours[i].points(), Rgb([255, 255, 255]), CORE_WIDTH);
    }
    Some(canvas.into_rgb())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn square(x0: i32, y0: i32, side: i32) -> Contour {
        Contour::new(vec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
        ])
    }

    #[test]
    fn index_zero_is_pure_red() {
        assert_eq!(golden_angle_color(0), Rgb([255, 0, 0]));
    }

    #[test]
    fn golden_angle_hues_differ_for_small_indices() {
        let colors: Vec<_> = (0..8).map(golden_angle_color).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b, "expected distinct hues for small indices");
            }
        }
    }

    #[test]
    fn empty_mask_and_contours_produce_black() {
        let mask = GrayImage::new(50, 50);
        let render = compose(&mask, &[], &PipelineConfig::default());
        assert_eq!(render.image.dimensions(), (50, 50));
        assert!(render.image.pixels().all(|p| p.0 == [0, 0, 0]));
        assert_eq!(render.color_groups, 0);
        assert_eq!(render.contours_drawn, 0);
    }

    #[test]
    fn mask_without_contours_reduces_to_glowing_edges() {
        let mut mask = GrayImage::new(60, 60);
        for x in 10..50 {
            mask.put_pixel(x, 30, Luma([255]));
        }
        let render = compose(&mask, &[], &PipelineConfig::default());
        // Default edge color is red: the line itself carries at least the
        // sharp weight, and the halo spills past it.
        assert!(render.image.get_pixel(30, 30).0[0] > 100);
        assert!(render.image.get_pixel(30, 33).0[0] > 0);
        assert_eq!(render.contours_drawn, 0);
    }

    #[test]
    fn per_contour_mode_draws_every_contour() {
        let mask = GrayImage::new(120, 120);
        let contours = [square(10, 10, 30), square(70, 70, 30)];
        let config = PipelineConfig {
            kmeans_enabled: false,
            ..PipelineConfig::default()
        };
        let render = compose(&mask, &contours, &config);
        assert_eq!(render.contours_drawn, 2);
        assert_eq!(render.color_groups, 2);
        assert!(render.image.pixels().any(|p| p.0 != [0, 0, 0]));
    }

    #[test]
    fn clustering_merges_adjacent_contours() {
        let mask = GrayImage::new(256, 256);
        let contours = [square(5, 5, 10), square(15, 5, 10), square(195, 195, 10)];
        let config = PipelineConfig {
            kmeans_k: 2,
            kmeans_near_distance: 50.0,
            ..PipelineConfig::default()
        };
        let render = compose(&mask, &contours, &config);
        assert_eq!(render.color_groups, 2, "near pair shares, far square alone");
        assert_eq!(render.contours_drawn, 3);
    }

    #[test]
    fn tight_near_distance_splits_groups() {
        let mask = GrayImage::new(256, 256);
        let contours = [square(5, 5, 10), square(15, 5, 10), square(195, 195, 10)];
        let config = PipelineConfig {
            kmeans_k: 2,
            kmeans_near_distance: 1.0,
            ..PipelineConfig::default()
        };
        let render = compose(&mask, &contours, &config);
        assert_eq!(render.color_groups, 3, "eviction isolates every centroid");
    }

    #[test]
    fn object_grouping_keeps_only_the_largest_components() {
        let mask = GrayImage::new(200, 200);
        let contours = [square(10, 10, 40), square(100, 10, 30), square(150, 150, 12)];
        let config = PipelineConfig {
            per_contour_mode: false,
            max_objects: 2,
            min_object_area_ratio: 0.001,
            ..PipelineConfig::default()
        };
        let render = compose(&mask, &contours, &config);
        assert_eq!(render.color_groups, 2, "two largest blobs survive the cap");
        assert_eq!(render.contours_drawn, 2, "the smallest contour is not drawn");
    }

    #[test]
    fn largest_object_gets_a_white_core() {
        let mask = GrayImage::new(200, 200);
        let contours = [square(10, 10, 40)];
        let config = PipelineConfig {
            per_contour_mode: false,
            max_objects: 6,
            min_object_area_ratio: 0.001,
            ..PipelineConfig::default()
        };
        let render = compose(&mask, &contours, &config);
        assert_eq!(render.color_groups, 1);
        // Rank 0 colors strokes magenta (green channel 0); the white core
        // is the only contributor of green along the boundary.
        let pixel = render.image.get_pixel(30, 10);
        assert!(
            pixel.0[1] > 40,
            "expected white core light at the boundary, got {:?}",
            pixel.0,
        );
    }

    #[test]
    fn zero_max_objects_draws_no_contours() {
        let mask = GrayImage::new(100, 100);
        let contours = [square(10, 10, 40)];
        let config = PipelineConfig {
            per_contour_mode: false,
            max_objects: 0,
            ..PipelineConfig::default()
        };
        let render = compose(&mask, &contours, &config);
        assert_eq!(render.color_groups, 0);
        assert_eq!(render.contours_drawn, 0);
        assert!(render.image.pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
