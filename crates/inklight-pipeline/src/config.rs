//! Pipeline configuration: the flat parameter set shared by every stage.
//!
//! All fields are plain numbers, booleans, or small arrays so the whole
//! struct can be serialized, diffed, and driven from sliders or CLI
//! flags. Mutating a config has no effect on previously produced
//! results; stages read a snapshot at call time.
//!
//! Structurally out-of-range values (even kernel sizes, zero sizes,
//! inverted Canny thresholds) are normalized inside the consuming stage
//! rather than rejected, so every config value produces a defined
//! rendering. Semantic quality of the parameters remains the caller's
//! responsibility.

use serde::{Deserialize, Serialize};

/// Configuration for the stylization pipeline.
///
/// Defaults match the values the parameter panel starts from and are
/// exposed as `DEFAULT_*` associated constants so binaries can reference
/// them without duplicating literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Canny low threshold. Gradient magnitudes between `canny_low` and
    /// `canny_high` become edges only when connected to a strong edge.
    /// Clamped to at least 1.0 and at most `canny_high` before use.
    pub canny_low: f32,

    /// Canny high threshold. Gradient magnitudes above this value are
    /// definite edges. Clamped to at least 1.0 before use.
    pub canny_high: f32,

    /// Gaussian pre-blur kernel size in pixels. Forced odd; sizes of 1
    /// or less skip the blur entirely. Ignored when `use_bilateral` is
    /// set.
    pub blur: u32,

    /// Replace the Gaussian pre-blur with an edge-preserving bilateral
    /// filter.
    pub use_bilateral: bool,

    /// Bilateral filter window diameter in pixels.
    pub bilateral_diameter: u32,

    /// Bilateral filter range sigma: how far apart intensities may be
    /// and still mix.
    pub bilateral_sigma_color: f32,

    /// Bilateral filter spatial sigma: how far apart pixels may be and
    /// still mix.
    pub bilateral_sigma_space: f32,

    /// Kernel size for morphological close-then-open cleanup of the edge
    /// mask. Forced odd; 0 disables the step.
    pub morphology_size: u32,

    /// Kernel size for edge dilation. Forced odd; after dilation the
    /// mask is re-thinned to single-pixel width. 0 disables the step.
    pub edge_dilation: u32,

    /// Kernel size for final mask smoothing. Forced odd; the blurred
    /// mask is re-thresholded to stay binary. 0 disables the step.
    pub edge_smoothing: u32,

    /// Minimum enclosed area in square pixels. Contours must exceed this
    /// to survive filtering.
    pub min_area: f64,

    /// Minimum closed perimeter in pixels. Contours must exceed this to
    /// survive filtering.
    pub min_length: f64,

    /// Ramer-Douglas-Peucker simplification tolerance in pixels.
    /// 0 disables simplification.
    pub simplify_epsilon: f64,

    /// Base brush stroke thickness in pixels.
    pub brush_size: u32,

    /// Brush stroke density control. Values below 10 enable the sparse
    /// detail pass.
    pub brush_density: u32,

    /// Seed for the stroke randomizer. Identical seeds (with identical
    /// input and config) reproduce renderings byte for byte.
    pub rng_seed: u64,

    /// Neon coloring mode: `true` colors each contour independently,
    /// `false` groups contours into objects and colors by object rank.
    pub per_contour_mode: bool,

    /// Cluster contour centroids so nearby contours share a hue.
    /// Only applies in per-contour mode with at least two contours.
    pub kmeans_enabled: bool,

    /// Number of centroid clusters to request. Clamped to the contour
    /// count.
    pub kmeans_k: usize,

    /// Maximum distance in pixels a centroid may sit from its cluster
    /// center before being evicted into its own singleton cluster.
    pub kmeans_near_distance: f64,

    /// Maximum number of objects to color in object-grouping mode.
    pub max_objects: usize,

    /// Minimum object area as a fraction of the image area. The absolute
    /// floor of 100 square pixels still applies.
    pub min_object_area_ratio: f64,

    /// Kernel size for the morphological close that fuses nearby contour
    /// strokes into objects. Forced odd.
    pub join_size: u32,

    /// RGB color for glowing background edges.
    pub edge_color: [u8; 3],

    /// Number of glow blur passes folded together.
    pub glow_strength: u32,

    /// Base glow blur kernel size in pixels. Forced odd; each extra pass
    /// widens the kernel.
    pub glow_size: u32,
}

impl PipelineConfig {
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 50.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 150.0;
    /// Default Gaussian pre-blur kernel size.
    pub const DEFAULT_BLUR: u32 = 5;
    /// Bilateral filtering is off by default.
    pub const DEFAULT_USE_BILATERAL: bool = false;
    /// Default bilateral window diameter.
    pub const DEFAULT_BILATERAL_DIAMETER: u32 = 9;
    /// Default bilateral range sigma.
    pub const DEFAULT_BILATERAL_SIGMA_COLOR: f32 = 75.0;
    /// Default bilateral spatial sigma.
    pub const DEFAULT_BILATERAL_SIGMA_SPACE: f32 = 75.0;
    /// Morphological cleanup is off by default.
    pub const DEFAULT_MORPHOLOGY_SIZE: u32 = 0;
    /// Edge dilation is off by default.
    pub const DEFAULT_EDGE_DILATION: u32 = 0;
    /// Edge smoothing is off by default.
    pub const DEFAULT_EDGE_SMOOTHING: u32 = 0;
    /// Default minimum contour area in square pixels.
    pub const DEFAULT_MIN_AREA: f64 = 100.0;
    /// Default minimum contour perimeter in pixels.
    pub const DEFAULT_MIN_LENGTH: f64 = 10.0;
    /// Simplification is off by default.
    pub const DEFAULT_SIMPLIFY_EPSILON: f64 = 0.0;
    /// Default brush stroke thickness.
    pub const DEFAULT_BRUSH_SIZE: u32 = 4;
    /// Default brush density.
    pub const DEFAULT_BRUSH_DENSITY: u32 = 8;
    /// Default randomizer seed.
    pub const DEFAULT_RNG_SEED: u64 = 0;
    /// Per-contour coloring is the default neon mode.
    pub const DEFAULT_PER_CONTOUR_MODE: bool = true;
    /// Centroid clustering is on by default.
    pub const DEFAULT_KMEANS_ENABLED: bool = true;
    /// Default cluster count.
    pub const DEFAULT_KMEANS_K: usize = 6;
    /// Default eviction distance in pixels.
    pub const DEFAULT_KMEANS_NEAR_DISTANCE: f64 = 100.0;
    /// Default object cap for object-grouping mode.
    pub const DEFAULT_MAX_OBJECTS: usize = 6;
    /// Default minimum object area as a fraction of image area.
    pub const DEFAULT_MIN_OBJECT_AREA_RATIO: f64 = 0.01;
    /// Default object-fusing kernel size.
    pub const DEFAULT_JOIN_SIZE: u32 = 9;
    /// Default background edge color (red).
    pub const DEFAULT_EDGE_COLOR: [u8; 3] = [255, 0, 0];
    /// Default glow pass count.
    pub const DEFAULT_GLOW_STRENGTH: u32 = 3;
    /// Default base glow kernel size.
    pub const DEFAULT_GLOW_SIZE: u32 = 15;
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            blur: Self::DEFAULT_BLUR,
            use_bilateral: Self::DEFAULT_USE_BILATERAL,
            bilateral_diameter: Self::DEFAULT_BILATERAL_DIAMETER,
            bilateral_sigma_color: Self::DEFAULT_BILATERAL_SIGMA_COLOR,
            bilateral_sigma_space: Self::DEFAULT_BILATERAL_SIGMA_SPACE,
            morphology_size: Self::DEFAULT_MORPHOLOGY_SIZE,
            edge_dilation: Self::DEFAULT_EDGE_DILATION,
            edge_smoothing: Self::DEFAULT_EDGE_SMOOTHING,
            min_area: Self::DEFAULT_MIN_AREA,
            min_length: Self::DEFAULT_MIN_LENGTH,
            simplify_epsilon: Self::DEFAULT_SIMPLIFY_EPSILON,
            brush_size: Self::DEFAULT_BRUSH_SIZE,
            brush_density: Self::DEFAULT_BRUSH_DENSITY,
            rng_seed: Self::DEFAULT_RNG_SEED,
            per_contour_mode: Self::DEFAULT_PER_CONTOUR_MODE,
            kmeans_enabled: Self::DEFAULT_KMEANS_ENABLED,
            kmeans_k: Self::DEFAULT_KMEANS_K,
            kmeans_near_distance: Self::DEFAULT_KMEANS_NEAR_DISTANCE,
            max_objects: Self::DEFAULT_MAX_OBJECTS,
            min_object_area_ratio: Self::DEFAULT_MIN_OBJECT_AREA_RATIO,
            join_size: Self::DEFAULT_JOIN_SIZE,
            edge_color: Self::DEFAULT_EDGE_COLOR,
            glow_strength: Self::DEFAULT_GLOW_STRENGTH,
            glow_size: Self::DEFAULT_GLOW_SIZE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = PipelineConfig::default();
        assert!((config.canny_low - 50.0).abs() < f32::EPSILON);
        assert!((config.canny_high - 150.0).abs() < f32::EPSILON);
        assert_eq!(config.blur, 5);
        assert!(!config.use_bilateral);
        assert_eq!(config.morphology_size, 0);
        assert_eq!(config.edge_dilation, 0);
        assert_eq!(config.edge_smoothing, 0);
        assert!((config.min_area - 100.0).abs() < f64::EPSILON);
        assert!((config.min_length - 10.0).abs() < f64::EPSILON);
        assert!((config.simplify_epsilon).abs() < f64::EPSILON);
        assert_eq!(config.brush_size, 4);
        assert_eq!(config.brush_density, 8);
        assert_eq!(config.rng_seed, 0);
        assert!(config.per_contour_mode);
        assert!(config.kmeans_enabled);
        assert_eq!(config.kmeans_k, 6);
        assert_eq!(config.edge_color, [255, 0, 0]);
        assert_eq!(config.glow_strength, 3);
        assert_eq!(config.glow_size, 15);
    }

    #[test]
    fn serde_round_trip() {
        let config = PipelineConfig {
            canny_low: 30.0,
            canny_high: 90.0,
            use_bilateral: true,
            morphology_size: 3,
            edge_dilation: 5,
            simplify_epsilon: 2.5,
            per_contour_mode: false,
            max_objects: 3,
            edge_color: [0, 128, 255],
            ..PipelineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
