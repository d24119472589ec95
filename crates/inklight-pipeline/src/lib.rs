//! inklight-pipeline: Pure image stylization pipeline (sans-IO).
//!
//! Converts raster images into stylized renderings through:
//! grayscale -> noise reduction -> Canny edge detection -> contour
//! extraction -> brush-stroke synthesis and neon glow composition.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! image buffers and returns structured data. All filesystem
//! interaction lives in `inklight-cli`.

pub mod brush;
pub mod canvas;
pub mod cluster;
pub mod config;
pub mod contour;
pub mod density;
pub mod diagnostics;
pub mod edge;
pub mod glow;
pub mod neon;
pub mod simplify;
pub mod studio;
pub mod thin;
pub mod types;

use std::time::{Duration, Instant};

pub use config::PipelineConfig;
pub use diagnostics::{
    PipelineDiagnostics, PipelineSummary, StageDiagnostics, StageMetrics,
};
pub use studio::Studio;
pub use types::{Contour, Dimensions, GrayImage, Point, RgbImage, StagedResult};

/// Run the full stylization pipeline.
///
/// Takes a decoded color image and a configuration, then produces a
/// [`StagedResult`] carrying every stage output: the binary edge mask,
/// the filtered contours, and the brush, neon, and combined renderings.
/// All raster outputs share the source dimensions.
///
/// Equivalent to [`process_with_diagnostics`] with the diagnostics
/// discarded.
///
/// # Pipeline steps
///
/// 1. Grayscale conversion and noise reduction (Gaussian or bilateral)
/// 2. Canny edge detection with optional mask cleanup
/// 3. Contour tracing, filtering, and optional simplification
/// 4. Brush-stroke synthesis over the edge mask and contours
/// 5. Neon coloring and glow composition
/// 6. Combined overlay: contour outlines over the brush rendering
#[must_use = "returns the stage outputs"]
pub fn process(image: &RgbImage, config: &PipelineConfig) -> StagedResult {
    process_with_diagnostics(image, config).0
}

/// Run the full stylization pipeline, collecting per-stage wall-clock
/// timings and metrics alongside the outputs.
#[must_use = "returns the stage outputs and diagnostics"]
pub fn process_with_diagnostics(
    image: &RgbImage,
    config: &PipelineConfig,
) -> (StagedResult, PipelineDiagnostics) {
    let pipeline_start = Instant::now();
    let (width, height) = image.dimensions();
    let pixel_count = u64::from(width) * u64::from(height);

    let (edges, edge_time) = timed(|| edge::detect_edges(image, config));
    let (low_threshold, high_threshold) = edge::clamped_thresholds(config);
    let edge_detection = StageDiagnostics {
        duration: edge_time,
        metrics: StageMetrics::EdgeDetection {
            low_threshold,
            high_threshold,
            edge_pixel_count: diagnostics::count_edge_pixels(&edges),
            total_pixel_count: pixel_count,
        },
    };

    let ((traced_count, contours), contour_time) = timed(|| {
        let traced = contour::trace_contours(&edges);
        let traced_count = traced.len();
        (traced_count, contour::filter_contours(traced, config))
    });
    let stats = diagnostics::contour_stats(&contours);
    let contour_extraction = StageDiagnostics {
        duration: contour_time,
        metrics: StageMetrics::ContourExtraction {
            traced_count,
            kept_count: contours.len(),
            total_point_count: stats.total,
            min_contour_points: stats.min,
            max_contour_points: stats.max,
            mean_contour_points: stats.mean,
        },
    };

    let (brushwork, brush_time) = timed(|| brush::synthesize(image, &edges, &contours, config));
    let brush_synthesis = StageDiagnostics {
        duration: brush_time,
        metrics: StageMetrics::BrushSynthesis {
            seed: config.rng_seed,
            strokes_drawn: brushwork.strokes_drawn,
            strokes_skipped: brushwork.strokes_skipped,
        },
    };

    let (neon_render, neon_time) = timed(|| neon::compose(&edges, &contours, config));
    let mode = if config.per_contour_mode {
        "per-contour"
    } else {
        "object-grouping"
    };
    let neon_composition = StageDiagnostics {
        duration: neon_time,
        metrics: StageMetrics::NeonComposition {
            mode: mode.to_string(),
            color_groups: neon_render.color_groups,
            contours_drawn: neon_render.contours_drawn,
            glow_passes: config.glow_strength,
        },
    };

    let (combined, combined_time) = timed(|| canvas::contour_overlay(&brushwork.image, &contours));
    let combined_overlay = StageDiagnostics {
        duration: combined_time,
        metrics: StageMetrics::CombinedOverlay {
            contour_count: contours.len(),
        },
    };

    let summary = PipelineSummary {
        image_width: width,
        image_height: height,
        pixel_count,
        contour_count: contours.len(),
        strokes_drawn: brushwork.strokes_drawn,
        color_groups: neon_render.color_groups,
    };

    let result = StagedResult {
        edges,
        contours,
        brush: brushwork.image,
        neon: neon_render.image,
        combined,
        dimensions: Dimensions { width, height },
    };
    let diag = PipelineDiagnostics {
        edge_detection,
        contour_extraction,
        brush_synthesis,
        neon_composition,
        combined_overlay,
        total_duration: pipeline_start.elapsed(),
        summary,
    };
    (result, diag)
}

/// Run `f`, returning its output and wall-clock duration.
fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}
