//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! parameter tuning. Every call to
//! [`process_with_diagnostics`](crate::process_with_diagnostics) collects
//! them alongside the stage outputs.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
///
/// Each field captures metrics for one logical stage. Every stage runs
/// unconditionally, so unlike configs with optional passes there are no
/// `Option` fields here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 0: Canny edge detection plus cleanup passes.
    pub edge_detection: StageDiagnostics,
    /// Stage 1: contour tracing, filtering, and optional simplification.
    pub contour_extraction: StageDiagnostics,
    /// Stage 2: brush-stroke synthesis.
    pub brush_synthesis: StageDiagnostics,
    /// Stage 3: neon coloring and glow composition.
    pub neon_composition: StageDiagnostics,
    /// Stage 4: white contour outlines over the brush rendering.
    pub combined_overlay: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
///
/// Each variant captures the counts and sizes meaningful for that
/// particular processing step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Edge detection metrics.
    EdgeDetection {
        /// Low threshold (after clamping).
        low_threshold: f32,
        /// High threshold (after clamping).
        high_threshold: f32,
        /// Number of edge pixels (value == 255) in the output mask.
        edge_pixel_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Contour extraction metrics.
    ContourExtraction {
        /// Contours traced from the edge mask, before filtering.
        traced_count: usize,
        /// Contours surviving the area and perimeter filter.
        kept_count: usize,
        /// Total points across all kept contours.
        total_point_count: usize,
        /// Minimum points in any kept contour.
        min_contour_points: usize,
        /// Maximum points in any kept contour.
        max_contour_points: usize,
        /// Mean points per kept contour.
        mean_contour_points: f64,
    },
    /// Brush-stroke synthesis metrics.
    BrushSynthesis {
        /// Seed used for stroke randomization.
        seed: u64,
        /// Strokes drawn across all passes.
        strokes_drawn: usize,
        /// Stroke sites rejected by the density gate.
        strokes_skipped: usize,
    },
    /// Neon composition metrics.
    NeonComposition {
        /// Which coloring mode was used.
        mode: String,
        /// Distinct color groups (clusters or kept objects).
        color_groups: usize,
        /// Contours drawn into the colored layer.
        contours_drawn: usize,
        /// Number of widening blur passes per glow layer.
        glow_passes: u32,
    },
    /// Combined overlay metrics.
    CombinedOverlay {
        /// Contours outlined over the brush rendering.
        contour_count: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of contours kept after filtering.
    pub contour_count: usize,
    /// Brush strokes drawn across all passes.
    pub strokes_drawn: usize,
    /// Distinct neon color groups.
    pub color_groups: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        // Per-stage breakdown.
        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let stages: Vec<(&str, &StageDiagnostics)> = vec![
            ("Edge Detection", &self.edge_detection),
            ("Contour Extraction", &self.contour_extraction),
            ("Brush Synthesis", &self.brush_synthesis),
            ("Neon Composition", &self.neon_composition),
            ("Combined Overlay", &self.combined_overlay),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Contours: {}  |  Strokes drawn: {}  |  Color groups: {}",
            self.summary.contour_count, self.summary.strokes_drawn, self.summary.color_groups,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::EdgeDetection {
            low_threshold,
            high_threshold,
            edge_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *edge_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "low={low_threshold:.1} high={high_threshold:.1} edges={edge_pixel_count} ({density:.1}%)",
            )
        }
        StageMetrics::ContourExtraction {
            traced_count,
            kept_count,
            total_point_count,
            min_contour_points,
            max_contour_points,
            mean_contour_points,
        } => {
            format!(
                "{traced_count}->{kept_count} contours, {total_point_count} pts (min={min_contour_points} max={max_contour_points} mean={mean_contour_points:.1})",
            )
        }
        StageMetrics::BrushSynthesis {
            seed,
            strokes_drawn,
            strokes_skipped,
        } => {
            format!("seed={seed} drawn={strokes_drawn} skipped={strokes_skipped}")
        }
        StageMetrics::NeonComposition {
            mode,
            color_groups,
            contours_drawn,
            glow_passes,
        } => {
            format!(
                "{mode} groups={color_groups} contours={contours_drawn} glow_passes={glow_passes}",
            )
        }
        StageMetrics::CombinedOverlay { contour_count } => {
            format!("{contour_count} outlines")
        }
    }
}

/// Count edge pixels (value == 255) in a grayscale image.
pub(crate) fn count_edge_pixels(image: &image::GrayImage) -> u64 {
    image
        .pixels()
        .map(|p| u64::from(u8::from(p.0[0] == 255)))
        .sum()
}

/// Statistics for a set of contours.
pub(crate) struct ContourStats {
    /// Total number of points across all contours.
    pub total: usize,
    /// Minimum number of points in any single contour.
    pub min: usize,
    /// Maximum number of points in any single contour.
    pub max: usize,
    /// Mean number of points per contour.
    pub mean: f64,
}

/// Compute contour statistics from a set of contours.
pub(crate) fn contour_stats(contours: &[crate::Contour]) -> ContourStats {
    let total: usize = contours.iter().map(crate::Contour::len).sum();
    let min = contours.iter().map(crate::Contour::len).min().unwrap_or(0);
    let max = contours.iter().map(crate::Contour::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if contours.is_empty() {
        0.0
    } else {
        total as f64 / contours.len() as f64
    };
    ContourStats {
        total,
        min,
        max,
        mean,
    }
}
