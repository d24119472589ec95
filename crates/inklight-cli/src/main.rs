//! inklight: stylize photographs into brush-stroke sketches and neon line art.
//!
//! Decodes an image file, runs the stylization pipeline, and writes the
//! requested stage renderings as PNGs into an output directory. Useful for:
//!
//! - Batch stylization without an interactive frontend
//! - Tuning Canny thresholds, stroke density, and glow parameters
//! - Collecting per-stage timing diagnostics (`--report`, `--diagnostics-json`)
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin inklight -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use image::{DynamicImage, RgbImage};
use inklight_pipeline::{PipelineConfig, StagedResult};

/// Longest image side handed to the pipeline; larger inputs are resized
/// down with aspect ratio preserved.
const MAX_DIMENSION: u32 = 1024;

/// Stylize photographs into brush-stroke sketches and glowing neon line art.
///
/// Runs the stylization pipeline on a given image with configurable
/// parameters and writes the selected stage renderings as PNGs.
#[derive(Parser)]
#[command(name = "inklight", version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Directory for rendered PNGs (created if missing).
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Which stage rendering to write.
    #[arg(long, value_enum, default_value_t = Stage::All)]
    stage: Stage,

    /// Canny low threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Gaussian noise-reduction kernel size (forced odd; 1 disables).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR)]
    blur: u32,

    /// Use an edge-preserving bilateral filter instead of Gaussian blur.
    #[arg(long)]
    use_bilateral: bool,

    /// Bilateral filter window diameter.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BILATERAL_DIAMETER)]
    bilateral_diameter: u32,

    /// Bilateral filter color sigma.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BILATERAL_SIGMA_COLOR)]
    bilateral_sigma_color: f32,

    /// Bilateral filter spatial sigma.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BILATERAL_SIGMA_SPACE)]
    bilateral_sigma_space: f32,

    /// Morphological close/open kernel size (0 disables).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MORPHOLOGY_SIZE)]
    morphology_size: u32,

    /// Edge dilation kernel size, re-thinned afterwards (0 disables).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_EDGE_DILATION)]
    edge_dilation: u32,

    /// Edge smoothing kernel size, re-thresholded afterwards (0 disables).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_EDGE_SMOOTHING)]
    edge_smoothing: u32,

    /// Minimum enclosed area for a contour to survive filtering.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MIN_AREA)]
    min_area: f64,

    /// Minimum closed perimeter for a contour to survive filtering.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MIN_LENGTH)]
    min_length: f64,

    /// Ramer-Douglas-Peucker tolerance in pixels (0 disables).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SIMPLIFY_EPSILON)]
    simplify_epsilon: f64,

    /// Brush stroke thickness.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BRUSH_SIZE)]
    brush_size: u32,

    /// Brush density control; values below 10 enable the texture pass.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BRUSH_DENSITY)]
    brush_density: u32,

    /// Seed for stroke randomization.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_RNG_SEED)]
    rng_seed: u64,

    /// Color contours by object grouping instead of per contour.
    #[arg(long)]
    object_grouping: bool,

    /// Disable centroid clustering in per-contour mode.
    #[arg(long)]
    no_kmeans: bool,

    /// Requested cluster count for centroid clustering.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_KMEANS_K)]
    kmeans_k: usize,

    /// Centroids farther than this from their cluster center are split off.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_KMEANS_NEAR_DISTANCE)]
    kmeans_near_distance: f64,

    /// Largest objects kept in object-grouping mode.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MAX_OBJECTS)]
    max_objects: usize,

    /// Minimum object area as a fraction of the image area.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MIN_OBJECT_AREA_RATIO)]
    min_object_area_ratio: f64,

    /// Morphological close kernel joining nearby contours into objects.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_JOIN_SIZE)]
    join_size: u32,

    /// Color for edge pixels not covered by a contour, as `R,G,B`.
    #[arg(long, value_parser = parse_rgb, default_value = "255,0,0")]
    edge_color: [u8; 3],

    /// Number of widening glow passes per layer.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_GLOW_STRENGTH)]
    glow_strength: u32,

    /// Base glow blur kernel size.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_GLOW_SIZE)]
    glow_size: u32,

    /// Print the per-stage diagnostics report to stdout.
    #[arg(long)]
    report: bool,

    /// Write diagnostics as JSON to this path.
    #[arg(long)]
    diagnostics_json: Option<PathBuf>,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Stage rendering selection.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    /// Binary edge mask.
    Edges,
    /// White contour outlines over the source image.
    Contours,
    /// Brush-stroke rendering on black.
    Brush,
    /// Brush rendering with contour outlines on top.
    Combined,
    /// Neon glow rendering on black.
    Neon,
    /// Every stage rendering.
    All,
}

impl Stage {
    /// Whether this selection includes `stage`.
    fn includes(self, stage: Self) -> bool {
        self == Self::All || self == stage
    }
}

/// Errors surfaced by the command-line frontend.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Input image could not be read or decoded.
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// `--config-json` did not parse as a pipeline configuration.
    #[error("invalid --config-json: {0}")]
    Config(serde_json::Error),

    /// Diagnostics could not be serialized.
    #[error("failed to serialize diagnostics: {0}")]
    Serialize(serde_json::Error),

    /// A rendered stage could not be encoded or written.
    #[error("failed to write {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Output directory or diagnostics file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, CliError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(CliError::Config);
    }

    Ok(PipelineConfig {
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
        blur: cli.blur,
        use_bilateral: cli.use_bilateral,
        bilateral_diameter: cli.bilateral_diameter,
        bilateral_sigma_color: cli.bilateral_sigma_color,
        bilateral_sigma_space: cli.bilateral_sigma_space,
        morphology_size: cli.morphology_size,
        edge_dilation: cli.edge_dilation,
        edge_smoothing: cli.edge_smoothing,
        min_area: cli.min_area,
        min_length: cli.min_length,
        simplify_epsilon: cli.simplify_epsilon,
        brush_size: cli.brush_size,
        brush_density: cli.brush_density,
        rng_seed: cli.rng_seed,
        per_contour_mode: !cli.object_grouping,
        kmeans_enabled: !cli.no_kmeans,
        kmeans_k: cli.kmeans_k,
        kmeans_near_distance: cli.kmeans_near_distance,
        max_objects: cli.max_objects,
        min_object_area_ratio: cli.min_object_area_ratio,
        join_size: cli.join_size,
        edge_color: cli.edge_color,
        glow_strength: cli.glow_strength,
        glow_size: cli.glow_size,
    })
}

/// Parse an `R,G,B` byte triple, e.g. `255,0,0`.
fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    let [r, g, b] = parts.as_slice() else {
        return Err(format!("expected R,G,B, got `{s}`"));
    };
    let channel = |v: &str| {
        v.trim()
            .parse::<u8>()
            .map_err(|e| format!("invalid channel `{v}`: {e}"))
    };
    Ok([channel(r)?, channel(g)?, channel(b)?])
}

/// Cap the longest image side at [`MAX_DIMENSION`], preserving aspect
/// ratio. Images already within the cap pass through untouched.
fn fit_to_cap(decoded: DynamicImage) -> DynamicImage {
    if decoded.width().max(decoded.height()) <= MAX_DIMENSION {
        return decoded;
    }
    decoded.resize(
        MAX_DIMENSION,
        MAX_DIMENSION,
        image::imageops::FilterType::Triangle,
    )
}

/// Decode the input image and cap its longest side at [`MAX_DIMENSION`].
fn load_image(path: &Path) -> Result<RgbImage, CliError> {
    let decoded = image::open(path).map_err(|err| CliError::Load {
        path: path.to_path_buf(),
        source: err,
    })?;
    let (width, height) = (decoded.width(), decoded.height());
    let fitted = fit_to_cap(decoded);
    if (fitted.width(), fitted.height()) != (width, height) {
        eprintln!(
            "Resizing {width}x{height} -> {}x{}",
            fitted.width(),
            fitted.height(),
        );
    }
    Ok(fitted.to_rgb8())
}

/// Write one stage rendering as `<stem>-<name>.png` in the output directory.
fn save_stage(
    out_dir: &Path,
    stem: &str,
    name: &str,
    rendering: &DynamicImage,
) -> Result<(), CliError> {
    let path = out_dir.join(format!("{stem}-{name}.png"));
    rendering.save(&path).map_err(|err| CliError::Save {
        path: path.clone(),
        source: err,
    })?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

/// Write every stage rendering selected by `--stage`.
fn write_stages(cli: &Cli, source: &RgbImage, result: &StagedResult) -> Result<(), CliError> {
    std::fs::create_dir_all(&cli.out_dir).map_err(|err| CliError::Io {
        path: cli.out_dir.clone(),
        source: err,
    })?;
    let stem = cli
        .image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    if cli.stage.includes(Stage::Edges) {
        let edges = DynamicImage::ImageLuma8(result.edges.clone());
        save_stage(&cli.out_dir, stem, "edges", &edges)?;
    }
    if cli.stage.includes(Stage::Contours) {
        let outlined = inklight_pipeline::canvas::contour_overlay(source, &result.contours);
        save_stage(
            &cli.out_dir,
            stem,
            "contours",
            &DynamicImage::ImageRgb8(outlined),
        )?;
    }
    if cli.stage.includes(Stage::Brush) {
        let brush = DynamicImage::ImageRgb8(result.brush.clone());
        save_stage(&cli.out_dir, stem, "brush", &brush)?;
    }
    if cli.stage.includes(Stage::Combined) {
        let combined = DynamicImage::ImageRgb8(result.combined.clone());
        save_stage(&cli.out_dir, stem, "combined", &combined)?;
    }
    if cli.stage.includes(Stage::Neon) {
        let neon = DynamicImage::ImageRgb8(result.neon.clone());
        save_stage(&cli.out_dir, stem, "neon", &neon)?;
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = config_from_cli(cli)?;
    let source = load_image(&cli.image_path)?;
    eprintln!(
        "Image: {} ({}x{})",
        cli.image_path.display(),
        source.width(),
        source.height(),
    );

    let (result, diagnostics) = inklight_pipeline::process_with_diagnostics(&source, &config);
    eprintln!(
        "Pipeline: {} contours, {} strokes, {} color groups",
        diagnostics.summary.contour_count,
        diagnostics.summary.strokes_drawn,
        diagnostics.summary.color_groups,
    );

    write_stages(cli, &source, &result)?;

    if cli.report {
        println!("{}", diagnostics.report());
    }
    if let Some(ref path) = cli.diagnostics_json {
        let json = serde_json::to_string_pretty(&diagnostics).map_err(CliError::Serialize)?;
        std::fs::write(path, json).map_err(|err| CliError::Io {
            path: path.clone(),
            source: err,
        })?;
        eprintln!("Diagnostics written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn rgb_triples_parse() {
        assert_eq!(parse_rgb("255,0,0").unwrap(), [255, 0, 0]);
        assert_eq!(parse_rgb(" 0, 128 ,255").unwrap(), [0, 128, 255]);
        assert!(parse_rgb("255,0").is_err());
        assert!(parse_rgb("255,0,0,0").is_err());
        assert!(parse_rgb("256,0,0").is_err());
    }

    fn blank(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
    }

    #[test]
    fn small_images_pass_through_unresized() {
        let fitted = fit_to_cap(blank(800, 600));
        assert_eq!((fitted.width(), fitted.height()), (800, 600));
    }

    #[test]
    fn oversized_images_fit_the_cap() {
        let landscape = fit_to_cap(blank(2048, 1024));
        assert_eq!((landscape.width(), landscape.height()), (1024, 512));

        let portrait = fit_to_cap(blank(1024, 4096));
        assert_eq!((portrait.width(), portrait.height()), (256, 1024));

        // Extreme aspect ratios never collapse the short side to zero.
        let sliver = fit_to_cap(blank(100_000, 10));
        assert_eq!(sliver.width(), 1024);
        assert!(sliver.height() >= 1);
    }

    #[test]
    fn config_json_overrides_flags() {
        let json = serde_json::to_string(&PipelineConfig {
            canny_low: 77.0,
            ..PipelineConfig::default()
        })
        .unwrap();
        let mut cli = Cli::parse_from(["inklight", "photo.png", "--canny-low", "5"]);
        cli.config_json = Some(json);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.canny_low - 77.0).abs() < f32::EPSILON);
    }

    #[test]
    fn malformed_config_json_is_rejected() {
        let mut cli = Cli::parse_from(["inklight", "photo.png"]);
        cli.config_json = Some("{not json".to_string());
        assert!(matches!(config_from_cli(&cli), Err(CliError::Config(_))));
    }
}
