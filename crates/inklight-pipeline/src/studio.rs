//! Stateful editing session: owns the source image, the configuration,
//! and the most recent stage outputs.
//!
//! [`Studio`] is the surface an interactive frontend talks to. Parameter
//! edits land in [`config_mut`](Studio::config_mut) without triggering
//! work; [`recompute`](Studio::recompute) rebuilds every output
//! wholesale. Outputs from the previous run stay readable until the next
//! recompute, so a frontend can keep displaying stale results while the
//! user is still dragging a slider.

use image::RgbImage;

use crate::config::PipelineConfig;
use crate::diagnostics::PipelineDiagnostics;
use crate::types::{Contour, GrayImage, StagedResult};

/// A pipeline session holding one source image and its stage outputs.
#[derive(Debug, Clone, Default)]
pub struct Studio {
    config: PipelineConfig,
    source: Option<RgbImage>,
    result: Option<StagedResult>,
    diagnostics: Option<PipelineDiagnostics>,
}

impl Studio {
    /// Create an empty session with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with the given configuration.
    #[must_use]
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Install a new source image.
    ///
    /// Outputs computed from the previous source remain readable until
    /// the next [`recompute`](Self::recompute); callers that load images
    /// fallibly should only call this after a successful decode.
    pub fn set_image(&mut self, image: RgbImage) {
        self.source = Some(image);
    }

    /// Drop the source image and all computed outputs.
    ///
    /// The configuration is kept; it is panel state, not image state.
    pub fn clear(&mut self) {
        self.source = None;
        self.result = None;
        self.diagnostics = None;
    }

    /// Whether a source image is currently installed.
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.source.is_some()
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Mutable configuration access for parameter edits.
    ///
    /// Changes take effect on the next [`recompute`](Self::recompute).
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    /// Rebuild every stage output from the current source and
    /// configuration. Does nothing when no image is installed.
    pub fn recompute(&mut self) {
        if let Some(source) = &self.source {
            let (result, diagnostics) = crate::process_with_diagnostics(source, &self.config);
            self.result = Some(result);
            self.diagnostics = Some(diagnostics);
        }
    }

    /// The installed source image, if any.
    #[must_use]
    pub const fn source(&self) -> Option<&RgbImage> {
        self.source.as_ref()
    }

    /// Outputs of the most recent [`recompute`](Self::recompute).
    #[must_use]
    pub const fn result(&self) -> Option<&StagedResult> {
        self.result.as_ref()
    }

    /// Diagnostics from the most recent [`recompute`](Self::recompute).
    #[must_use]
    pub const fn diagnostics(&self) -> Option<&PipelineDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Binary edge mask from the most recent run.
    #[must_use]
    pub fn edge_mask(&self) -> Option<&GrayImage> {
        self.result.as_ref().map(|r| &r.edges)
    }

    /// Filtered contours from the most recent run. Empty before the
    /// first recompute.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        self.result.as_ref().map_or(&[], |r| r.contours.as_slice())
    }

    /// Brush-stroke rendering from the most recent run.
    #[must_use]
    pub fn brush_image(&self) -> Option<&RgbImage> {
        self.result.as_ref().map(|r| &r.brush)
    }

    /// Neon rendering from the most recent run.
    #[must_use]
    pub fn neon_image(&self) -> Option<&RgbImage> {
        self.result.as_ref().map(|r| &r.neon)
    }

    /// Brush rendering with contour outlines from the most recent run.
    #[must_use]
    pub fn combined_image(&self) -> Option<&RgbImage> {
        self.result.as_ref().map(|r| &r.combined)
    }
}
