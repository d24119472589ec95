//! Anti-aliased stroke rasterization on top of `tiny-skia`.
//!
//! Both stylizers draw the same primitives: stroked segments, stroked
//! closed contours, and filled discs. [`Canvas`] wraps a `tiny_skia`
//! pixmap with those primitives and handles the conversion back to
//! `image` buffers.
//!
//! Pixmaps store premultiplied RGBA. Over an implicit black background
//! the premultiplied samples *are* the composited RGB values, so
//! [`Canvas::into_rgb`] reads them straight out without an
//! un-premultiply pass.

use image::{GrayImage, Rgb, RgbImage};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

/// A drawing surface for anti-aliased strokes.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Create a transparent canvas. Returns `None` for zero-sized or
    /// absurdly large dimensions (per `tiny_skia`'s allocation limits).
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    /// Create an opaque canvas initialized from an RGB image.
    #[must_use]
    pub fn from_rgb(image: &RgbImage) -> Option<Self> {
        let mut canvas = Self::new(image.width(), image.height())?;
        for (src, dst) in image.pixels().zip(canvas.pixmap.pixels_mut()) {
            *dst = tiny_skia::ColorU8::from_rgba(src.0[0], src.0[1], src.0[2], 255).premultiply();
        }
        Some(canvas)
    }

    /// Flood the whole canvas with an opaque color.
    pub fn fill(&mut self, color: Rgb<u8>) {
        self.pixmap.fill(Color::from_rgba8(
            color.0[0],
            color.0[1],
            color.0[2],
            255,
        ));
    }

    /// Stroke a single segment with round caps.
    pub fn stroke_segment(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb<u8>, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };
        self.stroke(&path, color, width);
    }

    /// Stroke a closed polyline through integer points.
    pub fn stroke_closed(&mut self, points: &[crate::types::Point], color: Rgb<u8>, width: f32) {
        let Some(path) = closed_path(points) else {
            return;
        };
        self.stroke(&path, color, width);
    }

    /// Fill a disc.
    pub fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgb<u8>) {
        let mut pb = PathBuilder::new();
        pb.push_circle(center.0, center.1, radius.max(0.1));
        let Some(path) = pb.finish() else {
            return;
        };
        let paint = opaque_paint(color);
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Binary coverage: 255 where anything has been drawn (alpha > 0).
    #[must_use]
    pub fn coverage_mask(&self) -> GrayImage {
        let data = self.pixmap.data();
        let mut mask = GrayImage::new(self.pixmap.width(), self.pixmap.height());
        for (i, pixel) in mask.pixels_mut().enumerate() {
            pixel.0[0] = if data[i * 4 + 3] > 0 { 255 } else { 0 };
        }
        mask
    }

    /// Consume the canvas and composite it over black.
    #[must_use]
    pub fn into_rgb(self) -> RgbImage {
        let data = self.pixmap.data();
        let mut img = RgbImage::new(self.pixmap.width(), self.pixmap.height());
        for (i, pixel) in img.pixels_mut().enumerate() {
            let off = i * 4;
            *pixel = Rgb([data[off], data[off + 1], data[off + 2]]);
        }
        img
    }

    fn stroke(&mut self, path: &tiny_skia::Path, color: Rgb<u8>, width: f32) {
        let paint = opaque_paint(color);
        let stroke = Stroke {
            width: width.max(0.1),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Render a thin white outline of every contour over a base image.
#[must_use = "returns the overlaid image"]
pub fn contour_overlay(base: &RgbImage, contours: &[crate::types::Contour]) -> RgbImage {
    let Some(mut canvas) = Canvas::from_rgb(base) else {
        return base.clone();
    };
    for contour in contours {
        canvas.stroke_closed(contour.points(), Rgb([255, 255, 255]), 1.0);
    }
    canvas.into_rgb()
}

/// Build a closed path through integer points. Returns `None` for
/// degenerate inputs (fewer than 2 points).
#[allow(clippy::cast_precision_loss)]
fn closed_path(points: &[crate::types::Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    pb.finish()
}

fn opaque_paint(color: Rgb<u8>) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0[0], color.0[1], color.0[2], 255);
    paint.anti_alias = true;
    paint
}
