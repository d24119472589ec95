//! Shared types for the inklight stylization pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference binary edge
/// masks without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference source and
/// rendered rasters without depending on `image` directly.
pub use image::RgbImage;

/// A 2D point on the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A closed boundary traced from a binary edge mask.
///
/// Points are stored in tracing order; the segment from the last point
/// back to the first is implied. Geometry helpers ([`area`](Self::area),
/// [`perimeter`](Self::perimeter), [`centroid`](Self::centroid)) treat
/// the contour as that closed polygon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour(Vec<Point>);

impl Contour {
    /// Create a new contour from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the contour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the contour and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Enclosed area in square pixels (shoelace formula over the closed
    /// polygon). Degenerate contours (fewer than 3 points, or collinear)
    /// have zero area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Closed arc length in pixels, including the segment from the last
    /// point back to the first.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        if self.0.len() < 2 {
            return 0.0;
        }
        let mut length = 0.0;
        for i in 0..self.0.len() {
            let a = self.0[i];
            let b = self.0[(i + 1) % self.0.len()];
            length += a.distance(b);
        }
        length
    }

    /// Area-weighted centroid of the closed polygon.
    ///
    /// Falls back to the vertex average for degenerate (zero-area)
    /// contours so that every non-empty contour has a usable centroid
    /// for clustering.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> (f64, f64) {
        let signed = self.signed_area();
        if signed.abs() < f64::EPSILON {
            let n = self.0.len().max(1) as f64;
            let sum_x: f64 = self.0.iter().map(|p| f64::from(p.x)).sum();
            let sum_y: f64 = self.0.iter().map(|p| f64::from(p.y)).sum();
            return (sum_x / n, sum_y / n);
        }

        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..self.0.len() {
            let a = self.0[i];
            let b = self.0[(i + 1) % self.0.len()];
            let cross = f64::from(a.x).mul_add(f64::from(b.y), -(f64::from(b.x) * f64::from(a.y)));
            cx += (f64::from(a.x) + f64::from(b.x)) * cross;
            cy += (f64::from(a.y) + f64::from(b.y)) * cross;
        }
        let scale = 1.0 / (6.0 * signed);
        (cx * scale, cy * scale)
    }

    /// Signed shoelace sum divided by two. Positive for one winding
    /// direction, negative for the other.
    fn signed_area(&self) -> f64 {
        if self.0.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..self.0.len() {
            let a = self.0[i];
            let b = self.0[(i + 1) % self.0.len()];
            sum += f64::from(a.x).mul_add(f64::from(b.y), -(f64::from(b.x) * f64::from(a.y)));
        }
        sum / 2.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Result of running the full stylization pipeline.
///
/// Each field captures the output of one logical stage, enabling callers
/// to display any intermediate or final rendering. All buffers share the
/// source image dimensions and are rebuilt wholesale on every run; no
/// buffer aliases another.
///
/// Note: does not derive `PartialEq` or serde traits because raster
/// buffers from the `image` crate implement neither, and no consumer
/// needs to compare or transport whole stage sets.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Binary edge mask (255 = edge, 0 = background).
    pub edges: GrayImage,
    /// Filtered contours in tracer discovery order.
    pub contours: Vec<Contour>,
    /// Brush-stroke rendering on a black canvas.
    pub brush: RgbImage,
    /// Neon glow rendering on a black canvas.
    pub neon: RgbImage,
    /// Brush rendering with thin white contour outlines on top.
    pub combined: RgbImage,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}
