//! Contour simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Reduces point count by removing points that are within a given
//! tolerance of the line between their neighbors. Contours are
//! simplified in open-polyline form: the first and last points anchor
//! the recursion and always survive, and the closure back to the first
//! point stays implied.

use crate::types::{Contour, Point};

/// Simplify a single contour using the Ramer-Douglas-Peucker algorithm.
///
/// Points within `epsilon` pixels of the line between their neighbors
/// are removed. Contours with fewer than 3 points are returned
/// unchanged, so the result never has fewer than 2 points when the
/// input had at least 2.
#[must_use = "returns the simplified contour"]
pub fn simplify(contour: &Contour, epsilon: f64) -> Contour {
    let points = contour.points();
    if points.len() < 3 {
        return contour.clone();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, epsilon, &mut kept);

    let simplified: Vec<Point> = points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    Contour::new(simplified)
}

/// Recursive step: find the point between `start` and `end` farthest
/// from the chord between them. If that distance exceeds `epsilon`, the
/// point is kept and both sub-chords are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, epsilon: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, epsilon, kept);
        rdp_recurse(points, max_idx, end, epsilon, kept);
    }
}

/// Perpendicular distance from point `p` to the line through `a` and `b`.
///
/// Uses |cross(b-a, p-a)| / |b-a|. When `a` and `b` coincide, returns
/// the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(
        f64::from(a.y - p.y),
        -(dy * f64::from(a.x - p.x)),
    );
    cross.abs() / length_sq.sqrt()
}
