//! Centroid clustering for per-contour coloring.
//!
//! A small, deterministic k-means: evenly spaced initial centers and
//! capped Lloyd iterations, followed by two post-passes. Members
//! farther than a distance bound from their cluster center are evicted
//! into singleton clusters, so only genuinely nearby contours ever
//! share a hue, and the surviving cluster ids are compacted into a
//! dense `0..cluster_count` range in first-appearance order.

/// Upper bound on Lloyd iterations; assignment convergence usually
/// stops the loop much earlier.
const MAX_ITERATIONS: usize = 20;

/// A cluster assignment per input point, with ids dense in
/// `0..cluster_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    /// Cluster id for each input point, index-aligned with the input.
    pub assignments: Vec<usize>,
    /// Number of distinct clusters.
    pub cluster_count: usize,
}

impl Clustering {
    /// Each point is its own cluster.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self {
            assignments: (0..len).collect(),
            cluster_count: len,
        }
    }
}

/// Cluster points by proximity.
///
/// `k` is clamped to `1..=points.len()`. After convergence, any point
/// farther than `near_distance` from its cluster center moves into its
/// own singleton cluster, and ids are compacted.
#[must_use = "returns the computed clustering"]
pub fn cluster_points(points: &[(f64, f64)], k: usize, near_distance: f64) -> Clustering {
    if points.is_empty() {
        return Clustering {
            assignments: Vec::new(),
            cluster_count: 0,
        };
    }

    let k = k.clamp(1, points.len());
    let mut centers: Vec<(f64, f64)> = (0..k).map(|j| points[j * points.len() / k]).collect();
    let mut assignments: Vec<usize> = points.iter().map(|p| nearest(*p, &centers)).collect();

    for _ in 0..MAX_ITERATIONS {
        recompute_centers(&mut centers, points, &assignments);
        let next: Vec<usize> = points.iter().map(|p| nearest(*p, &centers)).collect();
        if next == assignments {
            break;
        }
        assignments = next;
    }

    evict_distant(&mut assignments, points, &centers, near_distance);
    let cluster_count = compact_ids(&mut assignments, centers.len());

    Clustering {
        assignments,
        cluster_count,
    }
}

/// Index of the center closest to `point`; ties go to the lowest index.
fn nearest(point: (f64, f64), centers: &[(f64, f64)]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, center) in centers.iter().enumerate() {
        let d = squared_distance(point, *center);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    best
}

/// Move each center to the mean of its members. A center with no
/// members is reseeded from the point currently farthest from its own
/// center, which splits spread-out data instead of stranding clusters.
#[allow(clippy::cast_precision_loss)]
fn recompute_centers(centers: &mut [(f64, f64)], points: &[(f64, f64)], assignments: &[usize]) {
    let mut sums = vec![(0.0_f64, 0.0_f64, 0_usize); centers.len()];
    for (point, &cluster) in points.iter().zip(assignments) {
        sums[cluster].0 += point.0;
        sums[cluster].1 += point.1;
        sums[cluster].2 += 1;
    }
    for (center, (x, y, count)) in centers.iter_mut().zip(&sums) {
        if *count > 0 {
            *center = (x / *count as f64, y / *count as f64);
        }
    }
    for j in 0..centers.len() {
        if sums[j].2 == 0 {
            centers[j] = farthest_from_own_center(points, assignments, centers);
        }
    }
}

/// The point with the greatest distance to its own assigned center.
fn farthest_from_own_center(
    points: &[(f64, f64)],
    assignments: &[usize],
    centers: &[(f64, f64)],
) -> (f64, f64) {
    let mut best = points[0];
    let mut best_distance = -1.0;
    for (point, &cluster) in points.iter().zip(assignments) {
        let d = squared_distance(*point, centers[cluster]);
        if d > best_distance {
            best_distance = d;
            best = *point;
        }
    }
    best
}

/// Evict every point farther than `near_distance` from its cluster
/// center into a fresh singleton cluster.
fn evict_distant(
    assignments: &mut [usize],
    points: &[(f64, f64)],
    centers: &[(f64, f64)],
    near_distance: f64,
) {
    let mut next_id = centers.len();
    for (assignment, point) in assignments.iter_mut().zip(points) {
        if squared_distance(*point, centers[*assignment]) > near_distance * near_distance {
            *assignment = next_id;
            next_id += 1;
        }
    }
}

/// Renumber cluster ids densely in order of first appearance. Returns
/// the number of distinct clusters.
fn compact_ids(assignments: &mut [usize], base_count: usize) -> usize {
    let mut remap: Vec<Option<usize>> = vec![None; base_count + assignments.len()];
    let mut count = 0;
    for assignment in assignments.iter_mut() {
        *assignment = *remap[*assignment].get_or_insert_with(|| {
            let id = count;
            count += 1;
            id
        });
    }
    count
}

fn squared_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx.mul_add(dx, dy * dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_clusters() {
        let clustering = cluster_points(&[], 3, 100.0);
        assert!(clustering.assignments.is_empty());
        assert_eq!(clustering.cluster_count, 0);
    }

    #[test]
    fn single_point_is_its_own_cluster() {
        let clustering = cluster_points(&[(7.0, 7.0)], 5, 100.0);
        assert_eq!(clustering.assignments, vec![0]);
        assert_eq!(clustering.cluster_count, 1);
    }

    #[test]
    fn identity_maps_each_index_to_itself() {
        let clustering = Clustering::identity(4);
        assert_eq!(clustering.assignments, vec![0, 1, 2, 3]);
        assert_eq!(clustering.cluster_count, 4);
    }

    #[test]
    fn two_far_groups_separate() {
        let points = [
            (0.0, 0.0),
            (1.0, 1.0),
            (2.0, 0.0),
            (100.0, 100.0),
            (101.0, 99.0),
        ];
        let clustering = cluster_points(&points, 2, 1.0e9);
        assert_eq!(clustering.cluster_count, 2);
        assert_eq!(clustering.assignments[0], clustering.assignments[1]);
        assert_eq!(clustering.assignments[1], clustering.assignments[2]);
        assert_eq!(clustering.assignments[3], clustering.assignments[4]);
        assert_ne!(clustering.assignments[0], clustering.assignments[3]);
    }

    #[test]
    fn far_outlier_is_evicted_into_a_singleton() {
        // All three share the k=1 cluster; only the outlier sits farther
        // than the bound from the mean center and gets evicted.
        let points = [(5.0, 5.0), (15.0, 5.0), (1000.0, 1000.0)];
        let clustering = cluster_points(&points, 1, 500.0);
        assert_eq!(clustering.assignments, vec![0, 0, 1]);
        assert_eq!(clustering.cluster_count, 2);
    }

    #[test]
    fn zero_near_distance_splits_all_but_the_center_point() {
        // The mean of the three collinear points coincides with the
        // middle one, so only that point survives in cluster 0.
        let points = [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)];
        let clustering = cluster_points(&points, 1, 0.0);
        assert_eq!(clustering.assignments, vec![0, 1, 2]);
        assert_eq!(clustering.cluster_count, 3);
    }

    #[test]
    fn requested_k_is_clamped_to_point_count() {
        let points = [(0.0, 0.0), (5.0, 5.0)];
        let clustering = cluster_points(&points, 10, 1.0e9);
        assert_eq!(clustering.assignments, vec![0, 1]);
        assert_eq!(clustering.cluster_count, 2);
    }
}
