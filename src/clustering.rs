use rand::prelude::IndexedRandom;
use rand::{rngs::StdRng, SeedableRng};

use crate::config::ClusteringParams;

/// Result of a one-dimensional k-means run
#[derive(Debug, Clone)]
pub struct KMeans1d {
    pub centroids: Vec<f64>,
    /// Cluster index of every input value
    pub labels: Vec<usize>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
}

/// Number of distinct finite values, counted after sorting
pub fn count_distinct(values: &[f64]) -> usize {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

/// Median of a slice; the mean of the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let m = sorted.len();
    Some(if m % 2 == 1 {
        sorted[m / 2]
    } else {
        0.5 * (sorted[m / 2 - 1] + sorted[m / 2])
    })
}

fn nearest(centroids: &[f64], value: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = (value - c).abs();
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// k-means++ seeding: first center uniform, the rest weighted by squared
/// distance to the closest center picked so far
fn init_centroids(values: &[f64], k: usize, rng: &mut StdRng) -> Option<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(*values.choose(rng)?);
    while centroids.len() < k {
        let next = values
            .choose_weighted(rng, |&v| {
                centroids
                    .iter()
                    .map(|c| (v - c) * (v - c))
                    .fold(f64::INFINITY, f64::min)
            })
            .ok()?;
        centroids.push(*next);
    }
    Some(centroids)
}

fn lloyd(values: &[f64], mut centroids: Vec<f64>, max_iters: usize) -> KMeans1d {
    let k = centroids.len();
    let mut labels = vec![usize::MAX; values.len()];

    for _ in 0..max_iters {
        let mut changed = false;
        for (label, &v) in labels.iter_mut().zip(values) {
            let assigned = nearest(&centroids, v);
            if *label != assigned {
                *label = assigned;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for (&label, &v) in labels.iter().zip(values) {
            sums[label] += v;
            counts[label] += 1;
        }
        for c in 0..k {
            // An emptied cluster keeps its previous center
            if counts[c] > 0 {
                centroids[c] = sums[c] / counts[c] as f64;
            }
        }
    }

    let inertia = labels
        .iter()
        .zip(values)
        .map(|(&label, &v)| (v - centroids[label]).powi(2))
        .sum();

    KMeans1d {
        centroids,
        labels,
        inertia,
    }
}

/// Partition `values` into `k` groups with seeded k-means.
///
/// Runs `params.restarts` seeded initializations and keeps the lowest
/// inertia. Returns `None` when there are fewer than `k` distinct values,
/// since the partition is then not meaningful.
pub fn kmeans_1d(values: &[f64], k: usize, params: &ClusteringParams) -> Option<KMeans1d> {
    if k == 0 || count_distinct(values) < k {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<KMeans1d> = None;

    for _ in 0..params.restarts.max(1) {
        let Some(initial) = init_centroids(values, k, &mut rng) else {
            continue;
        };
        let run = lloyd(values, initial, params.max_iters.max(1));
        let better = best.as_ref().is_none_or(|b| run.inertia < b.inertia);
        if better {
            best = Some(run);
        }
    }

    best
}

/// Density-based clustering of scalar values.
///
/// A value is a core point when at least `min_samples` values (itself
/// included) lie within `eps`. Core points closer than `eps` chain into one
/// cluster; non-core values within `eps` of a core point join the nearest
/// one, the rest are noise (`None`). Cluster ids increase with value.
pub fn dbscan_1d(values: &[f64], eps: f64, min_samples: usize) -> Vec<Option<usize>> {
    let n = values.len();
    let mut labels = vec![None; n];
    if n == 0 {
        return labels;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let sorted: Vec<f64> = order.iter().map(|&i| values[i]).collect();

    // Neighbor counts via a sliding window over the sorted values
    let mut is_core = vec![false; n];
    let (mut lo, mut hi) = (0usize, 0usize);
    for i in 0..n {
        while sorted[i] - sorted[lo] > eps {
            lo += 1;
        }
        if hi < i {
            hi = i;
        }
        while hi + 1 < n && sorted[hi + 1] - sorted[i] <= eps {
            hi += 1;
        }
        is_core[i] = hi - lo + 1 >= min_samples;
    }

    let mut sorted_labels: Vec<Option<usize>> = vec![None; n];
    let mut next_id = 0;
    let mut last_core: Option<usize> = None;
    for i in 0..n {
        if !is_core[i] {
            continue;
        }
        let id = match last_core {
            Some(prev) if sorted[i] - sorted[prev] <= eps => sorted_labels[prev],
            _ => {
                next_id += 1;
                Some(next_id - 1)
            }
        };
        sorted_labels[i] = id;
        last_core = Some(i);
    }

    // Border points join the closest core point in reach
    for i in 0..n {
        if is_core[i] {
            continue;
        }
        let mut best: Option<(f64, usize)> = None;
        for j in 0..n {
            if !is_core[j] {
                continue;
            }
            let d = (sorted[i] - sorted[j]).abs();
            if d <= eps && best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, j));
            }
        }
        sorted_labels[i] = best.and_then(|(_, j)| sorted_labels[j]);
    }

    for (pos, &idx) in order.iter().enumerate() {
        labels[idx] = sorted_labels[pos];
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_count_distinct() {
        assert_eq!(count_distinct(&[1.0, 1.0, 1.0]), 1);
        assert_eq!(count_distinct(&[1.0, 2.0, 1.0, f64::NAN]), 2);
    }

    #[test]
    fn test_kmeans_separates_two_groups() {
        let values = [0.01, -0.02, 0.0, 0.03, 1.55, 1.58, 1.60, 1.57];
        let result = kmeans_1d(&values, 2, &ClusteringParams::default()).unwrap();
        let first = result.labels[0];
        assert!(result.labels[..4].iter().all(|&l| l == first));
        assert!(result.labels[4..].iter().all(|&l| l != first));
        assert_abs_diff_eq!(result.centroids[first], 0.005, epsilon = 1e-9);
    }

    #[test]
    fn test_kmeans_is_reproducible() {
        let values = [0.1, 0.2, 0.25, 0.9, 1.0, 1.1, 0.5, 0.55];
        let params = ClusteringParams::default();
        let a = kmeans_1d(&values, 2, &params).unwrap();
        let b = kmeans_1d(&values, 2, &params).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_kmeans_needs_distinct_values() {
        assert!(kmeans_1d(&[0.7, 0.7, 0.7], 2, &ClusteringParams::default()).is_none());
        assert!(kmeans_1d(&[], 2, &ClusteringParams::default()).is_none());
    }

    #[test]
    fn test_dbscan_chains_close_values() {
        let values = [10.0, 12.0, 100.0, 11.0, 55.0, 200.0, 203.0];
        let labels = dbscan_1d(&values, 5.0, 1);
        assert_eq!(labels[0], Some(0));
        assert_eq!(labels[1], Some(0));
        assert_eq!(labels[3], Some(0));
        assert_eq!(labels[4], Some(1));
        assert_eq!(labels[2], Some(2));
        assert_eq!(labels[5], Some(3));
        assert_eq!(labels[6], Some(3));
    }

    #[test]
    fn test_dbscan_marks_noise() {
        let values = [0.0, 1.0, 2.0, 50.0];
        let labels = dbscan_1d(&values, 1.5, 2);
        assert_eq!(&labels[..3], &[Some(0), Some(0), Some(0)]);
        assert_eq!(labels[3], None);
    }

    #[test]
    fn test_dbscan_border_point() {
        // Only 1.0 sees three values within eps; 0.0 and 2.4 are border points
        let values = [0.0, 1.0, 2.4];
        let labels = dbscan_1d(&values, 1.5, 3);
        assert_eq!(labels, vec![Some(0), Some(0), Some(0)]);
    }
}
