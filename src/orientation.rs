use std::f64::consts::FRAC_PI_2;

use log::debug;

use crate::clustering::{count_distinct, kmeans_1d};
use crate::config::{ClusteringParams, ORIENTATION_CLUSTERS};
use crate::error::{BoardError, Result};
use crate::lines::{Orientation, PolarLine};

/// Lines of one orientation group
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedLines {
    pub orientation: Orientation,
    pub lines: Vec<PolarLine>,
    /// Mean `theta` of the group
    pub centroid: f64,
}

/// The two orientation groups of a board photograph
#[derive(Debug, Clone)]
pub struct OrientationClusters {
    pub horizontal: OrientedLines,
    pub vertical: OrientedLines,
}

/// Split normalized lines into a horizontal and a vertical group.
///
/// Runs seeded k-means with two clusters over `theta`. The cluster whose
/// centroid is closer to π/2 (normals pointing down the image) holds the
/// horizontal lines.
pub fn cluster_orientations(
    lines: &[PolarLine],
    params: &ClusteringParams,
) -> Result<OrientationClusters> {
    let thetas: Vec<f64> = lines.iter().map(|l| l.theta).collect();
    let distinct = count_distinct(&thetas);

    let result = kmeans_1d(&thetas, ORIENTATION_CLUSTERS, params)
        .ok_or(BoardError::InsufficientOrientationDiversity { distinct })?;

    let mut groups: [Vec<PolarLine>; ORIENTATION_CLUSTERS] = [Vec::new(), Vec::new()];
    for (line, &label) in lines.iter().zip(&result.labels) {
        groups[label].push(*line);
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(BoardError::InsufficientOrientationDiversity { distinct });
    }

    let [c0, c1] = [result.centroids[0], result.centroids[1]];
    let horizontal_idx = if (c0 - FRAC_PI_2).abs() <= (c1 - FRAC_PI_2).abs() {
        0
    } else {
        1
    };
    let vertical_idx = 1 - horizontal_idx;

    let [g0, g1] = groups;
    let (horizontal_lines, vertical_lines) = if horizontal_idx == 0 {
        (g0, g1)
    } else {
        (g1, g0)
    };

    debug!(
        "Orientation clusters: {} horizontal (theta≈{:.3}), {} vertical (theta≈{:.3})",
        horizontal_lines.len(),
        result.centroids[horizontal_idx],
        vertical_lines.len(),
        result.centroids[vertical_idx]
    );

    Ok(OrientationClusters {
        horizontal: OrientedLines {
            orientation: Orientation::Horizontal,
            lines: horizontal_lines,
            centroid: result.centroids[horizontal_idx],
        },
        vertical: OrientedLines {
            orientation: Orientation::Vertical,
            lines: vertical_lines,
            centroid: result.centroids[vertical_idx],
        },
    })
}
