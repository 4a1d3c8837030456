use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;

use crate::clustering::{dbscan_1d, median};
use crate::config::{AxisParams, BoardConfig};
use crate::error::{BoardError, Result};
use crate::lines::{Orientation, PolarLine};
use crate::orientation::OrientedLines;

/// Deduplicated, ordered grid lines of one board axis, sorted by `rho`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLines {
    pub orientation: Orientation,
    pub lines: Vec<PolarLine>,
}

impl GridLines {
    pub fn first(&self) -> Option<&PolarLine> {
        self.lines.first()
    }

    pub fn last(&self) -> Option<&PolarLine> {
        self.lines.last()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Collapse repeated detections of the same physical line.
///
/// Each line is intersected with `reference` (a line of the other
/// orientation) and the intersections are clustered by their position along
/// it. Every cluster becomes one line with the median `rho` and median
/// `theta` of its members. Lines parallel to the reference and
/// density-clustering noise are dropped.
pub fn deduplicate_lines(
    lines: &[PolarLine],
    reference: &PolarLine,
    params: &AxisParams,
    epsilon: f64,
) -> Vec<PolarLine> {
    let mut kept = Vec::with_capacity(lines.len());
    let mut positions = Vec::with_capacity(lines.len());
    for line in lines {
        match line.intersect(reference, epsilon) {
            Ok(point) => {
                kept.push(*line);
                positions.push(reference.position_along(&point));
            }
            Err(_) => debug!("Dropping {line}: parallel to cross line {reference}"),
        }
    }

    let labels = dbscan_1d(&positions, params.eps, params.min_samples);

    let mut members: BTreeMap<usize, Vec<PolarLine>> = BTreeMap::new();
    for (line, label) in kept.iter().zip(labels) {
        if let Some(id) = label {
            members.entry(id).or_default().push(*line);
        }
    }

    members
        .values()
        .filter_map(|group| {
            let rhos: Vec<f64> = group.iter().map(|l| l.rho).collect();
            let thetas: Vec<f64> = group.iter().map(|l| l.theta).collect();
            Some(PolarLine::new(median(&rhos)?, median(&thetas)?))
        })
        .collect()
}

/// Longest run of angle-consistent lines.
///
/// Lines are sorted by `theta`; a run continues while each step to the next
/// line is below `tolerance`. The first of equally long runs wins.
pub fn longest_consistent_run(mut lines: Vec<PolarLine>, tolerance: f64) -> Vec<PolarLine> {
    if lines.is_empty() {
        return lines;
    }
    lines.sort_by(|a, b| a.theta.total_cmp(&b.theta));

    let mut best_start = 0;
    let mut best_len = 1;
    let mut start = 0;
    for i in 1..lines.len() {
        if lines[i].theta - lines[i - 1].theta >= tolerance {
            start = i;
        }
        let len = i - start + 1;
        if len > best_len {
            best_start = start;
            best_len = len;
        }
    }

    lines.drain(best_start..best_start + best_len).collect()
}

/// Ordinary least squares fit `y = slope·x + intercept`
fn fit_line(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxx += (x - x_mean) * (x - x_mean);
        sxy += (x - x_mean) * (y - y_mean);
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (slope, y_mean - slope * x_mean)
}

/// Trim a run down to `target` lines by spacing residuals.
///
/// Under perspective the spacing of a regular grid varies roughly linearly
/// with rank. Each line gets a deviation equal to the larger of its gaps to
/// the neighbors in `rho` order, a linear trend is fitted through the
/// deviations, and the lines with the largest squared residuals are removed
/// one at a time (first index wins a tie). Survivors come back sorted by
/// `rho`.
pub fn trim_to_count(mut lines: Vec<PolarLine>, target: usize) -> Vec<PolarLine> {
    lines.sort_by(|a, b| a.rho.total_cmp(&b.rho));
    let n = lines.len();
    if n <= target {
        return lines;
    }

    let gaps: Vec<f64> = lines.windows(2).map(|w| w[1].rho - w[0].rho).collect();
    let deviations: Vec<f64> = (0..n)
        .map(|i| {
            let prev = if i > 0 { gaps[i - 1] } else { 0.0 };
            let next = if i + 1 < n { gaps[i] } else { 0.0 };
            prev.max(next)
        })
        .collect();

    let ranks: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let (slope, intercept) = fit_line(&ranks, &deviations);
    let residuals: Vec<f64> = deviations
        .iter()
        .zip(&ranks)
        .map(|(d, r)| (d - (slope * r + intercept)).powi(2))
        .collect();

    let mut removed = vec![false; n];
    for _ in 0..n - target {
        let mut worst: Option<usize> = None;
        for i in 0..n {
            if removed[i] {
                continue;
            }
            if worst.is_none_or(|w| residuals[i] > residuals[w]) {
                worst = Some(i);
            }
        }
        if let Some(w) = worst {
            debug!(
                "Trimming {} (spacing residual {:.2})",
                lines[w], residuals[w]
            );
            removed[w] = true;
        }
    }

    lines
        .into_iter()
        .zip(removed)
        .filter_map(|(line, gone)| (!gone).then_some(line))
        .collect()
}

/// Resolve the grid lines of one orientation.
///
/// `reference` is the mean line of the other orientation. Runs
/// deduplication, best-run selection and, when the run is longer than
/// `config.expected_lines`, residual trimming.
pub fn resolve_grid_lines(
    group: &OrientedLines,
    reference: &PolarLine,
    config: &BoardConfig,
) -> Result<GridLines> {
    let orientation = group.orientation;
    let params = config.axis(orientation);

    let unique = deduplicate_lines(
        &group.lines,
        reference,
        params,
        config.intersection_epsilon,
    );
    debug!(
        "{orientation}: {} raw lines -> {} unique",
        group.lines.len(),
        unique.len()
    );

    let run = longest_consistent_run(unique, params.angle_tolerance);
    debug!("{orientation}: best run has {} lines", run.len());

    if run.len() < 2 {
        return Err(BoardError::InsufficientGridLines {
            orientation,
            found: run.len(),
        });
    }

    let lines = trim_to_count(run, config.expected_lines);
    if lines.len() < config.expected_lines {
        warn!(
            "{orientation}: resolved {} of {} expected grid lines",
            lines.len(),
            config.expected_lines
        );
    }

    Ok(GridLines { orientation, lines })
}
