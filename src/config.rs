use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};
use crate::lines::Orientation;

/// Number of orientation groups a board photograph is split into
pub const ORIENTATION_CLUSTERS: usize = 2;

/// Seeded k-means settings used by the orientation clusterer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringParams {
    /// Seed for centroid initialization; equal seeds give equal results
    pub seed: u64,
    /// Max Lloyd iterations per restart
    pub max_iters: usize,
    /// Number of seeded restarts, the lowest-inertia one wins
    pub restarts: usize,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self {
            seed: 42,
            max_iters: 300,
            restarts: 10,
        }
    }
}

/// Per-orientation tunables of the grid line resolver.
///
/// A section given in a config file must list every field; a missing
/// section keeps the orientation's own defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisParams {
    /// Neighborhood radius (pixels along the cross line) for merging duplicates
    pub eps: f64,
    /// Minimum cluster size for density clustering
    pub min_samples: usize,
    /// Max angle step (radians) between consecutive lines of one run
    pub angle_tolerance: f64,
}

impl Default for AxisParams {
    fn default() -> Self {
        Self {
            eps: 10.0,
            min_samples: 1,
            angle_tolerance: 0.05,
        }
    }
}

/// Resampling kernel for the perspective warp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Bilinear,
    Bicubic,
}

impl From<Interpolation> for imageproc::geometric_transformations::Interpolation {
    fn from(interpolation: Interpolation) -> Self {
        match interpolation {
            Interpolation::Bilinear => Self::Bilinear,
            Interpolation::Bicubic => Self::Bicubic,
        }
    }
}

/// Geometry of the rectified output image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpParams {
    /// Side of the inner 8×8 board, in pixels
    pub inner_length: u32,
    /// Margin above the board; larger so tall pieces on the far rank survive
    pub top_margin: u32,
    /// Left, right and bottom margin
    pub margin: u32,
    pub interpolation: Interpolation,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            inner_length: 400,
            top_margin: 150,
            margin: 25,
            interpolation: Interpolation::Bilinear,
        }
    }
}

impl WarpParams {
    /// `(width, height)` of the rectified image: `(S + 2m, S + m + t)`
    pub fn output_size(&self) -> (u32, u32) {
        (
            self.inner_length + 2 * self.margin,
            self.inner_length + self.margin + self.top_margin,
        )
    }

    /// Side of one board square in the rectified image
    pub fn square_length(&self) -> f64 {
        self.inner_length as f64 / 8.0
    }
}

/// Every tunable of the board recovery pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub clustering: ClusteringParams,
    pub horizontal: AxisParams,
    pub vertical: AxisParams,
    /// Grid lines per axis of an 8×8 board
    pub expected_lines: usize,
    /// Below this `|sin(Δθ)|` two lines are treated as parallel
    pub intersection_epsilon: f64,
    pub warp: WarpParams,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            clustering: ClusteringParams::default(),
            horizontal: AxisParams::default(),
            // Vertical lines converge under perspective, so their angle steps are larger
            vertical: AxisParams {
                eps: 12.0,
                min_samples: 1,
                angle_tolerance: 0.15,
            },
            expected_lines: 9,
            intersection_epsilon: 1e-9,
            warp: WarpParams::default(),
        }
    }
}

impl BoardConfig {
    pub fn axis(&self, orientation: Orientation) -> &AxisParams {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let axis = self.axis(orientation);
            if axis.eps.is_nan() || axis.eps <= 0.0 {
                return Err(BoardError::InvalidConfig(format!(
                    "{orientation} eps must be positive, got {}",
                    axis.eps
                )));
            }
            if axis.min_samples == 0 {
                return Err(BoardError::InvalidConfig(format!(
                    "{orientation} min_samples must be at least 1"
                )));
            }
            if axis.angle_tolerance.is_nan() || axis.angle_tolerance <= 0.0 {
                return Err(BoardError::InvalidConfig(format!(
                    "{orientation} angle_tolerance must be positive, got {}",
                    axis.angle_tolerance
                )));
            }
        }
        if self.expected_lines < 2 {
            return Err(BoardError::InvalidConfig(format!(
                "expected_lines must be at least 2, got {}",
                self.expected_lines
            )));
        }
        if self.clustering.max_iters == 0 || self.clustering.restarts == 0 {
            return Err(BoardError::InvalidConfig(
                "clustering needs at least one iteration and one restart".to_string(),
            ));
        }
        if self.intersection_epsilon.is_nan() || self.intersection_epsilon < 0.0 {
            return Err(BoardError::InvalidConfig(
                "intersection_epsilon must not be negative".to_string(),
            ));
        }
        if self.warp.inner_length == 0 {
            return Err(BoardError::InvalidConfig(
                "inner_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
