use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::hough::{detect_lines, LineDetectionOptions};
use imageproc::stats::percentile;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::lines::PolarLine;

/// Tunables of the edge and line detector feeding the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Gaussian blur applied before edge detection; 0 disables it
    pub blur_sigma: f32,
    /// Canny thresholds are `(1 ± canny_sigma) · median` of the blurred image
    pub canny_sigma: f32,
    /// Minimum Hough votes as a fraction of the shorter image side
    pub vote_ratio: f32,
    /// Lower bound on the Hough vote threshold
    pub min_votes: u32,
    /// Non-maximum suppression radius in Hough space
    pub suppression_radius: u32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.5,
            canny_sigma: 0.25,
            vote_ratio: 0.143,
            min_votes: 30,
            suppression_radius: 6,
        }
    }
}

impl DetectorParams {
    /// Hough vote threshold for a `width × height` image: a fraction of the
    /// shorter side, never below `min_votes`. Slanted edges split their votes
    /// over neighbouring whole-degree bins.
    pub fn vote_threshold(&self, width: u32, height: u32) -> u32 {
        let scaled = (width.min(height) as f32 * self.vote_ratio).round() as u32;
        scaled.max(self.min_votes)
    }
}

/// Canny thresholds derived from the median intensity
pub fn auto_canny_thresholds(gray: &GrayImage, sigma: f32) -> (f32, f32) {
    if gray.width() == 0 || gray.height() == 0 {
        return (0.0, 0.0);
    }
    let median = percentile(gray, 50) as f32;
    let lower = ((1.0 - sigma) * median).max(0.0);
    let upper = ((1.0 + sigma) * median).min(255.0);
    (lower, upper)
}

/// Hough output uses the same normal form with the angle in whole degrees
pub fn from_hough(line: &imageproc::hough::PolarLine) -> PolarLine {
    PolarLine::new(line.r as f64, (line.angle_in_degrees as f64).to_radians())
}

/// Detect straight lines in a photograph.
///
/// Grayscale, Gaussian blur, Canny with median-based thresholds and a Hough
/// transform. Returned lines are raw: `rho` may be negative and the same
/// physical edge may appear several times.
pub fn detect_board_lines(img: &DynamicImage, params: &DetectorParams) -> Vec<PolarLine> {
    let gray = img.to_luma8();
    let blurred = if params.blur_sigma > 0.0 {
        gaussian_blur_f32(&gray, params.blur_sigma)
    } else {
        gray
    };

    let (low, high) = auto_canny_thresholds(&blurred, params.canny_sigma);
    let edges = canny(&blurred, low, high);
    debug!("Canny thresholds: {:.1} / {:.1}", low, high);

    let vote_threshold = params.vote_threshold(img.width(), img.height());
    let options = LineDetectionOptions {
        vote_threshold,
        suppression_radius: params.suppression_radius,
    };
    let lines: Vec<PolarLine> = detect_lines(&edges, options).iter().map(from_hough).collect();

    debug!(
        "Detected {} Hough lines (vote threshold {})",
        lines.len(),
        vote_threshold
    );
    lines
}
