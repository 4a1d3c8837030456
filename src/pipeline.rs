use image::RgbImage;
use log::debug;

use crate::config::BoardConfig;
use crate::corners::{locate_corners, order_corners, CornerPoint};
use crate::error::{BoardError, Result};
use crate::grid::{resolve_grid_lines, GridLines};
use crate::lines::{mean_line, normalize_lines, PolarLine};
use crate::orientation::cluster_orientations;
use crate::transform::{rectify, RectifiedImage};

/// Outer corners of the board plus the grid lines they came from
#[derive(Debug, Clone)]
pub struct BoardCorners {
    /// `[top-left, top-right, bottom-left, bottom-right]`
    pub corners: [CornerPoint; 4],
    pub horizontal: GridLines,
    pub vertical: GridLines,
}

/// Full result for one photograph
#[derive(Debug, Clone)]
pub struct BoardRecognition {
    pub board: BoardCorners,
    pub rectified: RectifiedImage,
}

/// Find the four outer board corners from raw detector lines.
///
/// Normalizes the lines, splits them by orientation, resolves the grid
/// lines of each axis against the mean line of the other, and intersects
/// the outermost ones.
pub fn locate_board(lines: &[PolarLine], config: &BoardConfig) -> Result<BoardCorners> {
    config.validate()?;
    if lines.is_empty() {
        return Err(BoardError::NoLinesDetected);
    }

    let normalized = normalize_lines(lines);
    let clusters = cluster_orientations(&normalized, &config.clustering)?;

    let (Some(horizontal_ref), Some(vertical_ref)) = (
        mean_line(&clusters.horizontal.lines),
        mean_line(&clusters.vertical.lines),
    ) else {
        return Err(BoardError::InsufficientOrientationDiversity {
            distinct: normalized.len(),
        });
    };
    debug!("Cross lines: horizontal {horizontal_ref}, vertical {vertical_ref}");

    let horizontal = resolve_grid_lines(&clusters.horizontal, &vertical_ref, config)?;
    let vertical = resolve_grid_lines(&clusters.vertical, &horizontal_ref, config)?;

    let corners = locate_corners(&horizontal, &vertical, config.intersection_epsilon)?;

    Ok(BoardCorners {
        corners,
        horizontal,
        vertical,
    })
}

/// Locate the board and resample the photograph to the canonical view
pub fn rectify_board(
    img: &RgbImage,
    lines: &[PolarLine],
    config: &BoardConfig,
) -> Result<BoardRecognition> {
    let board = locate_board(lines, config)?;
    let rectified = rectify(img, &board.corners, &config.warp)?;
    Ok(BoardRecognition { board, rectified })
}

/// Rectify from four corners supplied in any order (e.g. annotations).
///
/// Returns the rectified image and the input index of the corner that
/// ended up top-left.
pub fn rectify_with_corners(
    img: &RgbImage,
    points: [CornerPoint; 4],
    config: &BoardConfig,
) -> Result<(RectifiedImage, usize)> {
    config.validate()?;
    let (corners, top_left_idx) = order_corners(points);
    let rectified = rectify(img, &corners, &config.warp)?;
    Ok((rectified, top_left_idx))
}
