use log::info;
use nalgebra::Point2;

use crate::error::{BoardError, Result};
use crate::grid::GridLines;
use crate::lines::Orientation;

/// Corner of the board in source image pixels
pub type CornerPoint = Point2<f64>;

/// Index of each corner in a `[CornerPoint; 4]`
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_LEFT: usize = 2;
pub const BOTTOM_RIGHT: usize = 3;

/// Intersect the outermost grid lines of both axes.
///
/// Both sequences must be sorted by `rho`: the first horizontal line is the
/// top edge, the last one the bottom edge; the first vertical line is the
/// left edge, the last one the right edge. Returns
/// `[top-left, top-right, bottom-left, bottom-right]`.
pub fn locate_corners(
    horizontal: &GridLines,
    vertical: &GridLines,
    epsilon: f64,
) -> Result<[CornerPoint; 4]> {
    let edges = |grid: &GridLines, orientation: Orientation| match (grid.first(), grid.last()) {
        (Some(first), Some(last)) if grid.len() >= 2 => Ok((*first, *last)),
        _ => Err(BoardError::InsufficientGridLines {
            orientation,
            found: grid.len(),
        }),
    };
    let (top, bottom) = edges(horizontal, Orientation::Horizontal)?;
    let (left, right) = edges(vertical, Orientation::Vertical)?;

    let mut corners = [CornerPoint::origin(); 4];
    corners[TOP_LEFT] = top.intersect(&left, epsilon)?;
    corners[TOP_RIGHT] = top.intersect(&right, epsilon)?;
    corners[BOTTOM_LEFT] = bottom.intersect(&left, epsilon)?;
    corners[BOTTOM_RIGHT] = bottom.intersect(&right, epsilon)?;

    let [tl, tr, bl, br] = corners;
    info!(
        "Board corners: TL ({:.1}, {:.1}) TR ({:.1}, {:.1}) BL ({:.1}, {:.1}) BR ({:.1}, {:.1})",
        tl.x, tl.y, tr.x, tr.y, bl.x, bl.y, br.x, br.y
    );

    Ok(corners)
}

/// Order four arbitrary points as `[top-left, top-right, bottom-left, bottom-right]`.
///
/// The two points with the smallest `y` (then `x`) form the top edge, each
/// edge is ordered by `x`. Also returns the input index of the top-left
/// point, which tells how an annotated board was rotated.
pub fn order_corners(points: [CornerPoint; 4]) -> ([CornerPoint; 4], usize) {
    let mut indices = [0usize, 1, 2, 3];
    indices.sort_by(|&a, &b| {
        points[a]
            .y
            .total_cmp(&points[b].y)
            .then(points[a].x.total_cmp(&points[b].x))
    });

    let mut top = [indices[0], indices[1]];
    let mut bottom = [indices[2], indices[3]];
    top.sort_by(|&a, &b| points[a].x.total_cmp(&points[b].x));
    bottom.sort_by(|&a, &b| points[a].x.total_cmp(&points[b].x));

    let mut ordered = [CornerPoint::origin(); 4];
    ordered[TOP_LEFT] = points[top[0]];
    ordered[TOP_RIGHT] = points[top[1]];
    ordered[BOTTOM_LEFT] = points[bottom[0]];
    ordered[BOTTOM_RIGHT] = points[bottom[1]];
    (ordered, top[0])
}
