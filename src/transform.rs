use image::imageops::overlay;
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Projection};
use log::debug;
use nalgebra::Point2;

use crate::config::{Interpolation, WarpParams};
use crate::corners::{CornerPoint, BOTTOM_LEFT, BOTTOM_RIGHT, TOP_LEFT, TOP_RIGHT};
use crate::error::{BoardError, Result};
use crate::geometry::Homography;

/// Board resampled to a canonical top-down view
#[derive(Debug, Clone)]
pub struct RectifiedImage {
    pub image: RgbImage,
    /// Maps source image coordinates to rectified coordinates
    pub homography: Homography,
    /// Board corners in the rectified image, same order as the source corners
    pub destination: [CornerPoint; 4],
    /// Geometry the image was produced with
    pub params: WarpParams,
}

impl RectifiedImage {
    /// Map points from the rectified image back to the source photograph
    pub fn to_source(&self, points: &[Point2<f64>]) -> Option<Vec<Point2<f64>>> {
        self.homography.inverse().map(|inv| inv.apply_points(points))
    }
}

/// Destination rectangle `[(m,t), (m+S,t), (m,t+S), (m+S,t+S)]`
pub fn destination_corners(params: &WarpParams) -> [CornerPoint; 4] {
    let s = params.inner_length as f64;
    let m = params.margin as f64;
    let t = params.top_margin as f64;
    let mut corners = [Point2::origin(); 4];
    corners[TOP_LEFT] = Point2::new(m, t);
    corners[TOP_RIGHT] = Point2::new(m + s, t);
    corners[BOTTOM_LEFT] = Point2::new(m, t + s);
    corners[BOTTOM_RIGHT] = Point2::new(m + s, t + s);
    corners
}

/// Resample `img` through `homography` (source -> output) into a
/// `width × height` image. Output pixels whose source falls outside the
/// photograph are black.
pub fn warp_perspective(
    img: &RgbImage,
    homography: &Homography,
    width: u32,
    height: u32,
    interpolation: Interpolation,
) -> Result<RgbImage> {
    let h = homography.to_array();
    let matrix: [f32; 9] = std::array::from_fn(|i| h[i / 3][i % 3] as f32);
    let projection = Projection::from_matrix(matrix).ok_or(BoardError::SingularHomography)?;

    let mut output = RgbImage::new(width, height);
    warp_into(
        img,
        &projection,
        interpolation.into(),
        Rgb([0, 0, 0]),
        &mut output,
    );
    Ok(output)
}

/// Perspective normalizer: map the four board corners onto the canonical
/// rectangle and resample the photograph.
///
/// `corners` must be ordered `[top-left, top-right, bottom-left, bottom-right]`.
pub fn rectify(
    img: &RgbImage,
    corners: &[CornerPoint; 4],
    params: &WarpParams,
) -> Result<RectifiedImage> {
    let destination = destination_corners(params);
    let homography = Homography::from_correspondences(corners, &destination)?;
    let (width, height) = params.output_size();

    debug!(
        "Warping {}x{} -> {}x{} ({:?})",
        img.width(),
        img.height(),
        width,
        height,
        params.interpolation
    );

    let image = warp_perspective(img, &homography, width, height, params.interpolation)?;
    Ok(RectifiedImage {
        image,
        homography,
        destination,
        params: params.clone(),
    })
}

/// Cut the rectified board into 64 square tiles, row-major from the
/// top-left square. Each tile spans one square plus `context` pixels on every
/// side; parts outside the image stay black.
pub fn split_squares(rectified: &RectifiedImage, context: u32) -> Vec<RgbImage> {
    let origin = rectified.destination[TOP_LEFT];
    let side = rectified.params.square_length();
    let tile_size = side.round() as u32 + 2 * context;

    let mut tiles = Vec::with_capacity(64);
    for row in 0..8 {
        for col in 0..8 {
            let start_x = (origin.x + col as f64 * side).round() as i64 - context as i64;
            let start_y = (origin.y + row as f64 * side).round() as i64 - context as i64;

            let mut tile = RgbImage::new(tile_size, tile_size);
            overlay(&mut tile, &rectified.image, -start_x, -start_y);
            tiles.push(tile);
        }
    }
    tiles
}
