#![allow(dead_code)]

use board_rectify::{Homography, PolarLine};
use image::{Rgb, RgbImage};
use nalgebra::Point2;
use std::f64::consts::PI;

pub const LIGHT: Rgb<u8> = Rgb([230, 220, 200]);
pub const DARK: Rgb<u8> = Rgb([40, 60, 30]);
pub const BACKGROUND: Rgb<u8> = Rgb([128, 128, 128]);

/// Board corners of the synthetic photograph, `[TL, TR, BL, BR]`
pub const CORNERS: [(f64, f64); 4] = [
    (120.0, 100.0),
    (480.0, 110.0),
    (60.0, 460.0),
    (540.0, 470.0),
];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Resampled colours may be a level or two off after blending
pub fn assert_rgb_near(actual: &Rgb<u8>, expected: Rgb<u8>) {
    for (a, e) in actual.0.iter().zip(expected.0) {
        assert!(a.abs_diff(e) <= 2, "expected {expected:?}, got {actual:?}");
    }
}

pub fn corner_points() -> [Point2<f64>; 4] {
    CORNERS.map(|(x, y)| Point2::new(x, y))
}

/// Maps board units (one square = 1, board spans 0..8) into the photograph
pub fn board_to_image() -> Homography {
    let board = [
        Point2::new(0.0, 0.0),
        Point2::new(8.0, 0.0),
        Point2::new(0.0, 8.0),
        Point2::new(8.0, 8.0),
    ];
    Homography::from_correspondences(&board, &corner_points()).unwrap()
}

/// Line through two points, reported the way a Hough detector does:
/// `theta` in `[0, π)` and `rho` possibly negative.
pub fn line_through(p: Point2<f64>, q: Point2<f64>) -> PolarLine {
    let (dx, dy) = (q.x - p.x, q.y - p.y);
    let mut theta = dx.atan2(-dy);
    if theta < 0.0 {
        theta += PI;
    }
    if theta >= PI {
        theta -= PI;
    }
    let rho = p.x * theta.cos() + p.y * theta.sin();
    PolarLine::new(rho, theta)
}

/// The 9 horizontal and 9 vertical grid lines of the board, top to bottom
/// and left to right
pub fn grid_lines(h: &Homography) -> (Vec<PolarLine>, Vec<PolarLine>) {
    let horizontal = (0..9)
        .map(|i| {
            let v = i as f64;
            line_through(h.apply(&Point2::new(0.0, v)), h.apply(&Point2::new(8.0, v)))
        })
        .collect();
    let vertical = (0..9)
        .map(|i| {
            let u = i as f64;
            line_through(h.apply(&Point2::new(u, 0.0)), h.apply(&Point2::new(u, 8.0)))
        })
        .collect();
    (horizontal, vertical)
}

/// Draw a checkerboard seen through `h` on a plain background
pub fn render_board(h: &Homography, width: u32, height: u32) -> RgbImage {
    let inverse = h.inverse().unwrap();
    RgbImage::from_fn(width, height, |x, y| {
        let p = inverse.apply(&Point2::new(x as f64, y as f64));
        if (0.0..8.0).contains(&p.x) && (0.0..8.0).contains(&p.y) {
            if (p.x.floor() as i64 + p.y.floor() as i64) % 2 == 0 {
                LIGHT
            } else {
                DARK
            }
        } else {
            BACKGROUND
        }
    })
}
