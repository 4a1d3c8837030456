mod common;

use board_rectify::{
    detect_board_lines, locate_board, rectify_board, rectify_with_corners, split_squares,
    BoardConfig, BoardError, DetectorParams, Interpolation, PolarLine,
};
use common::*;
use image::DynamicImage;

/// Grid lines the way a detector reports them: each edge found three times
/// with a little `rho` jitter, plus one stray diagonal
fn noisy_detections() -> Vec<PolarLine> {
    let (horizontal, vertical) = grid_lines(&board_to_image());
    let mut lines = Vec::new();
    for line in horizontal.iter().chain(&vertical) {
        for jitter in [-1.0, 0.0, 1.0] {
            lines.push(PolarLine::new(line.rho + jitter, line.theta));
        }
    }
    // Crosses the board rows well to the right of the last column
    lines.push(PolarLine::new(679.7, 0.52));
    lines
}

fn assert_corners_match(found: &[nalgebra::Point2<f64>; 4]) {
    for (corner, (x, y)) in found.iter().zip(CORNERS) {
        assert!(
            (corner.x - x).abs() < 1e-4 && (corner.y - y).abs() < 1e-4,
            "expected ({x}, {y}), got {corner:?}"
        );
    }
}

#[test]
fn test_locates_perspective_board() {
    init_logging();
    let board = locate_board(&noisy_detections(), &BoardConfig::default()).unwrap();

    assert_eq!(board.horizontal.len(), 9);
    assert_eq!(board.vertical.len(), 9);
    assert_corners_match(&board.corners);
}

#[test]
fn test_detection_order_does_not_matter() {
    init_logging();
    let mut lines = noisy_detections();
    lines.reverse();
    let board = locate_board(&lines, &BoardConfig::default()).unwrap();
    assert_corners_match(&board.corners);
}

#[test]
fn test_detects_and_locates_rendered_board() {
    init_logging();
    let img = DynamicImage::ImageRgb8(render_board(&board_to_image(), 640, 560));
    let lines = detect_board_lines(&img, &DetectorParams::default());
    let board = locate_board(&lines, &BoardConfig::default()).unwrap();

    assert_eq!(board.horizontal.len(), 9);
    assert_eq!(board.vertical.len(), 9);
    for (corner, (x, y)) in board.corners.iter().zip(CORNERS) {
        let err = ((corner.x - x).powi(2) + (corner.y - y).powi(2)).sqrt();
        assert!(err < 5.0, "expected ({x}, {y}), got {corner:?}");
    }
}

#[test]
fn test_rectifies_rendered_board() {
    init_logging();
    let h = board_to_image();
    let img = render_board(&h, 640, 560);
    let (horizontal, vertical) = grid_lines(&h);
    let lines: Vec<PolarLine> = horizontal.into_iter().chain(vertical).collect();

    let result = rectify_board(&img, &lines, &BoardConfig::default()).unwrap();
    let rectified = &result.rectified.image;
    assert_eq!(rectified.dimensions(), (450, 575));

    // Square centers: S = 400, so squares are 50 px starting at (25, 150)
    assert_rgb_near(rectified.get_pixel(50, 175), LIGHT);
    assert_rgb_near(rectified.get_pixel(100, 175), DARK);
    assert_rgb_near(rectified.get_pixel(50, 225), DARK);
    assert_rgb_near(rectified.get_pixel(400, 525), LIGHT);
}

#[test]
fn test_custom_warp_geometry() {
    init_logging();
    let h = board_to_image();
    let img = render_board(&h, 640, 560);
    let mut config = BoardConfig::default();
    config.warp.inner_length = 800;
    config.warp.top_margin = 0;
    config.warp.margin = 0;
    config.warp.interpolation = Interpolation::Bicubic;

    let result = rectify_board(&img, &noisy_detections(), &config).unwrap();
    assert_eq!(result.rectified.image.dimensions(), (800, 800));
    assert_rgb_near(result.rectified.image.get_pixel(50, 50), LIGHT);
    assert_rgb_near(result.rectified.image.get_pixel(150, 50), DARK);
}

#[test]
fn test_annotated_corners_in_any_order() {
    init_logging();
    let h = board_to_image();
    let img = render_board(&h, 640, 560);
    let [tl, tr, bl, br] = corner_points();

    let (rectified, top_left_idx) =
        rectify_with_corners(&img, [br, tl, tr, bl], &BoardConfig::default()).unwrap();
    assert_eq!(top_left_idx, 1);
    assert_rgb_near(rectified.image.get_pixel(50, 175), LIGHT);
    assert_rgb_near(rectified.image.get_pixel(100, 175), DARK);
}

#[test]
fn test_split_rectified_board_into_squares() {
    init_logging();
    let h = board_to_image();
    let img = render_board(&h, 640, 560);
    let result = rectify_board(&img, &noisy_detections(), &BoardConfig::default()).unwrap();

    let tiles = split_squares(&result.rectified, 0);
    assert_eq!(tiles.len(), 64);
    assert!(tiles.iter().all(|t| t.dimensions() == (50, 50)));
    assert_rgb_near(tiles[0].get_pixel(25, 25), LIGHT);
    assert_rgb_near(tiles[1].get_pixel(25, 25), DARK);
    assert_rgb_near(tiles[8].get_pixel(25, 25), DARK);
    assert_rgb_near(tiles[63].get_pixel(25, 25), LIGHT);
}

#[test]
fn test_too_few_vertical_lines() {
    init_logging();
    let (horizontal, vertical) = grid_lines(&board_to_image());
    let mut lines = horizontal;
    lines.push(vertical[4]);

    let err = locate_board(&lines, &BoardConfig::default()).unwrap_err();
    assert!(matches!(err, BoardError::InsufficientGridLines { found: 1, .. }));
}

#[test]
fn test_partial_config_from_json() {
    let config: BoardConfig = serde_json::from_str(
        r#"{
            "warp": { "inner_length": 800 },
            "horizontal": { "eps": 20.0, "min_samples": 2, "angle_tolerance": 0.1 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.warp.inner_length, 800);
    assert_eq!(config.warp.top_margin, 150);
    assert_eq!(config.warp.output_size(), (850, 975));
    assert_eq!(config.horizontal.eps, 20.0);
    assert_eq!(config.horizontal.min_samples, 2);
    // Untouched sections keep their own defaults
    assert_eq!(config.vertical.eps, 12.0);
    assert_eq!(config.vertical.angle_tolerance, 0.15);
    assert_eq!(config.expected_lines, 9);
    assert!(config.validate().is_ok());
}

#[test]
fn test_incomplete_axis_section_is_rejected() {
    let parsed = serde_json::from_str::<BoardConfig>(r#"{ "vertical": { "eps": 20.0 } }"#);
    assert!(parsed.is_err());
}
