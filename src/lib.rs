pub mod cli;
pub mod clustering;
pub mod config;
pub mod corners;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod lines;
pub mod orientation;
pub mod pipeline;
pub mod transform;

pub use cli::Cli;
pub use config::{AxisParams, BoardConfig, ClusteringParams, Interpolation, WarpParams};
pub use corners::{locate_corners, order_corners, CornerPoint};
pub use detection::{detect_board_lines, DetectorParams};
pub use error::{BoardError, Result};
pub use geometry::Homography;
pub use grid::{resolve_grid_lines, GridLines};
pub use lines::{normalize_lines, Orientation, PolarLine};
pub use orientation::{cluster_orientations, OrientationClusters, OrientedLines};
pub use pipeline::{
    locate_board, rectify_board, rectify_with_corners, BoardCorners, BoardRecognition,
};
pub use transform::{rectify, split_squares, RectifiedImage};
