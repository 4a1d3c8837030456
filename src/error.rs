use thiserror::Error;

use crate::lines::{Orientation, PolarLine};

/// Failures of a single board-recovery run. None of them is recovered
/// locally: the photograph is unusable for this attempt.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoardError {
    #[error("line detector returned no lines")]
    NoLinesDetected,

    #[error("could not separate two line orientations ({distinct} distinct angle values)")]
    InsufficientOrientationDiversity { distinct: usize },

    #[error("only {found} usable {orientation} grid line(s), need at least 2")]
    InsufficientGridLines {
        orientation: Orientation,
        found: usize,
    },

    #[error("lines {first} and {second} are parallel, no intersection")]
    DegenerateIntersection { first: PolarLine, second: PolarLine },

    #[error("board corners do not define a projective transform")]
    SingularHomography,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BoardError>;
