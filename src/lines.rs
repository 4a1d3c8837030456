use std::f64::consts::{PI, TAU};
use std::fmt;

use nalgebra::Point2;
use serde::Serialize;

use crate::error::{BoardError, Result};

/// Line in Hesse normal form: `x·cos(theta) + y·sin(theta) = rho`.
///
/// The representation is two-valued, `(rho, theta)` and `(-rho, theta - π)`
/// describe the same line. [`PolarLine::normalized`] picks the one with a
/// non-negative `rho`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolarLine {
    /// Signed distance from the image origin, in pixels
    pub rho: f64,
    /// Angle of the line normal, in radians
    pub theta: f64,
}

impl PolarLine {
    pub fn new(rho: f64, theta: f64) -> Self {
        Self { rho, theta }
    }

    /// Canonical representation with `rho >= 0` and `theta` in `[-π, π)`.
    /// Applying it to an already normalized line returns the line unchanged.
    pub fn normalized(self) -> Self {
        let (rho, theta) = if self.rho < 0.0 {
            (-self.rho, self.theta - PI)
        } else {
            (self.rho, self.theta)
        };
        Self {
            rho,
            theta: wrap_angle(theta),
        }
    }

    /// Unit vector along the line
    pub fn direction(&self) -> (f64, f64) {
        (-self.theta.sin(), self.theta.cos())
    }

    /// Signed coordinate of `point` along the line direction
    pub fn position_along(&self, point: &Point2<f64>) -> f64 {
        let (dx, dy) = self.direction();
        point.x * dx + point.y * dy
    }

    /// Perpendicular distance from `point` to the line
    pub fn distance_to(&self, point: &Point2<f64>) -> f64 {
        (point.x * self.theta.cos() + point.y * self.theta.sin() - self.rho).abs()
    }

    /// Intersect two lines by solving the 2×2 system of their normal forms.
    ///
    /// Fails with [`BoardError::DegenerateIntersection`] when the
    /// determinant `sin(theta1 - theta2)` is within `epsilon` of zero.
    pub fn intersect(&self, other: &PolarLine, epsilon: f64) -> Result<Point2<f64>> {
        let (sin1, cos1) = self.theta.sin_cos();
        let (sin2, cos2) = other.theta.sin_cos();

        let det = cos2 * sin1 - cos1 * sin2;
        if det.abs() < epsilon {
            return Err(BoardError::DegenerateIntersection {
                first: *self,
                second: *other,
            });
        }

        let x = (sin1 * other.rho - sin2 * self.rho) / det;
        let y = (cos1 * other.rho - cos2 * self.rho) / -det;
        Ok(Point2::new(x, y))
    }
}

impl fmt::Display for PolarLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(rho={:.2}, theta={:.4})", self.rho, self.theta)
    }
}

/// Which axis of the board a set of lines belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

/// Bring an angle into `[-π, π)`. Angles already in range are returned as is.
pub fn wrap_angle(theta: f64) -> f64 {
    if (-PI..PI).contains(&theta) {
        theta
    } else {
        (theta + PI).rem_euclid(TAU) - PI
    }
}

/// Line normalizer: canonicalize every raw detector line
pub fn normalize_lines(lines: &[PolarLine]) -> Vec<PolarLine> {
    lines.iter().map(|line| line.normalized()).collect()
}

/// Component-wise mean line, `None` for an empty set
pub fn mean_line(lines: &[PolarLine]) -> Option<PolarLine> {
    if lines.is_empty() {
        return None;
    }
    let n = lines.len() as f64;
    let rho = lines.iter().map(|l| l.rho).sum::<f64>() / n;
    let theta = lines.iter().map(|l| l.theta).sum::<f64>() / n;
    Some(PolarLine::new(rho, theta))
}
