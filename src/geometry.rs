use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

use crate::error::{BoardError, Result};

/// Projective transform between two image planes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub matrix: Matrix3<f64>,
}

impl Homography {
    pub fn new(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// Row-major copy of the matrix
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        let m = &self.matrix;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// Compute `H` with `dst ~ H·src` from four point correspondences.
    ///
    /// Both point sets are Hartley-normalized before solving the 8×8 system
    /// with `h33 = 1`. Fails with [`BoardError::SingularHomography`] when
    /// three points of either set are collinear or the system is singular.
    pub fn from_correspondences(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Result<Self> {
        if has_collinear_triple(src) || has_collinear_triple(dst) {
            return Err(BoardError::SingularHomography);
        }

        let (src_n, t_src) = normalize_points(src);
        let (dst_n, t_dst) = normalize_points(dst);

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for k in 0..4 {
            let (x, y) = (src_n[k].x, src_n[k].y);
            let (u, v) = (dst_n[k].x, dst_n[k].y);

            let r0 = 2 * k;
            a[(r0, 0)] = x;
            a[(r0, 1)] = y;
            a[(r0, 2)] = 1.0;
            a[(r0, 6)] = -u * x;
            a[(r0, 7)] = -u * y;
            b[r0] = u;

            let r1 = 2 * k + 1;
            a[(r1, 3)] = x;
            a[(r1, 4)] = y;
            a[(r1, 5)] = 1.0;
            a[(r1, 6)] = -v * x;
            a[(r1, 7)] = -v * y;
            b[r1] = v;
        }

        let h = a.lu().solve(&b).ok_or(BoardError::SingularHomography)?;
        let normalized = Matrix3::new(
            h[0], h[1], h[2], //
            h[3], h[4], h[5], //
            h[6], h[7], 1.0,
        );

        // H = T_dst⁻¹ · Hn · T_src
        let t_dst_inv = t_dst.try_inverse().ok_or(BoardError::SingularHomography)?;
        let matrix = t_dst_inv * normalized * t_src;
        let scale = matrix[(2, 2)];
        if scale.abs() < 1e-12 || !matrix.iter().all(|v| v.is_finite()) {
            return Err(BoardError::SingularHomography);
        }
        let matrix = matrix / scale;
        if matrix.determinant().abs() < 1e-12 {
            return Err(BoardError::SingularHomography);
        }

        Ok(Self::new(matrix))
    }

    /// Map a single point
    pub fn apply(&self, p: &Point2<f64>) -> Point2<f64> {
        let (x, y) = transform_point(&self.matrix, p.x, p.y);
        Point2::new(x, y)
    }

    /// Map a batch of points
    pub fn apply_points(&self, points: &[Point2<f64>]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.apply(p)).collect()
    }

    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(Self::new)
    }
}

/// Transform a point given in homogeneous form `(x, y, 1)`
pub fn transform_point(matrix: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    let p = matrix * Vector3::new(x, y, 1.0);
    (p.x / p.z, p.y / p.z)
}

fn has_collinear_triple(pts: &[Point2<f64>; 4]) -> bool {
    let scale = pts
        .iter()
        .flat_map(|p| [p.x.abs(), p.y.abs()])
        .fold(1.0, f64::max);
    let tolerance = 1e-9 * scale * scale;
    for (i, j, k) in [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)] {
        let ab = pts[j] - pts[i];
        let ac = pts[k] - pts[i];
        if (ab.x * ac.y - ab.y * ac.x).abs() <= tolerance {
            return true;
        }
    }
    false
}

/// Translate to the centroid and scale so the mean distance is √2
fn normalize_points(pts: &[Point2<f64>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;
    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let t = Matrix3::new(
        s, 0.0, -s * cx, //
        0.0, s, -s * cy, //
        0.0, 0.0, 1.0,
    );
    let out = pts.map(|p| {
        let (x, y) = transform_point(&t, p.x, p.y);
        Point2::new(x, y)
    });
    (out, t)
}
