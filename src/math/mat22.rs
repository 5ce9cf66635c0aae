use std::ops::{Add, Mul};

use super::vec2::Vec2;

/// A column-major 2x2 matrix, used for body rotation frames and the joint's
/// effective-mass solve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mat22 {
    pub col1: Vec2,
    pub col2: Vec2,
}

impl Mat22 {
    /// Creates a new matrix from its two columns.
    pub const fn new(col1: Vec2, col2: Vec2) -> Self {
        Self { col1, col2 }
    }

    /// Builds the rotation matrix for the given angle (in radians).
    pub fn from_angle(angle: f64) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            col1: Vec2::new(c, s),
            col2: Vec2::new(-s, c),
        }
    }

    /// Returns the transpose. For a rotation matrix this is its inverse.
    pub fn transpose(self) -> Self {
        Self {
            col1: Vec2::new(self.col1.x, self.col2.x),
            col2: Vec2::new(self.col1.y, self.col2.y),
        }
    }

    /// Returns the inverse. A degenerate (zero-determinant) matrix is a
    /// caller error; the zero matrix is returned instead of dividing by zero.
    pub fn invert(self) -> Self {
        let a = self.col1.x;
        let b = self.col2.x;
        let c = self.col1.y;
        let d = self.col2.y;

        let det = a * d - b * c;
        if det == 0.0 {
            return Self::default();
        }
        let inv_det = 1.0 / det;
        Self {
            col1: Vec2::new(inv_det * d, -inv_det * c),
            col2: Vec2::new(-inv_det * b, inv_det * a),
        }
    }

    /// Returns the component-wise absolute value.
    pub fn abs(self) -> Self {
        Self {
            col1: self.col1.abs(),
            col2: self.col2.abs(),
        }
    }
}

impl Mul<Vec2> for Mat22 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.col1.x * v.x + self.col2.x * v.y,
            self.col1.y * v.x + self.col2.y * v.y,
        )
    }
}

impl Mul<Mat22> for Mat22 {
    type Output = Mat22;

    fn mul(self, other: Mat22) -> Mat22 {
        Mat22::new(self * other.col1, self * other.col2)
    }
}

impl Add for Mat22 {
    type Output = Mat22;

    fn add(self, other: Mat22) -> Mat22 {
        Mat22::new(self.col1 + other.col1, self.col2 + other.col2)
    }
}
