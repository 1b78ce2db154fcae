use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A position or offset in format-native length units (LDU).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

/// A 3x3 orientation matrix stored in row-major order.
///
/// Placement lines carry the nine entries `a b c d e f g h i` in exactly this
/// order, so `rows[0]` is `a b c`. The matrix need not be a pure rotation;
/// shear and scale are legal as long as it stays invertible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    pub rows: [[f64; 3]; 3],
}

impl Mat3 {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
    };

    /// Quarter turn about +Y. Literal entries, no trigonometry.
    #[rustfmt::skip]
    pub const ROT_Y_90: Self = Self {
        rows: [
            [ 0.0, 0.0, 1.0],
            [ 0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
        ],
    };

    /// Quarter turn about +X. Literal entries, no trigonometry.
    #[rustfmt::skip]
    pub const ROT_X_90: Self = Self {
        rows: [
            [1.0, 0.0,  0.0],
            [0.0, 0.0, -1.0],
            [0.0, 1.0,  0.0],
        ],
    };

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Build from nine row-major entries.
    pub fn from_entries(e: [f64; 9]) -> Self {
        Self {
            rows: [[e[0], e[1], e[2]], [e[3], e[4], e[5]], [e[6], e[7], e[8]]],
        }
    }

    /// The nine entries in row-major order.
    pub fn entries(&self) -> [f64; 9] {
        let r = &self.rows;
        [
            r[0][0], r[0][1], r[0][2], r[1][0], r[1][1], r[1][2], r[2][0], r[2][1], r[2][2],
        ]
    }

    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_rows([[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, sz]])
    }

    /// Compose: `self * other` (apply `other` first).
    pub fn mul(&self, other: &Mat3) -> Mat3 {
        let mut rows = [[0.0f64; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
            }
        }
        Mat3 { rows }
    }

    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }

    pub fn transpose(&self) -> Mat3 {
        let r = &self.rows;
        Mat3::from_rows([
            [r[0][0], r[1][0], r[2][0]],
            [r[0][1], r[1][1], r[2][1]],
            [r[0][2], r[1][2], r[2][2]],
        ])
    }

    pub fn determinant(&self) -> f64 {
        let r = &self.rows;
        r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
            - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
            + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0])
    }

    /// True when every entry is finite and the determinant is not (near) zero.
    pub fn is_invertible(&self) -> bool {
        self.entries().iter().all(|e| e.is_finite()) && self.determinant().abs() > 1e-12
    }

    /// `quarter_turns` applications of [`Mat3::ROT_Y_90`]. Negative counts turn the other way.
    pub fn rotation_y_quarter_turns(quarter_turns: i32) -> Mat3 {
        Self::repeat(&Self::ROT_Y_90, quarter_turns)
    }

    /// `quarter_turns` applications of [`Mat3::ROT_X_90`].
    pub fn rotation_x_quarter_turns(quarter_turns: i32) -> Mat3 {
        Self::repeat(&Self::ROT_X_90, quarter_turns)
    }

    fn repeat(step: &Mat3, quarter_turns: i32) -> Mat3 {
        // Four quarter turns are the identity, so -1 becomes 3.
        let n = quarter_turns.rem_euclid(4);
        (0..n).fold(Self::IDENTITY, |acc, _| step.mul(&acc))
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A rigid placement frame: orientation applied first, then translation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub position: Vec3,
    pub orientation: Mat3,
}

impl Frame {
    pub fn new(position: Vec3, orientation: Mat3) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(Vec3::new(x, y, z), Mat3::IDENTITY)
    }

    /// Express a frame given relative to `self` in the parent space.
    pub fn compose(&self, child: &Frame) -> Frame {
        Frame {
            position: self.position + self.orientation.mul_vec(child.position),
            orientation: self.orientation.mul(&child.orientation),
        }
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.position + self.orientation.mul_vec(p)
    }
}
