//! 3x3 homogeneous transform mapping frame pixels into mosaic space.

use glam::{DVec2, DVec3};
use std::ops::Mul;

/// Homogeneous `w` below this magnitude is treated as a point at infinity.
pub const MIN_HOMOGENEOUS_W: f64 = 1e-9;

/// Determinants below this magnitude make a transform singular.
const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Row-major 3x3 matrix acting on column vectors `(x, y, 1)`.
///
/// ```text
/// | a  b  tx |
/// | c  d  ty |
/// | g  h  w  |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DMat3 {
    rows: [DVec3; 3],
}

impl DMat3 {
    /// Build from nine values in row-major order.
    #[inline]
    pub const fn from_array(m: [f64; 9]) -> Self {
        Self::from_rows([m[0], m[1], m[2]], [m[3], m[4], m[5]], [m[6], m[7], m[8]])
    }

    #[inline]
    pub const fn from_rows(r0: [f64; 3], r1: [f64; 3], r2: [f64; 3]) -> Self {
        Self {
            rows: [
                DVec3::new(r0[0], r0[1], r0[2]),
                DVec3::new(r1[0], r1[1], r1[2]),
                DVec3::new(r2[0], r2[1], r2[2]),
            ],
        }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::translation(DVec2::ZERO)
    }

    #[inline]
    pub const fn translation(t: DVec2) -> Self {
        Self::from_rows([1.0, 0.0, t.x], [0.0, 1.0, t.y], [0.0, 0.0, 1.0])
    }

    /// Rotation by `angle` radians about the origin, then translation by `t`.
    pub fn euclidean(t: DVec2, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_rows([cos, -sin, t.x], [sin, cos, t.y], [0.0, 0.0, 1.0])
    }

    /// Element at `row`, `col`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    #[inline]
    fn column(&self, col: usize) -> DVec3 {
        DVec3::new(self.rows[0][col], self.rows[1][col], self.rows[2][col])
    }

    pub fn determinant(&self) -> f64 {
        let [r0, r1, r2] = self.rows;
        r0.dot(r1.cross(r2))
    }

    /// Inverse via the adjugate, `None` for singular or non-finite matrices.
    pub fn inverse(&self) -> Option<DMat3> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
            return None;
        }
        let [r0, r1, r2] = self.rows;
        // Columns of the inverse are the cross products of row pairs.
        let (c0, c1, c2) = (r1.cross(r2) / det, r2.cross(r0) / det, r0.cross(r1) / det);
        Some(Self {
            rows: [
                DVec3::new(c0.x, c1.x, c2.x),
                DVec3::new(c0.y, c1.y, c2.y),
                DVec3::new(c0.z, c1.z, c2.z),
            ],
        })
    }

    /// Scaled so the bottom-right element is 1. Left unchanged when it is 0.
    pub fn normalized(&self) -> DMat3 {
        let w = self.rows[2].z;
        if w == 0.0 {
            return *self;
        }
        Self {
            rows: self.rows.map(|r| r / w),
        }
    }

    /// Project `p` through the matrix and divide by `w`.
    ///
    /// `None` when `|w|` is below [`MIN_HOMOGENEOUS_W`] or the result is not finite.
    #[inline]
    pub fn try_transform_point(&self, p: DVec2) -> Option<DVec2> {
        let v = p.extend(1.0);
        let w = self.rows[2].dot(v);
        if w.abs() < MIN_HOMOGENEOUS_W {
            return None;
        }
        let out = DVec2::new(self.rows[0].dot(v), self.rows[1].dot(v)) / w;
        out.is_finite().then_some(out)
    }
}

impl Default for DMat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for DMat3 {
    type Output = DMat3;

    fn mul(self, rhs: DMat3) -> DMat3 {
        let cols = [rhs.column(0), rhs.column(1), rhs.column(2)];
        Self {
            rows: self
                .rows
                .map(|r| DVec3::new(r.dot(cols[0]), r.dot(cols[1]), r.dot(cols[2]))),
        }
    }
}
