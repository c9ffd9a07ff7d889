//! 3x3 matrix type for 2D affine transforms.
//!
//! # Convention
//!
//! Matrices are stored in **row-major** order and use **column vectors**
//! with homogeneous coordinates. The translation sits in the last column:
//!
//! ```text
//! | a  b  tx |   | x |   | a*x + b*y + tx |
//! | c  d  ty | * | y | = | c*x + d*y + ty |
//! | 0  0  1  |   | 1 |   |       1        |
//! ```
//!
//! A product `B * A` applies `A` first.
//!
//! # Usage
//!
//! ```rust
//! use opchain_math::Mat3;
//! use glam::DVec2;
//!
//! let m = Mat3::translation(10.0, 0.0) * Mat3::scaling(2.0, 2.0);
//! assert_eq!(m.transform_point(DVec2::new(1.0, 1.0)), DVec2::new(12.0, 2.0));
//! ```

use std::ops::{Index, Mul};

use glam::{DMat3, DVec2};
use opchain_core::{Error, Result};

/// A 3x3 matrix of `f64`.
///
/// Stored in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    /// Matrix elements in row-major order: [row0, row1, row2]
    pub m: [[f64; 3]; 3],
}

impl Mat3 {
    /// Zero matrix.
    pub const ZERO: Self = Self { m: [[0.0; 3]; 3] };

    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Creates a matrix from row arrays.
    #[inline]
    pub const fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self { m: rows }
    }

    /// Creates a matrix from dynamically sized rows.
    ///
    /// Fails with [`Error::IncompatibleDimensionality`] unless the input
    /// is exactly 3x3.
    pub fn try_from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.len() != 3 || rows.iter().any(|r| r.len() != 3) {
            return Err(Error::dimensionality(rows.len(), cols));
        }
        let mut m = Self::ZERO;
        for (i, row) in rows.iter().enumerate() {
            m.m[i].copy_from_slice(row);
        }
        Ok(m)
    }

    /// Creates a matrix from nine row-major values.
    pub fn try_from_flat(values: &[f64]) -> Result<Self> {
        if values.len() != 9 {
            // report square inputs (e.g. a flattened 4x4) by their rank
            let n = (values.len() as f64).sqrt() as usize;
            return Err(if n * n == values.len() {
                Error::dimensionality(n, n)
            } else {
                Error::dimensionality(1, values.len())
            });
        }
        Ok(Self::from_rows([
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5]],
            [values[6], values[7], values[8]],
        ]))
    }

    /// Translation by `(tx, ty)`.
    #[inline]
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::from_rows([[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]])
    }

    /// Non-uniform scale about the origin.
    #[inline]
    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self::from_rows([[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Counter-clockwise rotation by `degrees` about the origin.
    pub fn rotation_degrees(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::from_rows([[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Horizontal shear: `x' = x + tan(degrees) * y`.
    pub fn skew_x_degrees(degrees: f64) -> Self {
        let t = degrees.to_radians().tan();
        Self::from_rows([[1.0, t, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Vertical shear: `y' = y + tan(degrees) * x`.
    pub fn skew_y_degrees(degrees: f64) -> Self {
        let t = degrees.to_radians().tan();
        Self::from_rows([[1.0, 0.0, 0.0], [t, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Returns the transpose of this matrix.
    #[inline]
    pub fn transpose(&self) -> Self {
        let m = &self.m;
        Self::from_rows([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    /// Computes the determinant.
    #[inline]
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Computes the inverse of this matrix.
    ///
    /// Returns `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            return None;
        }

        let m = &self.m;
        let inv_det = 1.0 / det;

        // Cofactor matrix, transposed and scaled by 1/det
        Some(Self::from_rows([
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
            ],
        ]))
    }

    /// Multiplies two matrices.
    #[inline]
    pub fn mul_mat(&self, other: &Self) -> Self {
        let mut result = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                result.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j];
            }
        }
        result
    }

    /// Maps a point through this matrix, dividing by `w` when the bottom
    /// row is projective.
    pub fn transform_point(&self, p: DVec2) -> DVec2 {
        let m = &self.m;
        let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
        let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        if w == 1.0 || w == 0.0 {
            DVec2::new(x, y)
        } else {
            DVec2::new(x / w, y / w)
        }
    }

    /// Returns true if the bottom row is `[0, 0, 1]`.
    pub fn is_affine(&self) -> bool {
        self.m[2] == [0.0, 0.0, 1.0]
    }

    /// Returns true if all elements are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|x| x.is_finite())
    }

    /// Elements in row-major order.
    pub fn to_flat(&self) -> [f64; 9] {
        let m = &self.m;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ]
    }

    /// Converts to glam `DMat3` (column-major).
    #[inline]
    pub fn to_glam(&self) -> DMat3 {
        DMat3::from_cols_array_2d(&self.transpose().m)
    }

    /// Creates from glam `DMat3`.
    #[inline]
    pub fn from_glam(m: DMat3) -> Self {
        Self::from_rows(m.to_cols_array_2d()).transpose()
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// Mat3 * Mat3
impl Mul for Mat3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.mul_mat(&rhs)
    }
}

impl Index<usize> for Mat3 {
    type Output = [f64; 3];

    #[inline]
    fn index(&self, i: usize) -> &[f64; 3] {
        &self.m[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_mat_eq(a: &Mat3, b: &Mat3) {
        for (x, y) in a.to_flat().iter().zip(b.to_flat().iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_identity_mul() {
        let m = Mat3::translation(3.0, 4.0) * Mat3::scaling(2.0, 5.0);
        assert_eq!(Mat3::IDENTITY * m, m);
        assert_eq!(m * Mat3::IDENTITY, m);
    }

    #[test]
    fn test_order_applies_right_first() {
        // scale then translate
        let m = Mat3::translation(10.0, 20.0) * Mat3::scaling(2.0, 2.0);
        let p = m.transform_point(DVec2::new(1.0, 1.0));
        assert_eq!(p, DVec2::new(12.0, 22.0));
    }

    #[test]
    fn test_rotation() {
        let m = Mat3::rotation_degrees(90.0);
        let p = m.transform_point(DVec2::new(1.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse() {
        let m = Mat3::translation(5.0, -3.0) * Mat3::rotation_degrees(30.0) * Mat3::scaling(2.0, 0.5);
        let inv = m.inverse().unwrap();
        assert_mat_eq(&(m * inv), &Mat3::IDENTITY);
        assert!(Mat3::scaling(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_try_from_rows() {
        let m = Mat3::try_from_rows(&[
            vec![1.0, 0.0, 5.0],
            vec![0.0, 1.0, 6.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        assert_eq!(m, Mat3::translation(5.0, 6.0));

        let err = Mat3::try_from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, Error::IncompatibleDimensionality { rows: 2, cols: 2 }));

        let ragged = Mat3::try_from_rows(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0, 1.0]]);
        assert!(ragged.is_err());
    }

    #[test]
    fn test_try_from_flat() {
        let m = Mat3::try_from_flat(&[2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(m, Mat3::scaling(2.0, 2.0));
        assert!(Mat3::try_from_flat(&[1.0; 16]).is_err());
    }

    #[test]
    fn test_glam_roundtrip() {
        let m = Mat3::translation(7.0, 8.0) * Mat3::rotation_degrees(12.5);
        let g = m.to_glam();
        let p = g.transform_point2(DVec2::new(3.0, 4.0));
        let q = m.transform_point(DVec2::new(3.0, 4.0));
        assert_relative_eq!(p.x, q.x, epsilon = 1e-12);
        assert_relative_eq!(p.y, q.y, epsilon = 1e-12);
        assert_eq!(Mat3::from_glam(g), m);
    }

    #[test]
    fn test_skew() {
        let m = Mat3::skew_x_degrees(45.0);
        let p = m.transform_point(DVec2::new(0.0, 2.0));
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
    }
}
