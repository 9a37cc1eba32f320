// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 projective transform.
//!
//! This type covers the transform queries the property trees and the
//! projective mapper need (identity/translation/scale fast paths,
//! perspective detection, 3-D→2-D flattening, inversion) without pulling in
//! a full linear-algebra crate.

use core::ops::Mul;
use kurbo::Vec2;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 projective transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// used by GPU APIs and Core Animation's `CATransform3D`. Element `(row, col)`
/// is `cols[col][row]`; the translation lives in `cols[3]` and the perspective
/// components in `cols[_][3]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns the columns as a 2-D array.
    #[inline]
    #[must_use]
    pub const fn to_cols_array_2d(self) -> [[f64; 4]; 4] {
        self.cols
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the X axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Y axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_y(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a standard perspective projection with the given depth.
    ///
    /// Maps `z` into the `w` component as `w = 1 - z / depth`, so points at
    /// `z >= depth` end up behind the camera (`w <= 0`) and must be clipped.
    #[inline]
    #[must_use]
    pub fn from_perspective_depth(depth: f64) -> Self {
        if depth == 0.0 {
            return Self::IDENTITY;
        }
        let mut t = Self::IDENTITY;
        t.cols[2][3] = -1.0 / depth;
        t
    }

    /// Applies this transform to a homogeneous column vector.
    #[inline]
    #[must_use]
    pub fn apply(&self, v: [f64; 4]) -> [f64; 4] {
        let c = &self.cols;
        let mut out = [0.0; 4];
        let mut i = 0;
        while i < 4 {
            out[i] = c[0][i] * v[0] + c[1][i] * v[1] + c[2][i] * v[2] + c[3][i] * v[3];
            i += 1;
        }
        out
    }

    /// Returns the x/y translation components.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.cols[3][0], self.cols[3][1])
    }

    /// Post-composes a translation: `self = translate(v) * self`.
    ///
    /// The translation is applied in the transform's *output* space.
    pub fn post_translate(&mut self, v: Vec2) {
        for col in &mut self.cols {
            col[0] += v.x * col[3];
            col[1] += v.y * col[3];
        }
    }

    /// Pre-composes a translation: `self = self * translate(v)`.
    ///
    /// The translation is applied in the transform's *input* space.
    pub fn pre_translate(&mut self, v: Vec2) {
        let c0 = self.cols[0];
        let c1 = self.cols[1];
        let mut i = 0;
        while i < 4 {
            self.cols[3][i] += c0[i] * v.x + c1[i] * v.y;
            i += 1;
        }
    }

    /// Is this exactly the identity matrix?
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Is this the identity, modulo a translation?
    #[must_use]
    pub fn is_identity_or_translation(&self) -> bool {
        let c = &self.cols;
        c[0] == [1.0, 0.0, 0.0, 0.0]
            && c[1] == [0.0, 1.0, 0.0, 0.0]
            && c[2] == [0.0, 0.0, 1.0, 0.0]
            && c[3][3] == 1.0
    }

    /// Is this the identity, modulo an integer translation?
    #[must_use]
    pub fn is_identity_or_integer_translation(&self) -> bool {
        if !self.is_identity_or_translation() {
            return false;
        }
        let t = &self.cols[3];
        t[0] == t[0].round() && t[1] == t[1].round() && t[2] == t[2].round()
    }

    /// Does this transform consist of only axis-aligned scale and translation?
    #[must_use]
    pub fn is_scale_or_translation(&self) -> bool {
        let c = &self.cols;
        c[0][1] == 0.0
            && c[0][2] == 0.0
            && c[0][3] == 0.0
            && c[1][0] == 0.0
            && c[1][2] == 0.0
            && c[1][3] == 0.0
            && c[2][0] == 0.0
            && c[2][1] == 0.0
            && c[2][3] == 0.0
            && c[3][3] == 1.0
    }

    /// Does this transform map axis-aligned rects to axis-aligned rects?
    ///
    /// True for scales, translations, and rotations by multiples of 90°.
    #[must_use]
    pub fn preserves_2d_axis_alignment(&self) -> bool {
        if self.has_perspective() {
            return false;
        }
        let c = &self.cols;
        let (m00, m01) = (c[0][0], c[1][0]);
        let (m10, m11) = (c[0][1], c[1][1]);
        // Each output axis must be fed by exactly one input axis.
        (m01 == 0.0 && m10 == 0.0) || (m00 == 0.0 && m11 == 0.0)
    }

    /// Does this transform have a perspective component?
    #[inline]
    #[must_use]
    pub fn has_perspective(&self) -> bool {
        let c = &self.cols;
        c[0][3] != 0.0 || c[1][3] != 0.0 || c[2][3] != 0.0 || c[3][3] != 1.0
    }

    /// Is this transform flat (does not move or consume the z coordinate)?
    #[must_use]
    pub fn is_flat(&self) -> bool {
        let c = &self.cols;
        c[0][2] == 0.0
            && c[1][2] == 0.0
            && c[2][0] == 0.0
            && c[2][1] == 0.0
            && c[2][2] == 1.0
            && c[2][3] == 0.0
            && c[3][2] == 0.0
    }

    /// Flattens the transform to 2-D by resetting its z row and column.
    ///
    /// After flattening, `is_flat` holds and z passes through unchanged.
    pub fn flatten_to_2d(&mut self) {
        self.cols[0][2] = 0.0;
        self.cols[1][2] = 0.0;
        self.cols[2] = [0.0, 0.0, 1.0, 0.0];
        self.cols[3][2] = 0.0;
    }

    /// Rounds the x/y translation components to the nearest integer.
    pub fn round_translation_components(&mut self) {
        self.cols[3][0] = self.cols[3][0].round();
        self.cols[3][1] = self.cols[3][1].round();
    }

    /// Computes the determinant.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let m = &self.cols;
        let s0 = m[0][0] * m[1][1] - m[1][0] * m[0][1];
        let s1 = m[0][0] * m[1][2] - m[1][0] * m[0][2];
        let s2 = m[0][0] * m[1][3] - m[1][0] * m[0][3];
        let s3 = m[0][1] * m[1][2] - m[1][1] * m[0][2];
        let s4 = m[0][1] * m[1][3] - m[1][1] * m[0][3];
        let s5 = m[0][2] * m[1][3] - m[1][2] * m[0][3];

        let c5 = m[2][2] * m[3][3] - m[3][2] * m[2][3];
        let c4 = m[2][1] * m[3][3] - m[3][1] * m[2][3];
        let c3 = m[2][1] * m[3][2] - m[3][1] * m[2][2];
        let c2 = m[2][0] * m[3][3] - m[3][0] * m[2][3];
        let c1 = m[2][0] * m[3][2] - m[3][0] * m[2][2];
        let c0 = m[2][0] * m[3][1] - m[3][0] * m[2][1];

        s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0
    }

    /// Computes the inverse, or `None` if the transform is singular or
    /// non-finite.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let m = &self.cols;
        let s0 = m[0][0] * m[1][1] - m[1][0] * m[0][1];
        let s1 = m[0][0] * m[1][2] - m[1][0] * m[0][2];
        let s2 = m[0][0] * m[1][3] - m[1][0] * m[0][3];
        let s3 = m[0][1] * m[1][2] - m[1][1] * m[0][2];
        let s4 = m[0][1] * m[1][3] - m[1][1] * m[0][3];
        let s5 = m[0][2] * m[1][3] - m[1][2] * m[0][3];

        let c5 = m[2][2] * m[3][3] - m[3][2] * m[2][3];
        let c4 = m[2][1] * m[3][3] - m[3][1] * m[2][3];
        let c3 = m[2][1] * m[3][2] - m[3][1] * m[2][2];
        let c2 = m[2][0] * m[3][3] - m[3][0] * m[2][3];
        let c1 = m[2][0] * m[3][2] - m[3][0] * m[2][2];
        let c0 = m[2][0] * m[3][1] - m[3][0] * m[2][1];

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;

        let cols = [
            [
                (m[1][1] * c5 - m[1][2] * c4 + m[1][3] * c3) * inv_det,
                (-m[0][1] * c5 + m[0][2] * c4 - m[0][3] * c3) * inv_det,
                (m[3][1] * s5 - m[3][2] * s4 + m[3][3] * s3) * inv_det,
                (-m[2][1] * s5 + m[2][2] * s4 - m[2][3] * s3) * inv_det,
            ],
            [
                (-m[1][0] * c5 + m[1][2] * c2 - m[1][3] * c1) * inv_det,
                (m[0][0] * c5 - m[0][2] * c2 + m[0][3] * c1) * inv_det,
                (-m[3][0] * s5 + m[3][2] * s2 - m[3][3] * s1) * inv_det,
                (m[2][0] * s5 - m[2][2] * s2 + m[2][3] * s1) * inv_det,
            ],
            [
                (m[1][0] * c4 - m[1][1] * c2 + m[1][3] * c0) * inv_det,
                (-m[0][0] * c4 + m[0][1] * c2 - m[0][3] * c0) * inv_det,
                (m[3][0] * s4 - m[3][1] * s2 + m[3][3] * s0) * inv_det,
                (-m[2][0] * s4 + m[2][1] * s2 - m[2][3] * s0) * inv_det,
            ],
            [
                (-m[1][0] * c3 + m[1][1] * c1 - m[1][2] * c0) * inv_det,
                (m[0][0] * c3 - m[0][1] * c1 + m[0][2] * c0) * inv_det,
                (-m[3][0] * s3 + m[3][1] * s1 - m[3][2] * s0) * inv_det,
                (m[2][0] * s3 - m[2][1] * s1 + m[2][2] * s0) * inv_det,
            ],
        ];
        let result = Self { cols };
        if result.is_finite() { Some(result) } else { None }
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        let c = &self.cols;
        c[0][0].is_finite()
            && c[0][1].is_finite()
            && c[0][2].is_finite()
            && c[0][3].is_finite()
            && c[1][0].is_finite()
            && c[1][1].is_finite()
            && c[1][2].is_finite()
            && c[1][3].is_finite()
            && c[2][0].is_finite()
            && c[2][1].is_finite()
            && c[2][2].is_finite()
            && c[2][3].is_finite()
            && c[3][0].is_finite()
            && c[3][1].is_finite()
            && c[3][2].is_finite()
            && c[3][3].is_finite()
    }

    /// Is this transform [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub const fn is_nan(&self) -> bool {
        let c = &self.cols;
        c[0][0].is_nan()
            || c[0][1].is_nan()
            || c[0][2].is_nan()
            || c[0][3].is_nan()
            || c[1][0].is_nan()
            || c[1][1].is_nan()
            || c[1][2].is_nan()
            || c[1][3].is_nan()
            || c[2][0].is_nan()
            || c[2][1].is_nan()
            || c[2][2].is_nan()
            || c[2][3].is_nan()
            || c[3][0].is_nan()
            || c[3][1].is_nan()
            || c[3][2].is_nan()
            || c[3][3].is_nan()
    }
}

#[cfg(feature = "std")]
#[inline]
fn sin_cos(radians: f64) -> (f64, f64) {
    radians.sin_cos()
}

#[cfg(not(feature = "std"))]
#[inline]
fn sin_cos(radians: f64) -> (f64, f64) {
    (radians.sin(), radians.cos())
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Transform3d, b: Transform3d, eps: f64) -> bool {
        for j in 0..4 {
            for i in 0..4 {
                if (a.cols[j][i] - b.cols[j][i]).abs() > eps {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn translation_composition() {
        let a = Transform3d::from_translation(1.0, 0.0, 0.0);
        let b = Transform3d::from_translation(0.0, 2.0, 0.0);
        let c = a * b;
        // Combined translation should be (1, 2, 0).
        let col3 = c.col(3);
        assert_eq!(col3, [1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn scale_then_translate() {
        let s = Transform3d::from_scale(2.0, 2.0, 2.0);
        let t = Transform3d::from_translation(3.0, 4.0, 0.0);
        // Scale first, then translate: T * S
        let combined = t * s;
        assert_eq!(combined.col(0), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(combined.col(3), [3.0, 4.0, 0.0, 1.0]);
    }

    #[test]
    fn rotation_z_ninety_degrees() {
        let r = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        // cos=0, sin=1 for +90deg.
        let eps = 1e-6;
        assert!((r.col(0)[0] - 0.0).abs() < eps);
        assert!((r.col(0)[1] - 1.0).abs() < eps);
        assert!((r.col(1)[0] + 1.0).abs() < eps);
        assert!((r.col(1)[1] - 0.0).abs() < eps);
    }

    #[test]
    fn apply_maps_points() {
        let t = Transform3d::from_translation(10.0, 20.0, 0.0);
        let out = t.apply([1.0, 2.0, 0.0, 1.0]);
        assert_eq!(out, [11.0, 22.0, 0.0, 1.0]);
    }

    #[test]
    fn pre_and_post_translate() {
        let mut pre = Transform3d::from_scale(2.0, 2.0, 1.0);
        pre.pre_translate(Vec2::new(3.0, 4.0));
        // Scale applied after translation: point (0,0) -> (6,8).
        assert_eq!(pre.apply([0.0, 0.0, 0.0, 1.0]), [6.0, 8.0, 0.0, 1.0]);

        let mut post = Transform3d::from_scale(2.0, 2.0, 1.0);
        post.post_translate(Vec2::new(3.0, 4.0));
        // Translation applied after scale: point (1,1) -> (5,6).
        assert_eq!(post.apply([1.0, 1.0, 0.0, 1.0]), [5.0, 6.0, 0.0, 1.0]);
    }

    #[test]
    fn identity_or_translation_predicates() {
        assert!(Transform3d::IDENTITY.is_identity_or_translation());
        assert!(Transform3d::from_translation(1.5, 2.0, 0.0).is_identity_or_translation());
        assert!(!Transform3d::from_translation(1.5, 2.0, 0.0).is_identity_or_integer_translation());
        assert!(Transform3d::from_translation(1.0, -2.0, 3.0).is_identity_or_integer_translation());
        assert!(!Transform3d::from_scale(2.0, 1.0, 1.0).is_identity_or_translation());
    }

    #[test]
    fn scale_or_translation_predicate() {
        assert!(Transform3d::from_scale(2.0, 3.0, 1.0).is_scale_or_translation());
        assert!(Transform3d::from_translation(1.0, 2.0, 3.0).is_scale_or_translation());
        assert!(
            (Transform3d::from_translation(1.0, 0.0, 0.0) * Transform3d::from_scale(2.0, 2.0, 1.0))
                .is_scale_or_translation()
        );
        assert!(!Transform3d::from_rotation_z(0.3).is_scale_or_translation());
    }

    #[test]
    fn axis_alignment_preserved_by_quarter_turns() {
        assert!(Transform3d::IDENTITY.preserves_2d_axis_alignment());
        assert!(Transform3d::from_scale(3.0, -2.0, 1.0).preserves_2d_axis_alignment());
        // Exact zeros only appear with an exactly-constructed quarter turn.
        let mut exact = Transform3d::IDENTITY;
        exact.cols[0] = [0.0, 1.0, 0.0, 0.0];
        exact.cols[1] = [-1.0, 0.0, 0.0, 0.0];
        assert!(exact.preserves_2d_axis_alignment());
        assert!(!Transform3d::from_rotation_z(0.25).preserves_2d_axis_alignment());
    }

    #[test]
    fn perspective_detection() {
        assert!(!Transform3d::IDENTITY.has_perspective());
        assert!(Transform3d::from_perspective_depth(100.0).has_perspective());
        assert!(!Transform3d::from_perspective_depth(0.0).has_perspective());
    }

    #[test]
    fn flatten_makes_flat() {
        let mut t = Transform3d::from_rotation_x(0.7);
        assert!(!t.is_flat());
        t.flatten_to_2d();
        assert!(t.is_flat());
        // z input no longer influences x/y.
        let out = t.apply([0.0, 1.0, 5.0, 1.0]);
        let flat_out = t.apply([0.0, 1.0, 0.0, 1.0]);
        assert_eq!(out[0], flat_out[0]);
        assert_eq!(out[1], flat_out[1]);
    }

    #[test]
    fn inverse_of_translation() {
        let t = Transform3d::from_translation(5.0, -3.0, 2.0);
        let inv = t.inverse().unwrap();
        assert!(approx_eq(t * inv, Transform3d::IDENTITY, 1e-12));
        assert!(approx_eq(inv * t, Transform3d::IDENTITY, 1e-12));
    }

    #[test]
    fn inverse_of_rotation_scale() {
        let t = Transform3d::from_rotation_z(0.6) * Transform3d::from_scale(2.0, 3.0, 1.0);
        let inv = t.inverse().unwrap();
        assert!(approx_eq(t * inv, Transform3d::IDENTITY, 1e-12));
    }

    #[test]
    fn singular_has_no_inverse() {
        let t = Transform3d::from_scale(0.0, 1.0, 1.0);
        assert!(t.inverse().is_none());
    }

    #[test]
    fn non_finite_has_no_inverse() {
        let mut t = Transform3d::IDENTITY;
        t.cols[1][1] = f64::NAN;
        assert!(t.inverse().is_none());
    }

    #[test]
    fn round_translation() {
        let mut t = Transform3d::from_translation(1.4, 2.6, 0.0);
        t.round_translation_components();
        assert_eq!(t.translation(), Vec2::new(1.0, 3.0));
    }

    #[test]
    fn rotation_x_half_turn_negates_y() {
        let r = Transform3d::from_rotation_x(core::f64::consts::PI);
        let out = r.apply([0.0, 2.0, 0.0, 1.0]);
        let eps = 1e-9;
        assert!((out[1] + 2.0).abs() < eps);
    }

    #[test]
    fn nan_detected() {
        let mut t = Transform3d::IDENTITY;
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
        assert!(t.is_nan());
    }
}
