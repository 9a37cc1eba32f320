// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Homogeneous (projective) points.
//!
//! A [`HomogeneousPoint`] is the result of pushing a point through a 4×4
//! projective transform before the perspective divide. The `w` component
//! carries the clip state: anything with `w <= 0` lies at or behind the
//! camera plane and must be clipped before conversion to cartesian
//! coordinates.

use kurbo::Point;

use crate::geom::Point3;

/// A 4-component projective point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HomogeneousPoint {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
    /// Homogeneous weight. `w <= 0` means the point must be clipped.
    pub w: f64,
}

impl HomogeneousPoint {
    /// Creates a homogeneous point from raw components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Lifts a 2-D point with `z = 0`, `w = 1`.
    #[inline]
    #[must_use]
    pub const fn from_point(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: 0.0,
            w: 1.0,
        }
    }

    /// Wraps a `[x, y, z, w]` vector as produced by
    /// [`Transform3d::apply`](crate::transform::Transform3d::apply).
    #[inline]
    #[must_use]
    pub const fn from_vec4(v: [f64; 4]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
            w: v[3],
        }
    }

    /// Is this point at or behind the camera plane?
    #[inline]
    #[must_use]
    pub fn should_be_clipped(&self) -> bool {
        self.w <= 0.0
    }

    /// Converts to a 2-D cartesian point by the perspective divide.
    ///
    /// Callers must ensure `w != 0`; the mapper's entry points substitute a
    /// zero point instead of calling this with `w == 0`.
    #[must_use]
    pub fn cartesian_point2d(&self) -> Point {
        if self.w == 1.0 {
            return Point::new(self.x, self.y);
        }
        let inv_w = 1.0 / self.w;
        Point::new(self.x * inv_w, self.y * inv_w)
    }

    /// Converts to a 3-D cartesian point by the perspective divide.
    ///
    /// Callers must ensure `w != 0`.
    #[must_use]
    pub fn cartesian_point3d(&self) -> Point3 {
        if self.w == 1.0 {
            return Point3::new(self.x, self.y, self.z);
        }
        let inv_w = 1.0 / self.w;
        Point3::new(self.x * inv_w, self.y * inv_w, self.z * inv_w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_test_is_w_nonpositive() {
        assert!(!HomogeneousPoint::new(0.0, 0.0, 0.0, 1.0).should_be_clipped());
        assert!(HomogeneousPoint::new(0.0, 0.0, 0.0, 0.0).should_be_clipped());
        assert!(HomogeneousPoint::new(5.0, 5.0, 0.0, -1.0).should_be_clipped());
    }

    #[test]
    fn cartesian_divides_by_w() {
        let h = HomogeneousPoint::new(10.0, 20.0, 30.0, 2.0);
        assert_eq!(h.cartesian_point2d(), Point::new(5.0, 10.0));
        assert_eq!(h.cartesian_point3d(), Point3::new(5.0, 10.0, 15.0));
    }

    #[test]
    fn w_one_fast_path() {
        let h = HomogeneousPoint::from_point(Point::new(3.0, 4.0));
        assert_eq!(h.cartesian_point2d(), Point::new(3.0, 4.0));
    }
}
