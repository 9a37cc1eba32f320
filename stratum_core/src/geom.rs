// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain geometric value types shared by the mapper and the property trees.
//!
//! Rects and 2-D points come from [`kurbo`]; this module adds the 3-D point
//! and the four-vertex quad that projective mapping needs. Everything here is
//! `Copy` and passed by value; there is no shared ownership anywhere in the
//! geometry layer.

use kurbo::{Point, Rect};

/// A point in 3-D space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// The origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new 3-D point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Lifts a 2-D point onto the z = 0 plane.
    #[inline]
    #[must_use]
    pub const fn from_point(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: 0.0,
        }
    }

    /// Drops the z coordinate.
    #[inline]
    #[must_use]
    pub const fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A quadrilateral defined by four ordered vertices.
///
/// Vertex order is meaningful: mapping preserves it, and the clipping walk in
/// the mapper relies on `p1 → p2 → p3 → p4 → p1` tracing the boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quad {
    /// First vertex.
    pub p1: Point,
    /// Second vertex.
    pub p2: Point,
    /// Third vertex.
    pub p3: Point,
    /// Fourth vertex.
    pub p4: Point,
}

impl Quad {
    /// Creates a quad from four vertices.
    #[inline]
    #[must_use]
    pub const fn new(p1: Point, p2: Point, p3: Point, p4: Point) -> Self {
        Self { p1, p2, p3, p4 }
    }

    /// Creates a quad from the corners of a rect, in counter-clockwise order
    /// starting at the origin corner.
    #[must_use]
    pub fn from_rect(r: Rect) -> Self {
        Self {
            p1: Point::new(r.x0, r.y0),
            p2: Point::new(r.x1, r.y0),
            p3: Point::new(r.x1, r.y1),
            p4: Point::new(r.x0, r.y1),
        }
    }

    /// Returns the vertices in order.
    #[inline]
    #[must_use]
    pub const fn points(&self) -> [Point; 4] {
        [self.p1, self.p2, self.p3, self.p4]
    }

    /// Returns the smallest axis-aligned rect containing all four vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        let xs = [self.p1.x, self.p2.x, self.p3.x, self.p4.x];
        let ys = [self.p1.y, self.p2.y, self.p3.y, self.p4.y];
        let mut x0 = xs[0];
        let mut x1 = xs[0];
        let mut y0 = ys[0];
        let mut y1 = ys[0];
        for i in 1..4 {
            x0 = x0.min(xs[i]);
            x1 = x1.max(xs[i]);
            y0 = y0.min(ys[i]);
            y1 = y1.max(ys[i]);
        }
        Rect::new(x0, y0, x1, y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_from_rect_round_trips_through_bounding_box() {
        let r = Rect::new(1.0, 2.0, 4.0, 6.0);
        let q = Quad::from_rect(r);
        assert_eq!(q.bounding_box(), r);
    }

    #[test]
    fn bounding_box_of_rotated_points() {
        let q = Quad::new(
            Point::new(0.0, -1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
        );
        assert_eq!(q.bounding_box(), Rect::new(-1.0, -1.0, 1.0, 1.0));
    }

    #[test]
    fn points_preserve_vertex_order() {
        let q = Quad::from_rect(Rect::new(0.0, 0.0, 2.0, 3.0));
        assert_eq!(q.points(), [q.p1, q.p2, q.p3, q.p4]);
        // The boundary walk in the mapper depends on this exact ordering.
        assert_eq!(q.points()[1], Point::new(2.0, 0.0));
    }

    #[test]
    fn point3_lifts_and_drops() {
        let p = Point::new(3.0, 4.0);
        let p3 = Point3::from_point(p);
        assert_eq!(p3.z, 0.0);
        assert_eq!(p3.to_point(), p);
    }
}
