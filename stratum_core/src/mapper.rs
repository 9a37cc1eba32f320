// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projective point, rect, and quad mapping with near-plane clipping.
//!
//! Pushing geometry through a transform with perspective can move vertices to
//! or behind the camera plane (`w <= 0`). Naively dividing by `w` there
//! produces garbage coordinates, so every mapping operation in this module
//! reports clip state and every divide is preceded by a zero check:
//!
//! - Point and quad mapping returns a `clipped` flag alongside the value.
//!   A clipped quad is still populated; callers must ignore it when the flag
//!   is set.
//! - Rect mapping ([`map_clipped_rect`], [`project_clipped_rect`]) performs
//!   correct near-plane clipping against a small positive-w plane and returns
//!   the minimal enclosing rect of the clipped polygon without materializing
//!   its vertex list.
//! - [`map_clipped_quad`] / [`map_clipped_quad3d`] emit the actual clipped
//!   polygon. Clipping a quad against one plane adds at most one vertex per
//!   edge, so the result has at most 8 vertices.
//!
//! Results are never under-reported: the enclosing rect of a clipped quad
//! always contains the true clipped image.

use kurbo::{Point, Rect, Vec2};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::geom::{Point3, Quad};
use crate::homogeneous::HomogeneousPoint;
use crate::transform::Transform3d;

/// The w value geometry is clipped against.
///
/// Clipping exactly at `w = 0` would put interpolated vertices at infinity
/// after the perspective divide; a small positive plane keeps them finite.
const CLIP_W: f64 = 0.00001;

/// Maps a 3-D point through a transform without the perspective divide.
#[inline]
#[must_use]
pub fn map_homogeneous_point(transform: &Transform3d, p: Point3) -> HomogeneousPoint {
    HomogeneousPoint::from_vec4(transform.apply([p.x, p.y, p.z, 1.0]))
}

/// Projects a 2-D point onto the z = 0 source plane of a transform.
///
/// Finds the z value such that `(x, y, z, 1)` maps onto the destination
/// plane, then maps that point. When the transform's `(2, 2)` element is zero
/// the source plane is perpendicular to the viewing ray (the content is
/// edge-on and invisible); the result is a zero point with `w = 1` so that
/// projecting a rect degenerates to an empty rect at the origin rather than
/// dividing by zero.
#[must_use]
pub fn project_homogeneous_point(transform: &Transform3d, p: Point) -> HomogeneousPoint {
    let c = &transform.cols;
    // m(2, 2) in row/col terms.
    if c[2][2] == 0.0 {
        return HomogeneousPoint::new(0.0, 0.0, 0.0, 1.0);
    }
    let z = -(c[0][2] * p.x + c[1][2] * p.y + c[3][2]) / c[2][2];
    map_homogeneous_point(transform, Point3::new(p.x, p.y, z))
}

/// Converts to cartesian, substituting the origin when `w == 0`.
fn cartesian_or_zero(h: HomogeneousPoint) -> Point {
    if h.w == 0.0 {
        return Point::ZERO;
    }
    h.cartesian_point2d()
}

/// Maps a point through a transform.
///
/// Returns the mapped point and whether it was clipped (`w <= 0`). A clipped
/// point with `w == 0` comes back as the origin instead of dividing by zero;
/// with `w < 0` the (meaningless) divided value is still returned so callers
/// that ignore the flag keep the legacy behavior.
#[must_use]
pub fn map_point(transform: &Transform3d, p: Point) -> (Point, bool) {
    let h = map_homogeneous_point(transform, Point3::from_point(p));
    (cartesian_or_zero(h), h.should_be_clipped())
}

/// Projects a point onto a transform's source plane.
///
/// Same clip contract as [`map_point`].
#[must_use]
pub fn project_point(transform: &Transform3d, p: Point) -> (Point, bool) {
    let h = project_homogeneous_point(transform, p);
    (cartesian_or_zero(h), h.should_be_clipped())
}

/// Maps all four vertices of a quad.
///
/// `clipped` is true if *any* vertex clips. The returned quad is populated
/// even when clipped; callers must ignore it in that case.
#[must_use]
pub fn map_quad(transform: &Transform3d, q: &Quad) -> (Quad, bool) {
    if transform.is_identity_or_translation() {
        let t = transform.translation();
        return (translate_quad(q, t), false);
    }
    let (p1, c1) = map_point(transform, q.p1);
    let (p2, c2) = map_point(transform, q.p2);
    let (p3, c3) = map_point(transform, q.p3);
    let (p4, c4) = map_point(transform, q.p4);
    (Quad::new(p1, p2, p3, p4), c1 || c2 || c3 || c4)
}

/// Projects all four vertices of a quad onto the transform's source plane.
///
/// Same contract as [`map_quad`].
#[must_use]
pub fn project_quad(transform: &Transform3d, q: &Quad) -> (Quad, bool) {
    let (p1, c1) = project_point(transform, q.p1);
    let (p2, c2) = project_point(transform, q.p2);
    let (p3, c3) = project_point(transform, q.p3);
    let (p4, c4) = project_point(transform, q.p4);
    (Quad::new(p1, p2, p3, p4), c1 || c2 || c3 || c4)
}

fn translate_quad(q: &Quad, t: Vec2) -> Quad {
    Quad::new(q.p1 + t, q.p2 + t, q.p3 + t, q.p4 + t)
}

/// Maps a rect, returning the enclosing rect of its correctly clipped image.
#[must_use]
pub fn map_clipped_rect(transform: &Transform3d, rect: Rect) -> Rect {
    if transform.is_identity_or_translation() {
        let t = transform.translation();
        return rect + t;
    }
    let q = Quad::from_rect(rect);
    compute_enclosing_clipped_rect(
        map_homogeneous_point(transform, Point3::from_point(q.p1)),
        map_homogeneous_point(transform, Point3::from_point(q.p2)),
        map_homogeneous_point(transform, Point3::from_point(q.p3)),
        map_homogeneous_point(transform, Point3::from_point(q.p4)),
    )
}

/// Projects a rect onto a transform's source plane, returning the enclosing
/// rect of the correctly clipped projection.
#[must_use]
pub fn project_clipped_rect(transform: &Transform3d, rect: Rect) -> Rect {
    if transform.is_identity_or_translation() {
        let t = transform.translation();
        return rect - t;
    }
    let q = Quad::from_rect(rect);
    compute_enclosing_clipped_rect(
        project_homogeneous_point(transform, q.p1),
        project_homogeneous_point(transform, q.p2),
        project_homogeneous_point(transform, q.p3),
        project_homogeneous_point(transform, q.p4),
    )
}

/// Computes the minimal enclosing rect of a quad clipped at the near plane.
///
/// Fast path: when no vertex clips, the plain vertex bounding box. When all
/// four clip, the empty rect. Otherwise each unclipped vertex contributes its
/// cartesian point, and each edge whose endpoints disagree on clip state
/// contributes its intersection with the `w = `[`CLIP_W`] plane (linear
/// interpolation in homogeneous space). This yields the bounds of the clipped
/// polygon without building its vertex list.
#[must_use]
pub fn compute_enclosing_clipped_rect(
    h1: HomogeneousPoint,
    h2: HomogeneousPoint,
    h3: HomogeneousPoint,
    h4: HomogeneousPoint,
) -> Rect {
    let hs = [h1, h2, h3, h4];
    let clipped = [
        h1.should_be_clipped(),
        h2.should_be_clipped(),
        h3.should_be_clipped(),
        h4.should_be_clipped(),
    ];
    if !clipped.iter().any(|&c| c) {
        return Quad::new(
            h1.cartesian_point2d(),
            h2.cartesian_point2d(),
            h3.cartesian_point2d(),
            h4.cartesian_point2d(),
        )
        .bounding_box();
    }
    if clipped.iter().all(|&c| c) {
        return Rect::ZERO;
    }

    let mut bounds: Option<Rect> = None;
    let mut include = |p: Point| {
        bounds = Some(match bounds {
            None => Rect::new(p.x, p.y, p.x, p.y),
            Some(b) => Rect::new(b.x0.min(p.x), b.y0.min(p.y), b.x1.max(p.x), b.y1.max(p.y)),
        });
    };
    for i in 0..4 {
        let j = (i + 1) % 4;
        if !clipped[i] {
            include(hs[i].cartesian_point2d());
        }
        if clipped[i] != clipped[j] {
            include(compute_clipped_point_for_edge(hs[i], hs[j]).cartesian_point2d());
        }
    }
    bounds.unwrap_or(Rect::ZERO)
}

/// Intersects an edge with the `w = `[`CLIP_W`] plane.
///
/// The endpoints must disagree on clip state, which guarantees
/// `h1.w != h2.w`.
fn compute_clipped_point_for_edge(h1: HomogeneousPoint, h2: HomogeneousPoint) -> HomogeneousPoint {
    let t = (h1.w - CLIP_W) / (h1.w - h2.w);
    HomogeneousPoint::new(
        h1.x + t * (h2.x - h1.x),
        h1.y + t * (h2.y - h1.y),
        h1.z + t * (h2.z - h1.z),
        h1.w + t * (h2.w - h1.w),
    )
}

/// Maps a quad and clips the result at the near plane, emitting the clipped
/// polygon in winding order.
///
/// Returns the vertex buffer and the number of valid vertices (at most 8).
#[must_use]
pub fn map_clipped_quad(transform: &Transform3d, q: &Quad) -> ([Point; 8], usize) {
    let hs = map_quad_vertices(transform, q);
    let mut out = [Point::ZERO; 8];
    let mut n = 0;
    for_each_clipped_vertex(&hs, |h| {
        out[n] = h.cartesian_point2d();
        n += 1;
    });
    (out, n)
}

/// 3-D variant of [`map_clipped_quad`]: the emitted vertices keep their z.
#[must_use]
pub fn map_clipped_quad3d(transform: &Transform3d, q: &Quad) -> ([Point3; 8], usize) {
    let hs = map_quad_vertices(transform, q);
    let mut out = [Point3::ZERO; 8];
    let mut n = 0;
    for_each_clipped_vertex(&hs, |h| {
        out[n] = h.cartesian_point3d();
        n += 1;
    });
    (out, n)
}

fn map_quad_vertices(transform: &Transform3d, q: &Quad) -> [HomogeneousPoint; 4] {
    q.points()
        .map(|p| map_homogeneous_point(transform, Point3::from_point(p)))
}

/// Walks the quad boundary, emitting each unclipped vertex and each
/// near-plane crossing in order.
fn for_each_clipped_vertex(hs: &[HomogeneousPoint; 4], mut emit: impl FnMut(HomogeneousPoint)) {
    let clipped = [
        hs[0].should_be_clipped(),
        hs[1].should_be_clipped(),
        hs[2].should_be_clipped(),
        hs[3].should_be_clipped(),
    ];
    for i in 0..4 {
        let j = (i + 1) % 4;
        if !clipped[i] {
            emit(hs[i]);
        }
        if clipped[i] != clipped[j] {
            emit(compute_clipped_point_for_edge(hs[i], hs[j]));
        }
    }
}

/// Derives the x/y scale a transform applies in 2-D.
///
/// When the transform has perspective there is no single well-defined 2-D
/// scale, so `(fallback, fallback)` is returned. Otherwise each scale is the
/// magnitude of the corresponding column's first three components; the square
/// root is skipped when two of the three are zero.
#[must_use]
pub fn compute_transform_2d_scale_components(transform: &Transform3d, fallback: f64) -> Vec2 {
    if transform.has_perspective() {
        return Vec2::new(fallback, fallback);
    }
    let c = &transform.cols;
    Vec2::new(
        column_magnitude(c[0][0], c[0][1], c[0][2]),
        column_magnitude(c[1][0], c[1][1], c[1][2]),
    )
}

fn column_magnitude(a: f64, b: f64, c: f64) -> f64 {
    if b == 0.0 && c == 0.0 {
        a.abs()
    } else if a == 0.0 && c == 0.0 {
        b.abs()
    } else if a == 0.0 && b == 0.0 {
        c.abs()
    } else {
        (a * a + b * b + c * c).sqrt()
    }
}

/// Expands a rect to integer bounds, substituting the empty rect for NaN.
///
/// Integer-rounding a NaN rect is undefined, so NaN is normalized away
/// before any rounding happens.
#[must_use]
pub fn to_enclosing_rect(r: Rect) -> Rect {
    if r.x0.is_nan() || r.y0.is_nan() || r.x1.is_nan() || r.y1.is_nan() {
        return Rect::ZERO;
    }
    Rect::new(r.x0.floor(), r.y0.floor(), r.x1.ceil(), r.y1.ceil())
}

/// Maps a rect and expands the clipped result to integer bounds.
#[must_use]
pub fn map_enclosing_clipped_rect(transform: &Transform3d, rect: Rect) -> Rect {
    to_enclosing_rect(map_clipped_rect(transform, rect))
}
