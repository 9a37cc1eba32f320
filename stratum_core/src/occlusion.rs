// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Occlusion queries for content rects.
//!
//! An [`Occlusion`] is an immutable value combining a draw transform with two
//! occluding regions in target-surface space: what is already covered by
//! content *outside* the current target and what is covered from *inside* it.
//! Queries map a content rect into target space, carve the occluded area off,
//! and (optionally) map the remainder back.
//!
//! Every answer errs toward visibility: a non-invertible draw transform or a
//! lossy region subtraction can only ever cause the query to report *more*
//! unoccluded area, never to claim unproven occlusion.

use kurbo::Rect;

use crate::mapper;
use crate::region::SimpleEnclosedRegion;
use crate::transform::Transform3d;

/// Occlusion state for one drawing step, in target-surface space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Occlusion {
    draw_transform: Transform3d,
    outside_target: SimpleEnclosedRegion,
    inside_target: SimpleEnclosedRegion,
}

fn is_empty_rect(r: &Rect) -> bool {
    r.x1 <= r.x0 || r.y1 <= r.y0
}

fn intersection(a: Rect, b: Rect) -> Rect {
    let r = Rect::new(
        a.x0.max(b.x0),
        a.y0.max(b.y0),
        a.x1.min(b.x1),
        a.y1.min(b.y1),
    );
    if is_empty_rect(&r) { Rect::ZERO } else { r }
}

/// One-sided rect subtraction: shrinks `a` away from `b` only when `b` spans
/// `a`'s full extent on the perpendicular axis, otherwise leaves `a` alone.
///
/// The result always contains the exact difference, so using it for
/// occlusion only under-reports coverage.
fn subtract_rect(a: Rect, b: Rect) -> Rect {
    if is_empty_rect(&a) {
        return Rect::ZERO;
    }
    if is_empty_rect(&b) || !(a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1) {
        return a;
    }
    let mut r = a;
    if b.y0 <= a.y0 && b.y1 >= a.y1 {
        // Full vertical span: shrink horizontally.
        if b.x0 <= a.x0 {
            r.x0 = b.x1;
        } else if b.x1 >= a.x1 {
            r.x1 = b.x0;
        }
    } else if b.x0 <= a.x0 && b.x1 >= a.x1 {
        // Full horizontal span: shrink vertically.
        if b.y0 <= a.y0 {
            r.y0 = b.y1;
        } else if b.y1 >= a.y1 {
            r.y1 = b.y0;
        }
    }
    if is_empty_rect(&r) { Rect::ZERO } else { r }
}

impl Occlusion {
    /// Creates an occlusion value from a draw transform and the two occluding
    /// regions in target-surface space.
    #[must_use]
    pub const fn new(
        draw_transform: Transform3d,
        outside_target: SimpleEnclosedRegion,
        inside_target: SimpleEnclosedRegion,
    ) -> Self {
        Self {
            draw_transform,
            outside_target,
            inside_target,
        }
    }

    /// Maps `content_rect` into target-surface space and removes the occluded
    /// area.
    ///
    /// The mapping is the enclosing-clipped rect, so the result is expressed
    /// on integer bounds in target space.
    #[must_use]
    pub fn unoccluded_rect_in_target_surface(&self, content_rect: Rect) -> Rect {
        let mut rect = mapper::map_enclosing_clipped_rect(&self.draw_transform, content_rect);
        rect = subtract_rect(rect, self.inside_target.bounds());
        rect = subtract_rect(rect, self.outside_target.bounds());
        rect
    }

    /// Returns the sub-rect of `content_rect` not proven occluded.
    ///
    /// Maps the unoccluded target-space remainder back through the inverse
    /// draw transform and intersects with the input. If the draw transform is
    /// not invertible the whole input is returned: occlusion is never claimed
    /// without proof.
    #[must_use]
    pub fn unoccluded_content_rect(&self, content_rect: Rect) -> Rect {
        if is_empty_rect(&content_rect) {
            return content_rect;
        }
        if self.outside_target.is_empty() && self.inside_target.is_empty() {
            return content_rect;
        }
        let Some(inverse) = self.draw_transform.inverse() else {
            return content_rect;
        };
        let unoccluded_in_target = self.unoccluded_rect_in_target_surface(content_rect);
        if is_empty_rect(&unoccluded_in_target) {
            return Rect::ZERO;
        }
        let back = mapper::map_enclosing_clipped_rect(&inverse, unoccluded_in_target);
        intersection(content_rect, back)
    }

    /// Is the whole content rect proven occluded?
    ///
    /// An empty input is trivially fully occluded.
    #[must_use]
    pub fn is_occluded(&self, content_rect: Rect) -> bool {
        if is_empty_rect(&content_rect) {
            return true;
        }
        is_empty_rect(&self.unoccluded_rect_in_target_surface(content_rect))
    }

    /// Does this occlusion value have any occluding area at all?
    #[must_use]
    pub fn has_occlusion(&self) -> bool {
        !self.outside_target.is_empty() || !self.inside_target.is_empty()
    }
}
