// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constant-size enclosed-region approximation.

use kurbo::{Point, Rect};

/// A region approximated by at most one rectangle.
///
/// The kept rectangle is always entirely inside the true region: the
/// approximation never reports area that is not actually covered, but may
/// omit covered area. Union and subtraction greedily keep the largest
/// representable rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimpleEnclosedRegion {
    rect: Rect,
}

fn is_empty_rect(r: &Rect) -> bool {
    r.x1 <= r.x0 || r.y1 <= r.y0
}

fn area(r: &Rect) -> f64 {
    if is_empty_rect(r) {
        0.0
    } else {
        (r.x1 - r.x0) * (r.y1 - r.y0)
    }
}

fn contains(outer: &Rect, inner: &Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Extends `base` along the x axis to swallow `other`, if `other` spans
/// `base`'s full vertical extent and the two at least touch horizontally.
fn extend_x(base: &Rect, other: &Rect) -> Option<Rect> {
    if other.y0 <= base.y0 && other.y1 >= base.y1 && other.x0 <= base.x1 && other.x1 >= base.x0 {
        Some(Rect::new(
            base.x0.min(other.x0),
            base.y0,
            base.x1.max(other.x1),
            base.y1,
        ))
    } else {
        None
    }
}

/// Y-axis counterpart of [`extend_x`].
fn extend_y(base: &Rect, other: &Rect) -> Option<Rect> {
    if other.x0 <= base.x0 && other.x1 >= base.x1 && other.y0 <= base.y1 && other.y1 >= base.y0 {
        Some(Rect::new(
            base.x0,
            base.y0.min(other.y0),
            base.x1,
            base.y1.max(other.y1),
        ))
    } else {
        None
    }
}

impl SimpleEnclosedRegion {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rect: Rect::ZERO }
    }

    /// Creates a region covering a single rect.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        if is_empty_rect(&rect) {
            Self::new()
        } else {
            Self { rect }
        }
    }

    /// Does the region cover no area?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        is_empty_rect(&self.rect)
    }

    /// The kept rectangle (empty when the region is empty).
    #[must_use]
    pub fn bounds(&self) -> Rect {
        if self.is_empty() { Rect::ZERO } else { self.rect }
    }

    /// Number of rectangles representing the region: 0 or 1.
    #[must_use]
    pub fn complexity(&self) -> usize {
        usize::from(!self.is_empty())
    }

    /// Does the region cover the given point?
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        !self.is_empty()
            && p.x >= self.rect.x0
            && p.x < self.rect.x1
            && p.y >= self.rect.y0
            && p.y < self.rect.y1
    }

    /// Does the region cover every point of `rect`?
    #[must_use]
    pub fn contains_rect(&self, rect: Rect) -> bool {
        is_empty_rect(&rect) || (!self.is_empty() && contains(&self.rect, &rect))
    }

    /// Does the region cover any point of `rect`?
    #[must_use]
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        !self.is_empty() && intersects(&self.rect, &rect)
    }

    /// Adds `rect`, keeping the largest single rectangle that lies entirely
    /// within the union.
    ///
    /// Candidates are the two inputs and each input extended along one axis
    /// by the other (valid only when the extender spans the extendee's full
    /// perpendicular extent, so the extension stays covered). The
    /// largest-area candidate wins.
    pub fn union(&mut self, rect: Rect) {
        if is_empty_rect(&rect) {
            return;
        }
        if self.is_empty() {
            self.rect = rect;
            return;
        }
        if contains(&self.rect, &rect) {
            return;
        }
        if contains(&rect, &self.rect) {
            self.rect = rect;
            return;
        }

        let mut best = if area(&rect) > area(&self.rect) {
            rect
        } else {
            self.rect
        };
        let candidates = [
            extend_x(&self.rect, &rect),
            extend_y(&self.rect, &rect),
            extend_x(&rect, &self.rect),
            extend_y(&rect, &self.rect),
        ];
        for candidate in candidates.into_iter().flatten() {
            if area(&candidate) > area(&best) {
                best = candidate;
            }
        }
        self.rect = best;
    }

    /// Removes `rect`, keeping the largest edge-shrink remainder.
    ///
    /// The kept rectangle is the largest of the four bands of the current
    /// rect lying fully above, below, left of, or right of the subtracted
    /// rect — each is guaranteed to still be covered.
    pub fn subtract(&mut self, rect: Rect) {
        if self.is_empty() || is_empty_rect(&rect) || !intersects(&self.rect, &rect) {
            return;
        }
        let r = self.rect;
        let candidates = [
            Rect::new(r.x0, r.y0, r.x1, rect.y0.min(r.y1)),
            Rect::new(r.x0, rect.y1.max(r.y0), r.x1, r.y1),
            Rect::new(r.x0, r.y0, rect.x0.min(r.x1), r.y1),
            Rect::new(rect.x1.max(r.x0), r.y0, r.x1, r.y1),
        ];
        let mut best = Rect::ZERO;
        for candidate in candidates {
            if area(&candidate) > area(&best) {
                best = candidate;
            }
        }
        self.rect = best;
    }
}
