// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exact-area region as a set of disjoint rectangles.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

/// Rectangle-count cap before a region self-simplifies to its bounding rect.
pub const MAX_RECTS: usize = 256;

/// An exact union-of-rectangles area.
///
/// Internally a list of pairwise-disjoint rectangles. Union, intersection,
/// and subtraction are exact until the rectangle count exceeds [`MAX_RECTS`]
/// after an operation, at which point the region collapses to its bounding
/// rect. That simplification is one-directional: covered area is never lost,
/// but uncovered area may be reported from then on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    rects: Vec<Rect>,
}

/// Treats degenerate (zero or negative area) rects as empty.
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

fn intersection(a: &Rect, b: &Rect) -> Option<Rect> {
    let r = Rect::new(
        a.x0.max(b.x0),
        a.y0.max(b.y0),
        a.x1.min(b.x1),
        a.y1.min(b.y1),
    );
    if is_empty_rect(&r) { None } else { Some(r) }
}

/// Appends the (up to four) pieces of `a` not covered by `b`.
fn push_difference(a: Rect, b: &Rect, out: &mut Vec<Rect>) {
    let Some(overlap) = intersection(&a, b) else {
        out.push(a);
        return;
    };
    // Top band.
    if overlap.y0 > a.y0 {
        out.push(Rect::new(a.x0, a.y0, a.x1, overlap.y0));
    }
    // Bottom band.
    if overlap.y1 < a.y1 {
        out.push(Rect::new(a.x0, overlap.y1, a.x1, a.y1));
    }
    // Left remainder within the overlap's vertical span.
    if overlap.x0 > a.x0 {
        out.push(Rect::new(a.x0, overlap.y0, overlap.x0, overlap.y1));
    }
    // Right remainder.
    if overlap.x1 < a.x1 {
        out.push(Rect::new(overlap.x1, overlap.y0, a.x1, overlap.y1));
    }
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Creates a region covering a single rect.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.union_rect(rect);
        region
    }

    /// Does the region cover no area?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Number of rectangles currently representing the region.
    #[must_use]
    pub fn complexity(&self) -> usize {
        self.rects.len()
    }

    /// The smallest rect containing the whole region.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let mut iter = self.rects.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        let mut b = *first;
        for r in iter {
            b = Rect::new(
                b.x0.min(r.x0),
                b.y0.min(r.y0),
                b.x1.max(r.x1),
                b.y1.max(r.y1),
            );
        }
        b
    }

    /// Does the region cover the given point?
    ///
    /// Coverage is closed-open: a rect covers `[x0, x1) × [y0, y1)`.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        self.rects
            .iter()
            .any(|r| p.x >= r.x0 && p.x < r.x1 && p.y >= r.y0 && p.y < r.y1)
    }

    /// Does the region cover every point of `rect`?
    #[must_use]
    pub fn contains_rect(&self, rect: Rect) -> bool {
        if is_empty_rect(&rect) {
            return true;
        }
        let mut uncovered = Vec::new();
        uncovered.push(rect);
        for r in &self.rects {
            let mut next = Vec::new();
            for piece in uncovered.drain(..) {
                push_difference(piece, r, &mut next);
            }
            uncovered = next;
            if uncovered.is_empty() {
                return true;
            }
        }
        false
    }

    /// Does the region cover any point of `rect`?
    #[must_use]
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.rects.iter().any(|r| intersection(r, &rect).is_some())
    }

    /// Adds `rect` to the region.
    pub fn union_rect(&mut self, rect: Rect) {
        if is_empty_rect(&rect) {
            return;
        }
        // Only insert the parts not already covered, keeping rects disjoint.
        let mut pieces = Vec::new();
        pieces.push(rect);
        for r in &self.rects {
            let mut next = Vec::new();
            for piece in pieces.drain(..) {
                push_difference(piece, r, &mut next);
            }
            pieces = next;
            if pieces.is_empty() {
                return;
            }
        }
        self.rects.extend(pieces);
        self.simplify_if_complex();
    }

    /// Adds all of `other` to the region.
    pub fn union(&mut self, other: &Self) {
        for r in &other.rects {
            self.union_rect(*r);
        }
    }

    /// Removes `rect` from the region.
    pub fn subtract_rect(&mut self, rect: Rect) {
        if is_empty_rect(&rect) {
            return;
        }
        let mut next = Vec::new();
        for r in self.rects.drain(..) {
            push_difference(r, &rect, &mut next);
        }
        self.rects = next;
        self.simplify_if_complex();
    }

    /// Removes all of `other` from the region.
    pub fn subtract(&mut self, other: &Self) {
        for r in &other.rects {
            self.subtract_rect(*r);
        }
    }

    /// Intersects the region with `rect`.
    pub fn intersect_rect(&mut self, rect: Rect) {
        self.rects = self
            .rects
            .iter()
            .filter_map(|r| intersection(r, &rect))
            .collect();
    }

    /// Intersects the region with `other`.
    pub fn intersect(&mut self, other: &Self) {
        let mut next = Vec::new();
        for a in &self.rects {
            for b in &other.rects {
                if let Some(r) = intersection(a, b) {
                    next.push(r);
                }
            }
        }
        self.rects = next;
        self.simplify_if_complex();
    }

    /// Collapses to the bounding rect once past the complexity cap.
    fn simplify_if_complex(&mut self) {
        if self.rects.len() > MAX_RECTS {
            let b = self.bounds();
            self.rects.clear();
            self.rects.push(b);
        }
    }

    /// Total covered area. Exact while un-simplified.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.rects.iter().map(area).sum()
    }
}
