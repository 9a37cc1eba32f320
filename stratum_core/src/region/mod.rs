// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region algebra over axis-aligned rectangles.
//!
//! Two representations with opposite approximation directions:
//!
//! - [`Region`] — an exact set of disjoint rectangles. Exact immediately
//!   after every operation, but self-simplifies to its bounding rect once
//!   rectangle count exceeds a fixed cap. From then on it *over*-approximates:
//!   covered area is never lost, extra area may be reported.
//! - [`SimpleEnclosedRegion`] — at most one rectangle, an
//!   *under*-approximation: area not actually covered is never reported,
//!   covered area may be dropped. Constant-size, used for cheap occlusion
//!   tests.

mod exact;
mod simple;

pub use exact::{MAX_RECTS, Region};
pub use simple::SimpleEnclosedRegion;
