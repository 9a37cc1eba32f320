// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry and scene-graph transforms for layer-based rendering.
//!
//! `stratum_core` provides the math that turns a tree of layers into
//! drawable geometry: full 4×4 transforms with correct handling of
//! perspective and w ≤ 0 clipping, property trees that derive screen- and
//! target-space transforms incrementally, and conservative region and
//! occlusion types for culling. It is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! Data flows from caller-set scene properties to per-node drawable
//! geometry:
//!
//! ```text
//!   scene properties (local transforms, clips, opacities)
//!       │
//!       ▼
//!   PropertyTrees ──► update_all() ──► to_screen / combined_clip /
//!       │                             screen_space_opacity
//!       ▼
//!   mapper (clip-aware rect & quad mapping)
//!       │
//!       ▼
//!   Region / Occlusion (what still needs painting)
//! ```
//!
//! **[`transform`]** — Column-major 4×4 [`Transform3d`](transform::Transform3d)
//! with construction, classification, composition, and inversion.
//!
//! **[`geom`]** — Small 3-D value types ([`Point3`](geom::Point3),
//! [`Quad`](geom::Quad)) complementing `kurbo`'s 2-D ones.
//!
//! **[`homogeneous`]** — Four-component points and the w ≤ 0 clip test that
//! keeps perspective projection honest.
//!
//! **[`mapper`]** — Clip-aware mapping and projection of points, rects, and
//! quads through arbitrary transforms.
//!
//! **[`tree`]** — The transform, clip, and effect property trees with
//! incremental, dirty-gated updates.
//!
//! **[`region`]** — Exact rect-set regions and the one-rect conservative
//! [`SimpleEnclosedRegion`](region::SimpleEnclosedRegion).
//!
//! **[`occlusion`]** — Queries answering how much of a content rect is
//! proven covered by already-drawn content.
//!
//! **[`dirty`]** — Multi-channel dirty tracking via `understory_dirty`.
//! TRANSFORM and OPACITY propagate to descendants; CLIP is local-only.
//!
//! **[`round`]** — Overflow-checked integer rounding to multiples, for
//! tile and texel alignment.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod geom;
pub mod homogeneous;
pub mod mapper;
pub mod occlusion;
pub mod region;
pub mod round;
pub mod transform;
pub mod tree;
