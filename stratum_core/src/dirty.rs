// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The property trees use multi-channel dirty tracking (via
//! [`understory_dirty`]) to gate per-node recomputation. Each channel is an
//! independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating** — [`TRANSFORM`] and [`OPACITY`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency
//!   edges from child to parent. Marking a node dirty automatically marks
//!   its whole subtree, because screen-space transforms and cumulative
//!   opacities are inherited down the tree.
//!
//! - **Local-only** — [`CLIP`] is marked with the default policy. Only the
//!   explicitly marked node appears in the drain output, since clip rects
//!   are per-node inputs.
//!
//! There is no structural channel: the trees are append-only and torn down
//! wholesale on structural change rather than re-linked in place.

use understory_dirty::Channel;

/// A local or inherited transform input changed — the node and its
/// descendants need their derived transforms recomputed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Opacity changed — cumulative screen-space opacity must be recomputed for
/// the node and its descendants.
pub const OPACITY: Channel = Channel::new(1);

/// A clip rect changed — no propagation needed.
pub const CLIP: Channel = Channel::new(2);
