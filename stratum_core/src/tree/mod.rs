// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property trees: transform, clip, and effect hierarchies.
//!
//! Scene properties that inherit down a layer hierarchy live in three
//! parallel indexed forests rather than on the layers themselves, so that a
//! scroll or an opacity change touches one small tree instead of the whole
//! scene. All three share the [`forest::PropertyTree`] storage and its
//! parent-before-child id ordering; each pairs it with a dirty set keyed by
//! node id (see [`crate::dirty`]).
//!
//! The trees are append-only. Structural change tears a tree down
//! ([`PropertyTrees::clear`]) and rebuilds it from the scene, bumping the
//! sequence number so stale node ids cannot be confused with the new
//! generation's.

pub mod clip_tree;
pub mod effect_tree;
pub mod forest;
pub mod transform_tree;

pub use clip_tree::{ClipNode, ClipTree};
pub use effect_tree::{EffectNode, EffectTree};
pub use forest::{ForestNode, INVALID, PropertyTree};
pub use transform_tree::{TransformNode, TransformTree};

/// The three property trees of one scene, updated together.
#[derive(Debug, Default)]
pub struct PropertyTrees {
    /// Transform hierarchy.
    pub transform_tree: TransformTree,
    /// Clip hierarchy.
    pub clip_tree: ClipTree,
    /// Effect (opacity) hierarchy.
    pub effect_tree: EffectTree,
    /// Set when the trees no longer match the scene and must be rebuilt.
    pub needs_rebuild: bool,
    /// Bumped on every rebuild; node ids are only comparable within one
    /// sequence.
    pub sequence_number: u64,
}

impl PropertyTrees {
    /// Creates an empty set of trees.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tears all three trees down for a wholesale rebuild.
    pub fn clear(&mut self) {
        self.transform_tree.clear();
        self.clip_tree.clear();
        self.effect_tree.clear();
        self.needs_rebuild = false;
        self.sequence_number += 1;
    }

    /// Runs every pending incremental update across the three trees.
    pub fn update_all(&mut self) {
        self.transform_tree.update_all();
        self.clip_tree.update_clips(&self.transform_tree);
        self.effect_tree.update_opacities();
    }
}
