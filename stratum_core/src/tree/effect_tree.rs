// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The effect tree: cumulative opacity and render-surface flags.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::forest::{ForestNode, INVALID, PropertyTree};
use crate::dirty;

/// A node of the [`EffectTree`].
#[derive(Clone, Debug, PartialEq)]
pub struct EffectNode {
    id: u32,
    parent_id: u32,

    /// The node's own opacity in `[0, 1]`.
    pub opacity: f64,
    /// Whether this effect renders into its own surface.
    pub has_render_surface: bool,
    /// Transform node this effect is positioned under.
    pub transform_id: u32,
    /// Clip node bounding this effect's content.
    pub clip_id: u32,

    /// Product of opacities from the root down to this node. Derived.
    pub screen_space_opacity: f64,
}

impl Default for EffectNode {
    fn default() -> Self {
        Self {
            id: INVALID,
            parent_id: INVALID,
            opacity: 1.0,
            has_render_surface: false,
            transform_id: 0,
            clip_id: 0,
            screen_space_opacity: 1.0,
        }
    }
}

impl EffectNode {
    /// The node's index in the tree.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// The parent's index, or [`INVALID`] for the root.
    #[inline]
    #[must_use]
    pub const fn parent_id(&self) -> u32 {
        self.parent_id
    }
}

impl ForestNode for EffectNode {
    fn id(&self) -> u32 {
        self.id
    }
    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
    fn parent_id(&self) -> u32 {
        self.parent_id
    }
    fn set_parent_id(&mut self, parent_id: u32) {
        self.parent_id = parent_id;
    }
}

/// The indexed forest of effect nodes plus its dirty set.
#[derive(Debug)]
pub struct EffectTree {
    tree: PropertyTree<EffectNode>,
    dirty: DirtyTracker<u32>,
}

impl Default for EffectTree {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectTree {
    /// Creates an empty effect tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: PropertyTree::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Appends a node under `parent_id` and returns its id.
    ///
    /// Opacity changes propagate down the tree, so a child-to-parent
    /// dependency edge is registered like the transform tree does.
    ///
    /// # Panics
    ///
    /// Panics if `parent_id` does not precede the new node (see
    /// [`PropertyTree::insert`]).
    pub fn insert(&mut self, node: EffectNode, parent_id: u32) -> u32 {
        let id = self.tree.insert(node, parent_id);
        if parent_id != INVALID {
            let _ = self.dirty.add_dependency(id, parent_id, dirty::OPACITY);
        }
        self.dirty.mark_with(id, dirty::OPACITY, &EagerPolicy);
        id
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.tree.len()
    }

    /// Is the tree empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn node(&self, id: u32) -> &EffectNode {
        self.tree.node(id)
    }

    /// Tears the whole tree down for a wholesale rebuild.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.dirty = DirtyTracker::with_cycle_handling(CycleHandling::Error);
    }

    /// Sets the node's opacity and marks it and its subtree dirty.
    pub fn set_opacity(&mut self, id: u32, opacity: f64) {
        self.tree.node_mut(id).opacity = opacity;
        self.dirty.mark_with(id, dirty::OPACITY, &EagerPolicy);
    }

    /// Drains the dirty set and recomputes cumulative opacities in id order.
    ///
    /// Returns the updated ids, ascending.
    pub fn update_opacities(&mut self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        for &id in &ids {
            self.update_effects(id);
        }
        ids
    }

    /// Recomputes one node's cumulative opacity from its already-updated
    /// parent.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn update_effects(&mut self, id: u32) {
        let parent_id = self.tree.node(id).parent_id;
        let inherited = if parent_id == INVALID {
            1.0
        } else {
            self.tree.node(parent_id).screen_space_opacity
        };
        let node = self.tree.node_mut(id);
        node.screen_space_opacity = node.opacity * inherited;
    }
}
