// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The clip tree: accumulated clip rects.
//!
//! Clip nodes are sparser than transform nodes; each references the
//! transform node its clip rect is expressed under. [`ClipTree::update_clips`]
//! folds each node's rect into its parent's accumulated clip by projecting
//! the parent clip into the node's transform space and intersecting.

use alloc::vec::Vec;

use kurbo::Rect;
use understory_dirty::{CycleHandling, DirtyTracker};

use super::forest::{ForestNode, INVALID, PropertyTree};
use super::transform_tree::TransformTree;
use crate::dirty;
use crate::mapper;

/// A node of the [`ClipTree`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClipNode {
    id: u32,
    parent_id: u32,

    /// The clip rect, in the space of [`transform_id`](Self::transform_id).
    pub clip: Rect,
    /// Transform node the clip rect is expressed under.
    pub transform_id: u32,
    /// Transform node of the render surface this clip applies within.
    pub target_id: u32,
    /// Whether this node's own rect participates, or only inherited clips.
    pub applies_local_clip: bool,
    /// Whether content under this node is clipped at all.
    pub layers_are_clipped: bool,

    /// Accumulated clip in this node's transform space. Derived.
    pub combined_clip: Rect,
}

impl Default for ClipNode {
    fn default() -> Self {
        Self {
            id: INVALID,
            parent_id: INVALID,
            clip: Rect::ZERO,
            transform_id: 0,
            target_id: 0,
            applies_local_clip: true,
            layers_are_clipped: true,
            combined_clip: Rect::ZERO,
        }
    }
}

impl ClipNode {
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

impl ForestNode for ClipNode {
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

fn intersection(a: Rect, b: Rect) -> Rect {
    let r = Rect::new(
        a.x0.max(b.x0),
        a.y0.max(b.y0),
        a.x1.min(b.x1),
        a.y1.min(b.y1),
    );
    if r.x1 <= r.x0 || r.y1 <= r.y0 {
        Rect::ZERO
    } else {
        r
    }
}

/// The indexed forest of clip nodes plus its dirty set.
#[derive(Debug)]
pub struct ClipTree {
    tree: PropertyTree<ClipNode>,
    dirty: DirtyTracker<u32>,
}

impl Default for ClipTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipTree {
    /// Creates an empty clip tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: PropertyTree::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Appends a node under `parent_id` and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent_id` does not precede the new node (see
    /// [`PropertyTree::insert`]).
    pub fn insert(&mut self, node: ClipNode, parent_id: u32) -> u32 {
        let id = self.tree.insert(node, parent_id);
        // Clip marks are local-only; combined clips are re-derived for the
        // whole tree whenever anything changed, so no dependency edges.
        self.dirty.mark(id, dirty::CLIP);
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
    pub fn node(&self, id: u32) -> &ClipNode {
        self.tree.node(id)
    }

    /// Tears the whole tree down for a wholesale rebuild.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.dirty = DirtyTracker::with_cycle_handling(CycleHandling::Error);
    }

    /// Sets the node's clip rect.
    pub fn set_clip(&mut self, id: u32, clip: Rect) {
        self.tree.node_mut(id).clip = clip;
        self.dirty.mark(id, dirty::CLIP);
    }

    /// Re-derives accumulated clips if any clip rect changed since the last
    /// call. Returns the ids whose rects were explicitly changed.
    ///
    /// The parent's accumulated clip is projected from the parent's
    /// transform space into the node's before intersecting, using
    /// `transforms`. A non-computable path (singular transform along the
    /// way) leaves that node's accumulated clip at its own rect; such
    /// content does not draw, so its clip is never consulted.
    pub fn update_clips(&mut self, transforms: &TransformTree) -> Vec<u32> {
        let mut changed: Vec<u32> = self.dirty.drain(dirty::CLIP).deterministic().run().collect();
        changed.sort_unstable();
        changed.dedup();
        if changed.is_empty() {
            return changed;
        }
        for id in 0..self.tree.len() {
            self.update_combined_clip(id, transforms);
        }
        changed
    }

    fn update_combined_clip(&mut self, id: u32, transforms: &TransformTree) {
        let node = self.tree.node(id);
        let parent_id = node.parent_id;
        if parent_id == INVALID {
            let clip = node.clip;
            self.tree.node_mut(id).combined_clip = clip;
            return;
        }
        let parent = self.tree.node(parent_id);
        let (parent_to_current, ok) =
            transforms.compute_transform(parent.transform_id, node.transform_id);
        let combined = if ok {
            let parent_clip =
                mapper::project_clipped_rect(&parent_to_current, parent.combined_clip);
            if node.applies_local_clip {
                intersection(node.clip, parent_clip)
            } else {
                parent_clip
            }
        } else {
            node.clip
        };
        self.tree.node_mut(id).combined_clip = combined;
    }
}
