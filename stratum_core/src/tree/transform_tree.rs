// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The transform tree: incremental derivation of per-node transforms.
//!
//! Each node carries caller-set inputs (local transform, pivot transforms,
//! scroll offset, animation state, flags) and derived outputs (`to_parent`,
//! `to_screen`/`from_screen`, `to_target`/`from_target`, sublayer scale,
//! animated-scale bounds, snap translation). [`TransformTree::update_transforms`]
//! derives one node from its already-updated parent; callers must process
//! ids in non-decreasing order, or use [`TransformTree::update_all`] which
//! drains the dirty set in that order.
//!
//! Numerical degeneracy is never an error here: a non-invertible transform
//! clears `ancestors_are_invertible` and substitutes the identity for the
//! inverse, and downstream consumers treat the path as unusable.

use alloc::vec::Vec;

use kurbo::Vec2;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::forest::{ForestNode, INVALID, PropertyTree};
use crate::dirty;
use crate::mapper;
use crate::transform::Transform3d;

/// A node of the [`TransformTree`].
///
/// Input fields are set by the scene builder (before insertion) and by the
/// per-frame mutation surface on the tree; derived fields are written by
/// [`TransformTree::update_transforms`] and must not be set directly.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformNode {
    id: u32,
    parent_id: u32,

    /// The node whose render surface this node draws into.
    pub target_id: u32,

    // -- Inputs --
    /// The node's own transform.
    pub local: Transform3d,
    /// Applied before `local` (moves the transform origin to the pivot).
    pub pre_local: Transform3d,
    /// Applied after `local` (moves the pivot back and positions the node).
    pub post_local: Transform3d,
    /// Offset from this node's source of coordinates to its parent.
    pub source_to_parent: Vec2,
    /// Current scroll offset; subtracted from the local translation.
    pub scroll_offset: Vec2,
    /// Does this node scroll (and therefore want pixel snapping)?
    pub scrolls: bool,
    /// Does this node define its own sublayer scale?
    pub needs_sublayer_scale: bool,
    /// Does this node project its inherited transform to 2-D?
    pub flattens_inherited_transform: bool,
    /// Is this node's transform currently animated?
    pub is_animated: bool,
    /// Does a running animation scale this node?
    pub has_scale_animation: bool,
    /// Largest scale the running animation reaches.
    pub local_maximum_animation_scale: f64,
    /// Scale at the running animation's starting keyframe.
    pub local_starting_animation_scale: f64,
    /// Does a viewport-bounds change move this node horizontally?
    pub moved_by_viewport_bounds_delta_x: bool,
    /// Does a viewport-bounds change move this node vertically?
    pub moved_by_viewport_bounds_delta_y: bool,

    // -- Derived --
    /// Maps this node's space into its parent's space.
    pub to_parent: Transform3d,
    /// Maps this node's space into its target surface's space.
    pub to_target: Transform3d,
    /// Inverse of `to_target` (identity when not invertible).
    pub from_target: Transform3d,
    /// Maps this node's space to the screen.
    pub to_screen: Transform3d,
    /// Inverse of `to_screen` (identity when not invertible).
    pub from_screen: Transform3d,
    /// Does `to_parent` need to be recomputed from the inputs?
    pub needs_local_transform_update: bool,
    /// Is `to_parent` invertible?
    pub is_invertible: bool,
    /// Are this node's and all ancestors' transforms invertible?
    pub ancestors_are_invertible: bool,
    /// Is the whole chain from here to the root free of 3-D?
    pub node_and_ancestors_are_flat: bool,
    /// Is this node or any ancestor animated?
    pub to_screen_is_animated: bool,
    /// Is the accumulated transform an integer translation?
    pub node_and_ancestors_have_only_integer_translation: bool,
    /// Extra scale baked into the target-space transform.
    pub sublayer_scale: Vec2,
    /// Snap translation baked in by the last update; undone next frame.
    pub snap_amount: Vec2,
    /// Upper bound on animated scale, combined with ancestors (0 when
    /// unknown).
    pub combined_maximum_animation_scale: f64,
    /// Starting animated scale, combined with ancestors (0 when unknown).
    pub combined_starting_animation_scale: f64,
    /// Set when no meaningful animated-scale bound exists.
    pub animation_scale_unknown: bool,
    /// Does this node or any ancestor animate scale?
    pub ancestors_animate_scale: bool,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            id: INVALID,
            parent_id: INVALID,
            target_id: 0,
            local: Transform3d::IDENTITY,
            pre_local: Transform3d::IDENTITY,
            post_local: Transform3d::IDENTITY,
            source_to_parent: Vec2::ZERO,
            scroll_offset: Vec2::ZERO,
            scrolls: false,
            needs_sublayer_scale: false,
            flattens_inherited_transform: false,
            is_animated: false,
            has_scale_animation: false,
            local_maximum_animation_scale: 0.0,
            local_starting_animation_scale: 0.0,
            moved_by_viewport_bounds_delta_x: false,
            moved_by_viewport_bounds_delta_y: false,
            to_parent: Transform3d::IDENTITY,
            to_target: Transform3d::IDENTITY,
            from_target: Transform3d::IDENTITY,
            to_screen: Transform3d::IDENTITY,
            from_screen: Transform3d::IDENTITY,
            needs_local_transform_update: true,
            is_invertible: true,
            ancestors_are_invertible: true,
            node_and_ancestors_are_flat: true,
            to_screen_is_animated: false,
            node_and_ancestors_have_only_integer_translation: true,
            sublayer_scale: Vec2::new(1.0, 1.0),
            snap_amount: Vec2::ZERO,
            combined_maximum_animation_scale: 1.0,
            combined_starting_animation_scale: 1.0,
            animation_scale_unknown: false,
            ancestors_animate_scale: false,
        }
    }
}

impl TransformNode {
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

impl ForestNode for TransformNode {
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

/// The indexed forest of transform nodes plus its dirty set.
#[derive(Debug)]
pub struct TransformTree {
    tree: PropertyTree<TransformNode>,
    dirty: DirtyTracker<u32>,
    viewport_bounds_delta: Vec2,
    nodes_affected_by_viewport_bounds_delta: Vec<u32>,
}

impl Default for TransformTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformTree {
    /// Creates an empty transform tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: PropertyTree::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            viewport_bounds_delta: Vec2::ZERO,
            nodes_affected_by_viewport_bounds_delta: Vec::new(),
        }
    }

    /// Appends a node under `parent_id` and returns its id.
    ///
    /// The new node starts dirty. A dependency edge from the child to its
    /// parent makes transform invalidation propagate to the whole subtree.
    ///
    /// # Panics
    ///
    /// Panics if `parent_id` does not precede the new node (see
    /// [`PropertyTree::insert`]).
    pub fn insert(&mut self, node: TransformNode, parent_id: u32) -> u32 {
        let id = self.tree.insert(node, parent_id);
        if parent_id != INVALID {
            let _ = self.dirty.add_dependency(id, parent_id, dirty::TRANSFORM);
        }
        self.dirty.mark_with(id, dirty::TRANSFORM, &EagerPolicy);
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
    pub fn node(&self, id: u32) -> &TransformNode {
        self.tree.node(id)
    }

    /// Tears the whole tree down for a wholesale rebuild.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.dirty = DirtyTracker::with_cycle_handling(CycleHandling::Error);
        self.viewport_bounds_delta = Vec2::ZERO;
        self.nodes_affected_by_viewport_bounds_delta.clear();
    }

    // -- Per-frame mutation surface (auto-marks dirty) --

    /// Sets the node's local transform.
    pub fn set_local_transform(&mut self, id: u32, local: Transform3d) {
        let node = self.tree.node_mut(id);
        node.local = local;
        node.needs_local_transform_update = true;
        self.dirty.mark_with(id, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the node's scroll offset.
    pub fn set_scroll_offset(&mut self, id: u32, offset: Vec2) {
        let node = self.tree.node_mut(id);
        node.scroll_offset = offset;
        node.needs_local_transform_update = true;
        self.dirty.mark_with(id, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the offset from the node's source of coordinates to its parent.
    pub fn set_source_to_parent(&mut self, id: u32, offset: Vec2) {
        let node = self.tree.node_mut(id);
        node.source_to_parent = offset;
        node.needs_local_transform_update = true;
        self.dirty.mark_with(id, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Updates the node's transform-animation state.
    pub fn set_is_animated(&mut self, id: u32, is_animated: bool) {
        let node = self.tree.node_mut(id);
        node.is_animated = is_animated;
        self.dirty.mark_with(id, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Updates the node's scale-animation bounds.
    pub fn set_scale_animation(&mut self, id: u32, maximum_scale: f64, starting_scale: f64) {
        let node = self.tree.node_mut(id);
        node.has_scale_animation = true;
        node.is_animated = true;
        node.local_maximum_animation_scale = maximum_scale;
        node.local_starting_animation_scale = starting_scale;
        self.dirty.mark_with(id, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Registers a node as moved by viewport-bounds changes.
    pub fn register_affected_by_viewport_bounds_delta(&mut self, id: u32) {
        self.nodes_affected_by_viewport_bounds_delta.push(id);
    }

    /// Sets the viewport-bounds delta and marks every registered node dirty.
    pub fn set_viewport_bounds_delta(&mut self, delta: Vec2) {
        if self.viewport_bounds_delta == delta {
            return;
        }
        self.viewport_bounds_delta = delta;
        let affected = self.nodes_affected_by_viewport_bounds_delta.clone();
        for id in affected {
            self.tree.node_mut(id).needs_local_transform_update = true;
            self.dirty.mark_with(id, dirty::TRANSFORM, &EagerPolicy);
        }
    }

    // -- Update --

    /// Drains the dirty set and updates every affected node in id order.
    ///
    /// Returns the updated ids, ascending.
    pub fn update_all(&mut self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        for &id in &ids {
            self.update_transforms(id);
        }
        ids
    }

    /// Derives one node's transforms from its already-updated parent.
    ///
    /// Callers must process ids in non-decreasing order; a node updated
    /// before its parent silently produces stale geometry in release builds
    /// (debug builds assert).
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn update_transforms(&mut self, id: u32) {
        let parent_id = self.tree.node(id).parent_id;
        debug_assert!(
            parent_id == INVALID || !self.tree.node(parent_id).needs_local_transform_update,
            "node {id} updated before its parent {parent_id}"
        );
        let parent = if parent_id == INVALID {
            None
        } else {
            Some(self.tree.node(parent_id).clone())
        };

        let mut node = self.tree.node(id).clone();
        self.update_local_transform(&mut node);
        update_screen_space_transform(&mut node, parent.as_ref());
        update_sublayer_scale(&mut node);
        // Publish before the cross-node target-space query below.
        *self.tree.node_mut(id) = node;

        self.update_target_space_transform(id);
        self.update_animation_scales(id, parent.as_ref());
        self.update_snapping(id);
        self.update_integer_translation(id, parent.as_ref());
    }

    /// Step 1: refresh `to_parent` from the inputs, or undo last frame's
    /// snap translation so later steps start from unsnapped values.
    fn update_local_transform(&self, node: &mut TransformNode) {
        if node.needs_local_transform_update {
            let mut xform = node.post_local;
            let mut fixup = node.source_to_parent - node.scroll_offset;
            if node.moved_by_viewport_bounds_delta_x {
                fixup.x += self.viewport_bounds_delta.x;
            }
            if node.moved_by_viewport_bounds_delta_y {
                fixup.y += self.viewport_bounds_delta.y;
            }
            xform.pre_translate(fixup);
            node.to_parent = xform * node.local * node.pre_local;
            node.is_invertible = node.to_parent.inverse().is_some();
            node.needs_local_transform_update = false;
        } else {
            let snap = node.snap_amount;
            node.to_parent.pre_translate(-snap);
        }
        node.snap_amount = Vec2::ZERO;
    }

    /// Step 4: derive the target-space transform and its inverse.
    fn update_target_space_transform(&mut self, id: u32) {
        let node = self.tree.node(id);
        let to_target = if node.needs_sublayer_scale {
            // This node defines the target surface's scale; content below it
            // draws directly in that scaled space.
            Transform3d::from_scale(node.sublayer_scale.x, node.sublayer_scale.y, 1.0)
        } else {
            let target_id = if node.target_id == INVALID {
                0
            } else {
                node.target_id
            };
            self.compute_transform_with_destination_sublayer_scale(id, target_id)
                .0
        };
        let node = self.tree.node_mut(id);
        node.to_target = to_target;
        match to_target.inverse() {
            Some(inverse) => node.from_target = inverse,
            None => {
                node.from_target = Transform3d::IDENTITY;
                node.ancestors_are_invertible = false;
            }
        }
    }

    /// Step 5: combine animated-scale bounds multiplicatively with the
    /// ancestor chain, or give up when no meaningful bound exists.
    fn update_animation_scales(&mut self, id: u32, parent: Option<&TransformNode>) {
        let (parent_unknown, parent_animates, parent_max, parent_start) = match parent {
            Some(p) => (
                p.animation_scale_unknown,
                p.ancestors_animate_scale,
                p.combined_maximum_animation_scale,
                p.combined_starting_animation_scale,
            ),
            None => (false, false, 1.0, 1.0),
        };
        let node = self.tree.node_mut(id);
        node.ancestors_animate_scale = parent_animates || node.has_scale_animation;

        // Two simultaneous scale animations on one ancestor chain are
        // deliberately not modeled: multiplying their bounds grossly
        // overestimates the reachable scale.
        let unknown = parent_unknown
            || !node.to_target.is_scale_or_translation()
            || (node.has_scale_animation && parent_animates);
        node.animation_scale_unknown = unknown;
        if unknown {
            node.combined_maximum_animation_scale = 0.0;
            node.combined_starting_animation_scale = 0.0;
            return;
        }

        let (own_max, own_start) = if node.has_scale_animation {
            (
                node.local_maximum_animation_scale,
                node.local_starting_animation_scale,
            )
        } else {
            let scales = mapper::compute_transform_2d_scale_components(&node.to_parent, 0.0);
            let s = scales.x.max(scales.y);
            (s, s)
        };
        node.combined_maximum_animation_scale = parent_max * own_max;
        node.combined_starting_animation_scale = parent_start * own_start;
    }

    /// Step 6: bake the translation that lands the target-space transform on
    /// integer pixels, remembering it so step 1 can undo it next frame.
    fn update_snapping(&mut self, id: u32) {
        let node = self.tree.node_mut(id);
        if !node.scrolls || node.to_screen_is_animated || !node.to_target.is_scale_or_translation()
        {
            return;
        }
        let sx = node.to_target.cols[0][0];
        let sy = node.to_target.cols[1][1];
        if sx == 0.0 || sy == 0.0 {
            return;
        }
        // Snapping happens in target space (the pixels we care about), so the
        // local-space correction is the rounding delta divided by the scale.
        let t = node.to_target.translation();
        let snap = Vec2::new((t.x.round() - t.x) / sx, (t.y.round() - t.y) / sy);
        node.to_parent.pre_translate(snap);
        node.to_target.pre_translate(snap);
        node.to_screen.pre_translate(snap);
        node.from_target.post_translate(-snap);
        node.from_screen.post_translate(-snap);
        node.snap_amount = snap;
    }

    /// Step 7: propagate the combined integer-translation flag.
    fn update_integer_translation(&mut self, id: u32, parent: Option<&TransformNode>) {
        let parent_flag =
            parent.is_none_or(|p| p.node_and_ancestors_have_only_integer_translation);
        let node = self.tree.node_mut(id);
        node.node_and_ancestors_have_only_integer_translation =
            parent_flag && node.to_parent.is_identity_or_integer_translation();
    }

    // -- Composition --

    /// Computes the transform mapping `source_id`'s space into `dest_id`'s.
    ///
    /// The boolean is false when the path crossed a non-invertible transform
    /// or `dest_id` is not on `source_id`'s ancestor chain (or vice versa);
    /// the returned transform is then best-effort and callers should treat
    /// the path as unusable.
    #[must_use]
    pub fn compute_transform(&self, source_id: u32, dest_id: u32) -> (Transform3d, bool) {
        if source_id == dest_id {
            return (Transform3d::IDENTITY, true);
        }
        if source_id > dest_id {
            self.combine_transforms_between(source_id, dest_id)
        } else {
            self.combine_inverses_between(source_id, dest_id)
        }
    }

    /// Like [`compute_transform`](Self::compute_transform), but folds the
    /// destination's sublayer scale into the result.
    #[must_use]
    pub fn compute_transform_with_destination_sublayer_scale(
        &self,
        source_id: u32,
        dest_id: u32,
    ) -> (Transform3d, bool) {
        let (mut transform, ok) = self.compute_transform(source_id, dest_id);
        let dest = self.tree.node(dest_id);
        if dest.needs_sublayer_scale {
            transform =
                Transform3d::from_scale(dest.sublayer_scale.x, dest.sublayer_scale.y, 1.0)
                    * transform;
        }
        (transform, ok)
    }

    /// Walks up from `source_id` (the deeper node) to `dest_id`.
    fn combine_transforms_between(&self, source_id: u32, dest_id: u32) -> (Transform3d, bool) {
        debug_assert!(source_id > dest_id, "source must be deeper than dest");
        let dest = self.tree.node(dest_id);
        // Flattening is already baked into the screen-space transforms, so
        // when the destination's chain is flat and invertible they compose in
        // O(1). Flattening is not linear, so this shortcut is unavailable
        // otherwise.
        if dest.node_and_ancestors_are_flat && dest.ancestors_are_invertible {
            let source = self.tree.node(source_id);
            return (dest.from_screen * source.to_screen, true);
        }

        // Slow path: collect the chain from source up to the lowest node at
        // or above dest, then replay it in root-to-leaf order, re-applying
        // each node's flattening as it is concatenated.
        let mut chain: Vec<u32> = Vec::new();
        let mut current = source_id;
        while current != INVALID && current > dest_id {
            chain.push(current);
            current = self.tree.node(current).parent_id;
        }
        let landed = current == dest_id;
        let mut combined = Transform3d::IDENTITY;
        let mut all_invertible = true;
        for &nid in chain.iter().rev() {
            let n = self.tree.node(nid);
            if n.flattens_inherited_transform {
                combined.flatten_to_2d();
            }
            combined = combined * n.to_parent;
            all_invertible &= n.is_invertible;
        }
        (combined, landed && all_invertible)
    }

    /// Maps from `source_id` down to `dest_id` (the deeper node).
    ///
    /// Composes dest→source with flattening applied and inverts the result;
    /// inverting per-node and composing the inverses would flatten on the
    /// wrong side.
    fn combine_inverses_between(&self, source_id: u32, dest_id: u32) -> (Transform3d, bool) {
        debug_assert!(dest_id > source_id, "dest must be deeper than source");
        let dest = self.tree.node(dest_id);
        if dest.node_and_ancestors_are_flat && dest.ancestors_are_invertible {
            let source = self.tree.node(source_id);
            return (dest.from_screen * source.to_screen, true);
        }
        let (dest_to_source, landed) = self.combine_transforms_between(dest_id, source_id);
        match dest_to_source.inverse() {
            Some(inverse) => (inverse, landed),
            None => (Transform3d::IDENTITY, false),
        }
    }
}

/// Step 2: derive the screen-space transform and propagate the chain flags.
fn update_screen_space_transform(node: &mut TransformNode, parent: Option<&TransformNode>) {
    match parent {
        None => {
            node.to_screen = node.to_parent;
            node.ancestors_are_invertible = node.is_invertible;
            node.node_and_ancestors_are_flat = node.to_parent.is_flat();
            node.to_screen_is_animated = node.is_animated;
        }
        Some(p) => {
            let mut to_screen = p.to_screen;
            if node.flattens_inherited_transform {
                to_screen.flatten_to_2d();
            }
            node.to_screen = to_screen * node.to_parent;
            node.ancestors_are_invertible = p.ancestors_are_invertible && node.is_invertible;
            node.node_and_ancestors_are_flat =
                p.node_and_ancestors_are_flat && node.to_parent.is_flat();
            node.to_screen_is_animated = p.to_screen_is_animated || node.is_animated;
        }
    }
    match node.to_screen.inverse() {
        Some(inverse) => node.from_screen = inverse,
        None => {
            node.from_screen = Transform3d::IDENTITY;
            node.ancestors_are_invertible = false;
        }
    }
}

/// Step 3: nodes that request a sublayer scale read it off `to_screen`.
fn update_sublayer_scale(node: &mut TransformNode) {
    node.sublayer_scale = if node.needs_sublayer_scale {
        mapper::compute_transform_2d_scale_components(&node.to_screen, 1.0)
    } else {
        Vec2::new(1.0, 1.0)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Transform3d, b: Transform3d, eps: f64) -> bool {
        for j in 0..4 {
            for i in 0..4 {
                if (a.cols[j][i] - b.cols[j][i]).abs() > eps {
                    return false;
                }
            }
        }
        true
    }

    fn tree_with_root() -> (TransformTree, u32) {
        let mut tree = TransformTree::new();
        let root = tree.insert(TransformNode::default(), INVALID);
        (tree, root)
    }

    fn child_of(tree: &mut TransformTree, parent: u32, local: Transform3d) -> u32 {
        let node = TransformNode {
            local,
            ..TransformNode::default()
        };
        tree.insert(node, parent)
    }

    #[test]
    fn screen_space_composes_down_a_chain() {
        let (mut tree, root) = tree_with_root();
        let a = child_of(&mut tree, root, Transform3d::from_translation(10.0, 0.0, 0.0));
        let b = child_of(&mut tree, a, Transform3d::from_translation(0.0, 5.0, 0.0));
        let c = child_of(&mut tree, b, Transform3d::from_scale(2.0, 2.0, 1.0));
        tree.update_all();

        for id in [a, b, c] {
            let node = tree.node(id);
            let parent = tree.node(node.parent_id());
            assert!(
                approx_eq(node.to_screen, parent.to_screen * node.to_parent, 1e-12),
                "screen transform of {id} does not compose"
            );
        }
        assert_eq!(
            tree.node(c).to_screen.translation(),
            Vec2::new(10.0, 5.0)
        );
    }

    #[test]
    fn compute_transform_of_node_with_itself_is_identity() {
        let (mut tree, root) = tree_with_root();
        let a = child_of(&mut tree, root, Transform3d::from_rotation_z(0.5));
        tree.update_all();
        assert_eq!(tree.compute_transform(a, a).0, Transform3d::IDENTITY);
        assert_eq!(tree.compute_transform(root, root).0, Transform3d::IDENTITY);
    }

    #[test]
    fn compute_transform_round_trips_on_invertible_paths() {
        let (mut tree, root) = tree_with_root();
        let a = child_of(&mut tree, root, Transform3d::from_rotation_z(0.7));
        let b = child_of(&mut tree, a, Transform3d::from_scale(2.0, 3.0, 1.0));
        let c = child_of(&mut tree, b, Transform3d::from_translation(4.0, -1.0, 0.0));
        tree.update_all();

        let (down, ok_down) = tree.compute_transform(c, root);
        let (up, ok_up) = tree.compute_transform(root, c);
        assert!(ok_down && ok_up);
        assert!(approx_eq(down * up, Transform3d::IDENTITY, 1e-9));
    }

    #[test]
    fn flattening_drops_inherited_z() {
        let (mut tree, root) = tree_with_root();
        let tilted = child_of(&mut tree, root, Transform3d::from_rotation_x(0.8));
        let flattener = tree.insert(
            TransformNode {
                flattens_inherited_transform: true,
                ..TransformNode::default()
            },
            tilted,
        );
        tree.update_all();

        assert!(!tree.node(tilted).node_and_ancestors_are_flat);
        let mut expected = tree.node(tilted).to_screen;
        expected.flatten_to_2d();
        let node = tree.node(flattener);
        assert!(approx_eq(node.to_screen, expected * node.to_parent, 1e-12));
        // The flattener's own to_parent is flat, but the chain is not: the
        // flag tracks the raw ancestor transforms, not the flattened result.
        assert!(!node.node_and_ancestors_are_flat);
    }

    #[test]
    fn slow_path_replays_flattening_per_node() {
        // With a 3-D ancestor chain the fast path is unusable; the slow path
        // must produce the same result as the baked screen transforms when
        // source maps to the root.
        let (mut tree, root) = tree_with_root();
        let tilted = child_of(&mut tree, root, Transform3d::from_rotation_x(0.8));
        let flattener = tree.insert(
            TransformNode {
                flattens_inherited_transform: true,
                local: Transform3d::from_translation(3.0, 0.0, 0.0),
                ..TransformNode::default()
            },
            tilted,
        );
        tree.update_all();

        let (to_root, ok) = tree.compute_transform(flattener, root);
        assert!(ok);
        assert!(approx_eq(to_root, tree.node(flattener).to_screen, 1e-12));
    }

    #[test]
    fn sublayer_scale_reads_screen_scale() {
        let (mut tree, root) = tree_with_root();
        let scaled = child_of(&mut tree, root, Transform3d::from_scale(3.0, 2.0, 1.0));
        let surface = tree.insert(
            TransformNode {
                needs_sublayer_scale: true,
                ..TransformNode::default()
            },
            scaled,
        );
        let plain = child_of(&mut tree, surface, Transform3d::IDENTITY);
        tree.update_all();

        assert_eq!(tree.node(surface).sublayer_scale, Vec2::new(3.0, 2.0));
        assert_eq!(tree.node(plain).sublayer_scale, Vec2::new(1.0, 1.0));
        // A node defining its own sublayer scale uses it directly as the
        // target-space transform.
        assert_eq!(
            tree.node(surface).to_target,
            Transform3d::from_scale(3.0, 2.0, 1.0)
        );
    }

    #[test]
    fn target_space_folds_in_destination_sublayer_scale() {
        let (mut tree, root) = tree_with_root();
        let scaled = child_of(&mut tree, root, Transform3d::from_scale(2.0, 2.0, 1.0));
        let surface = tree.insert(
            TransformNode {
                needs_sublayer_scale: true,
                ..TransformNode::default()
            },
            scaled,
        );
        let content = tree.insert(
            TransformNode {
                local: Transform3d::from_translation(5.0, 0.0, 0.0),
                target_id: surface,
                ..TransformNode::default()
            },
            surface,
        );
        tree.update_all();

        // content → surface is translate(5), scaled into the surface's
        // doubled space.
        let to_target = tree.node(content).to_target;
        assert!(approx_eq(
            to_target,
            Transform3d::from_scale(2.0, 2.0, 1.0) * Transform3d::from_translation(5.0, 0.0, 0.0),
            1e-12
        ));
    }

    #[test]
    fn non_invertible_local_poisons_descendants() {
        let (mut tree, root) = tree_with_root();
        let squashed = child_of(&mut tree, root, Transform3d::from_scale(0.0, 1.0, 1.0));
        let below = child_of(&mut tree, squashed, Transform3d::IDENTITY);
        tree.update_all();

        assert!(!tree.node(squashed).is_invertible);
        assert!(!tree.node(squashed).ancestors_are_invertible);
        assert!(!tree.node(below).ancestors_are_invertible);
        assert!(tree.node(root).ancestors_are_invertible);
    }

    #[test]
    fn integer_translation_flag_propagates() {
        let (mut tree, root) = tree_with_root();
        let a = child_of(&mut tree, root, Transform3d::from_translation(2.0, 3.0, 0.0));
        let b = child_of(&mut tree, a, Transform3d::from_translation(1.0, -4.0, 0.0));
        let fractional = child_of(&mut tree, b, Transform3d::from_translation(0.5, 0.0, 0.0));
        let below = child_of(&mut tree, fractional, Transform3d::IDENTITY);
        tree.update_all();

        assert!(tree.node(a).node_and_ancestors_have_only_integer_translation);
        assert!(tree.node(b).node_and_ancestors_have_only_integer_translation);
        assert!(!tree.node(fractional).node_and_ancestors_have_only_integer_translation);
        assert!(!tree.node(below).node_and_ancestors_have_only_integer_translation);
    }

    #[test]
    fn snapping_rounds_target_translation() {
        let (mut tree, root) = tree_with_root();
        let scroller = tree.insert(
            TransformNode {
                scrolls: true,
                local: Transform3d::from_translation(10.3, 20.8, 0.0),
                ..TransformNode::default()
            },
            root,
        );
        tree.update_all();

        let node = tree.node(scroller);
        let t = node.to_target.translation();
        let eps = 1e-9;
        assert!((t.x - 10.0).abs() < eps && (t.y - 21.0).abs() < eps);
        assert!((node.snap_amount.x + 0.3).abs() < eps);
        assert!((node.snap_amount.y - 0.2).abs() < eps);
        // to_parent carries the same baked-in snap.
        assert_eq!(node.to_parent.translation(), t);
    }

    #[test]
    fn snapping_is_undone_and_reapplied_on_reupdate() {
        let (mut tree, root) = tree_with_root();
        let scroller = tree.insert(
            TransformNode {
                scrolls: true,
                local: Transform3d::from_translation(10.3, 0.0, 0.0),
                ..TransformNode::default()
            },
            root,
        );
        tree.update_all();
        let first = tree.node(scroller).clone();

        // Re-updating without a local change must undo last frame's snap
        // before re-deriving, landing on the same result.
        tree.update_transforms(scroller);
        let second = tree.node(scroller);
        assert!(approx_eq(first.to_parent, second.to_parent, 1e-9));
        assert!(approx_eq(first.to_target, second.to_target, 1e-9));
        assert!((first.snap_amount.x - second.snap_amount.x).abs() < 1e-9);
        assert!((first.snap_amount.y - second.snap_amount.y).abs() < 1e-9);
    }

    #[test]
    fn snapping_skipped_while_animated() {
        let (mut tree, root) = tree_with_root();
        let scroller = tree.insert(
            TransformNode {
                scrolls: true,
                is_animated: true,
                local: Transform3d::from_translation(10.3, 0.0, 0.0),
                ..TransformNode::default()
            },
            root,
        );
        tree.update_all();

        let node = tree.node(scroller);
        assert_eq!(node.to_target.translation(), Vec2::new(10.3, 0.0));
        assert_eq!(node.snap_amount, Vec2::ZERO);
    }

    #[test]
    fn scroll_offset_shifts_local_transform() {
        let (mut tree, root) = tree_with_root();
        let scroller = child_of(&mut tree, root, Transform3d::IDENTITY);
        tree.update_all();

        tree.set_scroll_offset(scroller, Vec2::new(0.0, 100.0));
        tree.update_all();
        assert_eq!(
            tree.node(scroller).to_screen.translation(),
            Vec2::new(0.0, -100.0)
        );
    }

    #[test]
    fn animation_scale_combines_with_ancestors() {
        let (mut tree, root) = tree_with_root();
        let animated = child_of(&mut tree, root, Transform3d::IDENTITY);
        let scaled_child = child_of(&mut tree, animated, Transform3d::from_scale(2.0, 1.5, 1.0));
        tree.set_scale_animation(animated, 4.0, 1.0);
        tree.update_all();

        assert_eq!(tree.node(animated).combined_maximum_animation_scale, 4.0);
        // Child contributes its own static scale (max component) on top.
        assert_eq!(tree.node(scaled_child).combined_maximum_animation_scale, 8.0);
        assert!(!tree.node(scaled_child).animation_scale_unknown);
    }

    #[test]
    fn two_scale_animations_on_one_chain_give_up() {
        let (mut tree, root) = tree_with_root();
        let outer = child_of(&mut tree, root, Transform3d::IDENTITY);
        let inner = child_of(&mut tree, outer, Transform3d::IDENTITY);
        tree.set_scale_animation(outer, 2.0, 1.0);
        tree.set_scale_animation(inner, 3.0, 1.0);
        tree.update_all();

        assert!(!tree.node(outer).animation_scale_unknown);
        assert!(tree.node(inner).animation_scale_unknown);
        assert_eq!(tree.node(inner).combined_maximum_animation_scale, 0.0);
    }

    #[test]
    fn rotated_target_transform_gives_up_on_animation_scale() {
        let (mut tree, root) = tree_with_root();
        let rotated = child_of(&mut tree, root, Transform3d::from_rotation_z(0.5));
        tree.update_all();
        assert!(tree.node(rotated).animation_scale_unknown);
    }

    #[test]
    fn update_all_is_incremental() {
        let (mut tree, root) = tree_with_root();
        let a = child_of(&mut tree, root, Transform3d::from_translation(1.0, 0.0, 0.0));
        let b = child_of(&mut tree, a, Transform3d::IDENTITY);
        let unrelated = child_of(&mut tree, root, Transform3d::IDENTITY);

        let first = tree.update_all();
        assert_eq!(first, alloc::vec![root, a, b, unrelated]);

        // Nothing dirty: nothing updates.
        assert!(tree.update_all().is_empty());

        // Touching `a` re-derives `a` and its subtree, not the sibling.
        tree.set_local_transform(a, Transform3d::from_translation(2.0, 0.0, 0.0));
        let updated = tree.update_all();
        assert!(updated.contains(&a));
        assert!(updated.contains(&b));
        assert!(!updated.contains(&unrelated));
        assert_eq!(tree.node(b).to_screen.translation(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn viewport_bounds_delta_moves_registered_nodes() {
        let (mut tree, root) = tree_with_root();
        let anchored = child_of(&mut tree, root, Transform3d::from_translation(0.0, 50.0, 0.0));
        let mut node = TransformNode::default();
        node.moved_by_viewport_bounds_delta_y = true;
        let bottom_bar = tree.insert(node, anchored);
        tree.register_affected_by_viewport_bounds_delta(bottom_bar);
        tree.update_all();
        assert_eq!(
            tree.node(bottom_bar).to_screen.translation(),
            Vec2::new(0.0, 50.0)
        );

        tree.set_viewport_bounds_delta(Vec2::new(0.0, -12.0));
        let updated = tree.update_all();
        assert!(updated.contains(&bottom_bar));
        assert_eq!(
            tree.node(bottom_bar).to_screen.translation(),
            Vec2::new(0.0, 38.0)
        );
    }

    #[test]
    fn clear_rebuilds_from_scratch() {
        let (mut tree, root) = tree_with_root();
        let _a = child_of(&mut tree, root, Transform3d::IDENTITY);
        tree.update_all();
        tree.clear();
        assert!(tree.is_empty());
        let new_root = tree.insert(TransformNode::default(), INVALID);
        assert_eq!(new_root, 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "updated before its parent")]
    fn out_of_order_update_asserts_in_debug() {
        let (mut tree, root) = tree_with_root();
        let a = child_of(&mut tree, root, Transform3d::IDENTITY);
        let b = child_of(&mut tree, a, Transform3d::IDENTITY);
        tree.update_all();
        tree.set_local_transform(a, Transform3d::from_translation(1.0, 0.0, 0.0));
        // Updating the child while the parent still has a pending local
        // update violates the ordering contract.
        tree.update_transforms(b);
    }
}
