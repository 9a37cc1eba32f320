// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Append-only indexed forest shared by the three property trees.

use alloc::vec::Vec;

/// Sentinel index meaning "no node".
///
/// Only the synthetic root at index 0 has [`INVALID`] as its parent.
pub const INVALID: u32 = u32::MAX;

/// A node storable in a [`PropertyTree`].
pub trait ForestNode {
    /// The node's own index in the tree.
    fn id(&self) -> u32;
    /// Writes the node's index. Called once by [`PropertyTree::insert`].
    fn set_id(&mut self, id: u32);
    /// The parent's index, or [`INVALID`] for the root.
    fn parent_id(&self) -> u32;
    /// Writes the parent index. Called once by [`PropertyTree::insert`].
    fn set_parent_id(&mut self, parent_id: u32);
}

/// A growable, append-only array of tree nodes addressed by index.
///
/// Nodes are inserted strictly after their parent and never individually
/// freed; structural change tears the whole tree down ([`clear`]) and
/// rebuilds it. This gives the one invariant every algorithm in this crate
/// leans on: a node's parent id is always strictly less than its own id, so
/// ascending-id iteration visits parents before children. Relationships are
/// integer ids, never references, which is what makes structural cloning of
/// a whole tree cheap and safe.
///
/// [`clear`]: PropertyTree::clear
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyTree<T> {
    nodes: Vec<T>,
}

impl<T: ForestNode> PropertyTree<T> {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Appends a node as a child of `parent_id` and returns its id.
    ///
    /// The first inserted node is the root and must use [`INVALID`] as its
    /// parent.
    ///
    /// # Panics
    ///
    /// Panics if `parent_id` does not precede the new node (the root's
    /// parent excepted), which would break the parent-before-child ordering
    /// invariant.
    pub fn insert(&mut self, mut node: T, parent_id: u32) -> u32 {
        let id = u32::try_from(self.nodes.len()).expect("tree exceeds u32 ids");
        if id == 0 {
            assert!(
                parent_id == INVALID,
                "the first node is the root and has no parent"
            );
        } else {
            assert!(
                parent_id < id,
                "parent id {parent_id} must precede child id {id}"
            );
        }
        node.set_id(id);
        node.set_parent_id(parent_id);
        self.nodes.push(node);
        id
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> u32 {
        // Insertion already refuses to grow past u32 ids.
        u32::try_from(self.nodes.len()).expect("tree exceeds u32 ids")
    }

    /// Is the tree empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn node(&self, id: u32) -> &T {
        &self.nodes[id as usize]
    }

    /// Mutable access to the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn node_mut(&mut self, id: u32) -> &mut T {
        &mut self.nodes[id as usize]
    }

    /// Returns the parent of `node`, or `None` for the root.
    #[must_use]
    pub fn parent(&self, node: &T) -> Option<&T> {
        let p = node.parent_id();
        if p == INVALID {
            None
        } else {
            Some(self.node(p))
        }
    }

    /// Returns the most recently inserted node, if any.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.nodes.last()
    }

    /// Iterates over the nodes in id (parent-before-child) order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.nodes.iter()
    }

    /// Tears the whole tree down for a wholesale rebuild.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
