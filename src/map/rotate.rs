//! Shape-changing primitives
//!
//! Rotations never change the in-order sequence of the tree. `transplant` is the only place where
//! the link pointing *at* a node (from its parent or from the root) gets rewritten.

use log::trace;

use crate::slab::Ptr;

use super::{RBTreeMap, Side};

impl<K, V> RBTreeMap<K, V> {
    /// Returns which child of its parent `ptr` is, or `None` for the root
    pub(super) fn side_of(&self, ptr: Ptr) -> Option<Side> {
        let parent = self.nodes[ptr].parent?;
        if self.nodes[parent].left == Some(ptr) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// Puts `v` in the position of `u` as seen from `u`'s parent
    ///
    /// The children of `u` and `v` are left alone. Callers must reattach them.
    pub(super) fn transplant(&mut self, u: Ptr, v: Option<Ptr>) {
        let parent = self.nodes[u].parent;
        match (parent, self.side_of(u)) {
            (Some(parent), Some(side)) => self.nodes[parent].set_child(side, v),
            _ => self.root = v,
        }

        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    /// Moves `x` down toward `side`, lifting its child on the other side into its place
    ///
    /// ```text
    ///     x      rotate(x, Left)       y
    ///    / \     -------------->      / \
    ///   a   y                        x   c
    ///      / \   <--------------    / \
    ///     b   c  rotate(y, Right)  a   b
    /// ```
    ///
    /// Does nothing if `x` has no child on the other side.
    pub(super) fn rotate(&mut self, x: Ptr, side: Side) {
        let pivot = self.nodes[x].child(side.opposite());
        debug_assert!(pivot.is_some(), "rotation pivot is missing");
        let y = match pivot {
            Some(y) => y,
            None => return,
        };
        trace!("rotate {:?} at {:?}", side, x);

        // `b` in the picture above changes parents
        let inner = self.nodes[y].child(side);
        self.nodes[x].set_child(side.opposite(), inner);
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }

        self.transplant(x, Some(y));

        self.nodes[y].set_child(side, Some(x));
        self.nodes[x].parent = Some(y);
    }
}
