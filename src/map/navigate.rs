//! Read-only walks over the tree
//!
//! None of these mutate the tree or panic on a missing node. "No node" is always `None`.

use std::cmp::Ordering;
use std::borrow::Borrow;

use crate::slab::Ptr;

use super::RBTreeMap;

impl<K, V> RBTreeMap<K, V> {
    /// Returns the node with the smallest key in the subtree rooted at `root`
    pub(super) fn min_from(&self, mut root: Ptr) -> Ptr {
        while let Some(left) = self.nodes[root].left {
            root = left;
        }

        root
    }

    /// Returns the node with the largest key in the subtree rooted at `root`
    pub(super) fn max_from(&self, mut root: Ptr) -> Ptr {
        while let Some(right) = self.nodes[root].right {
            root = right;
        }

        root
    }

    pub(super) fn subtree_min(&self, root: Option<Ptr>) -> Option<Ptr> {
        root.map(|root| self.min_from(root))
    }

    pub(super) fn subtree_max(&self, root: Option<Ptr>) -> Option<Ptr> {
        root.map(|root| self.max_from(root))
    }

    /// Returns the node that comes right before `ptr` in an in-order traversal
    pub(super) fn predecessor_of(&self, ptr: Ptr) -> Option<Ptr> {
        if let Some(left) = self.nodes[ptr].left {
            return Some(self.max_from(left));
        }

        // No left subtree, so the predecessor is the first ancestor that has the current node in
        // its right subtree
        let mut current = ptr;
        let mut parent = self.nodes[ptr].parent;
        while let Some(parent_ptr) = parent {
            if self.nodes[parent_ptr].left != Some(current) {
                break;
            }

            current = parent_ptr;
            parent = self.nodes[parent_ptr].parent;
        }

        parent
    }

    /// Returns the node that comes right after `ptr` in an in-order traversal
    pub(super) fn successor_of(&self, ptr: Ptr) -> Option<Ptr> {
        if let Some(right) = self.nodes[ptr].right {
            return Some(self.min_from(right));
        }

        let mut current = ptr;
        let mut parent = self.nodes[ptr].parent;
        while let Some(parent_ptr) = parent {
            if self.nodes[parent_ptr].right != Some(current) {
                break;
            }

            current = parent_ptr;
            parent = self.nodes[parent_ptr].parent;
        }

        parent
    }
}

impl<K: Ord, V> RBTreeMap<K, V> {
    /// Returns the first node on the search path whose key equals `key`
    pub(super) fn find<Q>(&self, key: &Q) -> Option<Ptr>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(ptr) = current {
            let node = &self.nodes[ptr];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => return Some(ptr),
            }
        }

        None
    }
}
