use std::ptr;
use std::fmt;

use crate::slab::{Ptr, Slab};

use super::InnerNode;

/// The color of a node in a red-black tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// A single node of the red-black tree
///
/// This is a read-only view. Keys and values cannot be modified in place, and the links can only
/// be followed, never rewritten.
pub struct Node<'a, K, V> {
    nodes: &'a Slab<InnerNode<K, V>>,
    ptr: Ptr,
}

impl<'a, K, V> fmt::Debug for Node<'a, K, V>
    where K: fmt::Debug,
          V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", self.key())
            .field("value", self.value())
            .field("color", &self.color())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<'a, K, V> Clone for Node<'a, K, V> {
    fn clone(&self) -> Self {
        Self {..*self}
    }
}

impl<'a, K, V> Copy for Node<'a, K, V> {}

impl<'a, K: PartialEq, V: PartialEq> PartialEq for Node<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        // If the pointers are the same, the values are guaranteed to be equal (similar to `Arc`
        // using `ptr_eq` to optimize its `PartialEq` impl)
        let ptr_eq = ptr::eq(self.nodes, other.nodes) && self.ptr == other.ptr;
        ptr_eq || (self.key().eq(other.key()) && self.value().eq(other.value()))
    }
}

impl<'a, K: Eq, V: Eq> Eq for Node<'a, K, V> {}

impl<'a, K, V> Node<'a, K, V> {
    /// `ptr` must point at an occupied entry of `nodes`
    pub(super) fn new(nodes: &'a Slab<InnerNode<K, V>>, ptr: Ptr) -> Self {
        Self {nodes, ptr}
    }

    fn inner(&self) -> &'a InnerNode<K, V> {
        &self.nodes[self.ptr]
    }

    /// Returns the key of this node
    pub fn key(&self) -> &'a K {
        &self.inner().key
    }

    /// Returns the value of this node
    pub fn value(&self) -> &'a V {
        &self.inner().value
    }

    /// Returns the color of this node
    pub fn color(&self) -> Color {
        self.inner().color
    }

    /// Returns true if this node is red
    pub fn is_red(&self) -> bool {
        self.color() == Color::Red
    }

    /// Returns the left child node (subtree) of this node, if any
    pub fn left(&self) -> Option<Self> {
        self.link(self.inner().left)
    }

    /// Returns the right child node (subtree) of this node, if any
    pub fn right(&self) -> Option<Self> {
        self.link(self.inner().right)
    }

    /// Returns the parent of this node, or `None` for the root
    pub fn parent(&self) -> Option<Self> {
        self.link(self.inner().parent)
    }

    fn link(&self, ptr: Option<Ptr>) -> Option<Self> {
        // Nodes only contain pointers to other nodes within `self.nodes`
        ptr.map(|ptr| Self::new(self.nodes, ptr))
    }
}
