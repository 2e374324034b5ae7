mod node;
mod inorder;
mod navigate;
mod rotate;
mod balance;
mod validate;

pub use node::*;
pub use inorder::*;
pub use validate::InvariantViolation;

use std::fmt;
use std::borrow::Borrow;
use std::iter::FromIterator;

use log::debug;

use crate::slab::{Ptr, Slab};

#[derive(Debug, Clone, PartialEq, Eq)]
struct InnerNode<K, V> {
    key: K,
    value: V,
    color: Color,
    left: Option<Ptr>,
    right: Option<Ptr>,
    parent: Option<Ptr>,
}

impl<K, V> InnerNode<K, V> {
    /// New nodes always start out as red leaves
    fn new(key: K, value: V, parent: Option<Ptr>) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            left: None,
            right: None,
            parent,
        }
    }

    fn child(&self, side: Side) -> Option<Ptr> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn set_child(&mut self, side: Side, child: Option<Ptr>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// Which child slot of a node something hangs off of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// An ordered map backed by a red-black tree
///
/// BST properties: For each node with key `k`:
/// - The key of each node in the left subtree is less than or equal to `k`
/// - The key of each node in the right subtree is greater than or equal to `k`
///
/// Inserting a key that is already present does **not** replace the existing entry. Both entries
/// are kept, and the new one is routed into the right subtree of the old one. Later rotations may
/// move equal keys to either side, so only the in-order sequence is guaranteed to be sorted.
///
/// Red-black properties: the root is black, a red node never has a red child, and every path from
/// a node down to a missing child passes through the same number of black nodes. Together these
/// keep the height of the tree below `2 * log2(n + 1)`, so every operation is `O(log n)`.
///
/// Nodes live in a slab and refer to each other (including their parent) by index, so the tree
/// owns all of its nodes in a single allocation and no reference counting is involved.
#[derive(Clone)]
pub struct RBTreeMap<K, V> {
    nodes: Slab<InnerNode<K, V>>,
    root: Option<Ptr>,
}

impl<K, V> Default for RBTreeMap<K, V> {
    fn default() -> Self {
        Self {
            nodes: Slab::default(),
            root: None,
        }
    }
}

impl<K, V> fmt::Debug for RBTreeMap<K, V>
    where K: fmt::Debug,
          V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RBTreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        // Two maps holding the same entries can be shaped differently depending on the order of
        // insertions and removals, so compare their in-order sequences instead of their structure.
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for RBTreeMap<K, V> {}

impl<K, V> RBTreeMap<K, V> {
    /// Creates an empty `RBTreeMap`
    ///
    /// The map is initially created with a capacity of 0, so it will not allocate until it is first
    /// inserted into.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    /// let mut map: RBTreeMap<&str, i32> = RBTreeMap::new();
    /// ```
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
        }
    }

    /// Creates an empty map with the specified capacity.
    ///
    /// The map will be able to hold at least `capacity` elements without reallocating. If
    /// `capacity` is 0, the map will not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    /// let mut map: RBTreeMap<&str, i32> = RBTreeMap::with_capacity(10);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of entries in the map (i.e. the number of nodes in the tree)
    ///
    /// Time complexity: `O(1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of elements the map can hold without reallocating.
    ///
    /// This number is a lower bound; the map might be able to hold more, but is guaranteed to be
    /// able to hold at least this many.
    ///
    /// Time complexity: `O(1)`
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns true if the map is empty
    ///
    /// Time complexity: `O(1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert!(map.is_empty());
    /// map.insert(1, "a");
    /// assert!(!map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.nodes.is_empty(), self.root.is_none());
        self.nodes.is_empty()
    }

    /// Clears the map, removing all entries
    ///
    /// Every node is dropped exactly once. Teardown walks the node storage directly rather than the
    /// tree, so it never recurses.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert!(!map.is_empty());
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns the entry with the smallest key, or `None` if the map is empty
    ///
    /// If the smallest key was inserted more than once, any one of those entries may be returned.
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert_eq!(map.min(), None);
    /// map.insert(5, "b");
    /// map.insert(3, "a");
    /// assert_eq!(map.min(), Some((&3, &"a")));
    /// ```
    pub fn min(&self) -> Option<(&K, &V)> {
        self.subtree_min(self.root).map(|ptr| self.entry(ptr))
    }

    /// Returns the entry with the largest key, or `None` if the map is empty
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// assert_eq!(map.max(), None);
    /// map.insert(5, "b");
    /// map.insert(3, "a");
    /// assert_eq!(map.max(), Some((&5, &"b")));
    /// ```
    pub fn max(&self) -> Option<(&K, &V)> {
        self.subtree_max(self.root).map(|ptr| self.entry(ptr))
    }

    /// Returns the height of the tree: the number of nodes on its longest root-to-leaf path
    ///
    /// An empty map has height 0. A valid red-black tree with `n` entries never has a height
    /// greater than `2 * log2(n + 1)`.
    ///
    /// Time complexity: `O(n)`
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(Ptr, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((ptr, depth)) = stack.pop() {
            height = height.max(depth);

            let node = &self.nodes[ptr];
            stack.extend(node.left.map(|left| (left, depth + 1)));
            stack.extend(node.right.map(|right| (right, depth + 1)));
        }

        height
    }

    /// Returns an iterator over the entries of the map, sorted by key
    ///
    /// Entries with equal keys are yielded next to each other. Each call starts a fresh traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(3, "c");
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let keys: Vec<_> = map.iter().map(|(key, _)| *key).collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> IterInorder<'_, K, V> {
        IterInorder::new(&self.nodes, self.root)
    }

    /// Returns the root node of the tree, or `None` if the tree is empty
    ///
    /// Note that the root can be **any** node inserted into the tree and changes as the tree
    /// rebalances itself. For a guaranteed ordering, use `iter`.
    ///
    /// This is a low-level API meant for inspecting the shape and coloring of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::{RBTreeMap, map::Color};
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// map.insert(3, "c");
    ///
    /// // Ascending inserts get rotated so that the middle key ends up on top
    /// let root = map.root().unwrap();
    /// assert_eq!(root.key(), &2);
    /// assert_eq!(root.color(), Color::Black);
    /// assert_eq!(root.left().map(|node| node.color()), Some(Color::Red));
    /// ```
    pub fn root(&self) -> Option<Node<'_, K, V>> {
        self.root.map(|ptr| Node::new(&self.nodes, ptr))
    }

    fn entry(&self, ptr: Ptr) -> (&K, &V) {
        let node = &self.nodes[ptr];
        (&node.key, &node.value)
    }
}

impl<K: Ord, V> RBTreeMap<K, V> {
    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering on the borrowed
    /// form must match the ordering on the key type.
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns a reference to the value corresponding to the given key, or `None` if no such key
    /// exists in the map
    ///
    /// If the key was inserted more than once, the value of the entry closest to the root is
    /// returned.
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.find(key).map(|ptr| &self.nodes[ptr].value)
    }

    /// Returns the key-value pair corresponding to the given key, or `None` if no such key exists
    /// in the map
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get_key_value(&1), Some((&1, &"a")));
    /// assert_eq!(map.get_key_value(&2), None);
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.find(key).map(|ptr| self.entry(ptr))
    }

    /// Inserts a new entry into the map
    ///
    /// Existing entries are never overwritten. If `key` is already present, the map ends up
    /// holding both entries. Use `remove` followed by `insert` to replace a value.
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(37, "a");
    /// map.insert(37, "b");
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(ptr) = current {
            let node = &self.nodes[ptr];
            // Equal keys go right
            side = if key < node.key { Side::Left } else { Side::Right };
            parent = Some(ptr);
            current = node.child(side);
        }

        let ptr = self.nodes.push(InnerNode::new(key, value, parent));
        match parent {
            Some(parent) => self.nodes[parent].set_child(side, Some(ptr)),
            None => self.root = Some(ptr),
        }

        self.insert_fixup(ptr);
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in the
    /// map.
    ///
    /// Removing a key that is not present leaves the map untouched. If the key was inserted more
    /// than once, only one of its entries is removed.
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let ptr = match self.find(key) {
            Some(ptr) => ptr,
            None => {
                debug!("remove: key not present, tree left unchanged");
                return None;
            },
        };

        self.unlink(ptr);

        self.nodes.remove(ptr).map(|node| node.value)
    }

    /// Returns the entry that comes right before `key` in sorted order, or `None` if `key` is not
    /// in the map or is the smallest key
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let map: RBTreeMap<_, _> = vec![(10, "a"), (20, "b"), (30, "c")].into_iter().collect();
    /// assert_eq!(map.predecessor(&20), Some((&10, &"a")));
    /// assert_eq!(map.predecessor(&10), None);
    /// assert_eq!(map.predecessor(&15), None);
    /// ```
    pub fn predecessor<Q>(&self, key: &Q) -> Option<(&K, &V)>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let ptr = self.find(key)?;
        self.predecessor_of(ptr).map(|ptr| self.entry(ptr))
    }

    /// Returns the entry that comes right after `key` in sorted order, or `None` if `key` is not
    /// in the map or is the largest key
    ///
    /// Time complexity: `O(log n)`
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let map: RBTreeMap<_, _> = vec![(10, "a"), (20, "b"), (30, "c")].into_iter().collect();
    /// assert_eq!(map.successor(&20), Some((&30, &"c")));
    /// assert_eq!(map.successor(&30), None);
    /// assert_eq!(map.successor(&25), None);
    /// ```
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let ptr = self.find(key)?;
        self.successor_of(ptr).map(|ptr| self.entry(ptr))
    }

    /// Detaches the node `z` from the tree and restores the red-black properties
    ///
    /// The node stays in `self.nodes`. The caller is responsible for releasing it.
    fn unlink(&mut self, z: Ptr) {
        let InnerNode {left, right, parent, color, ..} = self.nodes[z];

        // The node that moves into the position that lost a black node (if any), and its parent.
        // The parent has to be tracked separately since `x` may be "no node".
        let x;
        let x_parent;
        let mut removed_color = color;

        match (left, right) {
            (None, _) => {
                x = right;
                x_parent = parent;
                self.transplant(z, right);
            },

            (Some(_), None) => {
                x = left;
                x_parent = parent;
                self.transplant(z, left);
            },

            (Some(left), Some(right)) => {
                // The in-order successor takes the place of `z`. It has no left child.
                let y = self.min_from(right);
                removed_color = self.nodes[y].color;
                x = self.nodes[y].right;

                if self.nodes[y].parent == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.nodes[y].parent;
                    self.transplant(y, x);
                    self.nodes[y].right = Some(right);
                    self.nodes[right].parent = Some(y);
                }

                self.transplant(z, Some(y));
                self.nodes[y].left = Some(left);
                self.nodes[left].parent = Some(y);
                self.nodes[y].color = color;
            },
        }

        if removed_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a RBTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = IterInorder<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> Extend<(K, V)> for RBTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RBTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
