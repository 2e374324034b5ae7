use std::fmt;
use std::cmp::Ordering;
use std::borrow::Borrow;
use std::iter::FromIterator;

mod node;
mod inorder;

pub use node::*;
pub use inorder::*;

type Link<K, V> = Option<Box<Node<K, V>>>;

/// A "simple" BST that uses `Box` for internal storage and never rebalances itself
///
/// Used to test and benchmark the `rbmap` crate. Like `RBTreeMap`, inserting a key that is already
/// present keeps both entries, with the new one going into the right subtree.
#[derive(Clone)]
pub struct SimpleBSTMap<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Default for SimpleBSTMap<K, V> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
        }
    }
}

impl<K, V> Drop for SimpleBSTMap<K, V> {
    fn drop(&mut self) {
        // The default drop glue would recurse once per level, and a degenerate tree can be as deep
        // as it is long
        let mut stack: Vec<_> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.take_left());
            stack.extend(node.take_right());
        }
    }
}

impl<K, V> fmt::Debug for SimpleBSTMap<K, V>
    where K: fmt::Debug,
          V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter_inorder()).finish()
    }
}

impl<K: Ord + PartialEq, V: PartialEq> PartialEq for SimpleBSTMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        // We can't just compare the binary trees structurally, since they may be structured
        // differently while still having all the same elements (e.g. if insertion order is
        // different). Instead, we use in-order traversal since we know that that is guaranteed to
        // produce the elements in sorted order. If their sorted orders are equal, the maps are
        // equal.

        if self.len() != other.len() {
            return false;
        }

        self.iter_inorder().zip(other.iter_inorder()).all(|((k1, v1), (k2, v2))| {
            k1.eq(k2) && v1.eq(v2)
        })
    }
}

impl<K: Ord + Eq, V: Eq> Eq for SimpleBSTMap<K, V> {}

impl<K, V> SimpleBSTMap<K, V> {
    /// Performs an in-order traversal of the tree
    pub fn iter_inorder(&self) -> IterInorder<'_, K, V> {
        IterInorder::new(self.root())
    }

    /// Returns the root node of the tree, or `None` if the tree is empty
    ///
    /// The root is always the first key that was inserted and not yet removed, or the successor
    /// that replaced it. For a guaranteed ordering, use `iter_inorder`.
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root.as_deref()
    }
}

impl<K: Ord, V> SimpleBSTMap<K, V> {
    /// Creates an empty `SimpleBSTMap`
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    /// let mut map: SimpleBSTMap<&str, i32> = SimpleBSTMap::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries in the map (i.e. the number of nodes in the binary search
    /// tree)
    ///
    /// Time complexity: `O(1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map is empty
    ///
    /// Time complexity: `O(1)`
    pub fn is_empty(&self) -> bool {
        debug_assert!(self.len != 0 || self.root.is_none());
        self.len == 0
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering on the borrowed
    /// form must match the ordering on the key type.
    ///
    /// Time complexity: `O(h)` where `h` is the height of the tree
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
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
    /// exists in the binary search tree
    ///
    /// Time complexity: `O(h)` where `h` is the height of the tree
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.find(key).map(|node| node.value())
    }

    fn find<Q>(&self, key: &Q) -> Option<&Node<K, V>>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut current = self.root();
        while let Some(node) = current {
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some(node),
            }
        }

        None
    }

    /// Inserts a new entry into the binary search tree
    ///
    /// Existing entries are never overwritten: an equal key is placed in the right subtree of the
    /// entry that is already there.
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
    /// map.insert(37, "a");
    /// map.insert(37, "b");
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = if key < *node.key() {
                node.left_link_mut()
            } else {
                node.right_link_mut()
            };
        }

        *link = Some(Box::new(Node::new(key, value)));
        self.len += 1;
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in the
    /// map.
    ///
    /// A node with two children is replaced by its in-order successor.
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        // Compare through a shared borrow first so that `link` is only reborrowed mutably on the
        // paths that move it further down
        let mut link = &mut self.root;
        loop {
            let ordering = match link.as_deref() {
                Some(node) => key.cmp(node.key().borrow()),
                None => return None,
            };

            match ordering {
                Ordering::Equal => break,
                Ordering::Less => match link {
                    Some(node) => link = node.left_link_mut(),
                    None => return None,
                },
                Ordering::Greater => match link {
                    Some(node) => link = node.right_link_mut(),
                    None => return None,
                },
            }
        }

        let mut node = link.take()?;
        *link = match (node.take_left(), node.take_right()) {
            (None, right) => right,
            (left, None) => left,
            (Some(left), Some(right)) => {
                let mut right = Some(right);
                let mut successor = detach_min(&mut right)?;
                *successor.left_link_mut() = Some(left);
                *successor.right_link_mut() = right;
                Some(successor)
            },
        };

        self.len -= 1;
        let (_, value) = node.into_inner();
        Some(value)
    }

    /// Returns the entry with the smallest key, or `None` if the map is empty
    pub fn min(&self) -> Option<(&K, &V)> {
        self.root().map(|root| root.leftmost().entry())
    }

    /// Returns the entry with the largest key, or `None` if the map is empty
    pub fn max(&self) -> Option<(&K, &V)> {
        self.root().map(|root| root.rightmost().entry())
    }

    /// Returns the entry that comes right before `key` in sorted order, or `None` if `key` is not
    /// in the map or is the smallest key
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let map: SimpleBSTMap<_, _> = vec![(20, "b"), (10, "a"), (30, "c")].into_iter().collect();
    /// assert_eq!(map.predecessor(&20), Some((&10, &"a")));
    /// assert_eq!(map.predecessor(&10), None);
    /// ```
    pub fn predecessor<Q>(&self, key: &Q) -> Option<(&K, &V)>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        // Without parent links, the nearest ancestor we went right from is the fallback
        let mut last_right_turn = None;
        let mut current = self.root();
        while let Some(node) = current {
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    last_right_turn = Some(node);
                    current = node.right();
                },
                Ordering::Equal => {
                    let found = node.left().map(Node::rightmost).or(last_right_turn);
                    return found.map(Node::entry);
                },
            }
        }

        None
    }

    /// Returns the entry that comes right after `key` in sorted order, or `None` if `key` is not
    /// in the map or is the largest key
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let map: SimpleBSTMap<_, _> = vec![(20, "b"), (10, "a"), (30, "c")].into_iter().collect();
    /// assert_eq!(map.successor(&20), Some((&30, &"c")));
    /// assert_eq!(map.successor(&30), None);
    /// ```
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut last_left_turn = None;
        let mut current = self.root();
        while let Some(node) = current {
            match key.cmp(node.key().borrow()) {
                Ordering::Less => {
                    last_left_turn = Some(node);
                    current = node.left();
                },
                Ordering::Greater => current = node.right(),
                Ordering::Equal => {
                    let found = node.right().map(Node::leftmost).or(last_left_turn);
                    return found.map(Node::entry);
                },
            }
        }

        None
    }

    /// Clears the map, removing all elements
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
    /// map.insert(1, "a");
    /// assert!(!map.is_empty());
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Unlinks the node with the smallest key from the subtree owned by `link`
///
/// Its right subtree takes its place.
fn detach_min<K, V>(mut link: &mut Link<K, V>) -> Link<K, V> {
    while link.as_ref().map_or(false, |node| node.left().is_some()) {
        match link {
            Some(node) => link = node.left_link_mut(),
            None => break,
        }
    }

    let mut min = link.take()?;
    *link = min.take_right();
    Some(min)
}

impl<K: Ord, V> Extend<(K, V)> for SimpleBSTMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SimpleBSTMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use rand::prelude::*;

    fn keys(map: &SimpleBSTMap<i32, i32>) -> Vec<i32> {
        map.iter_inorder().map(|(&k, _)| k).collect()
    }

    #[test]
    fn test_map_insert_get() {
        let mut map = SimpleBSTMap::new();

        assert_eq!(map.get(&3), None);
        map.insert(3, 1);
        assert_eq!(map.get(&3), Some(&1));

        assert_eq!(map.get(&4), None);
        map.insert(4, -2);
        assert_eq!(map.get(&3), Some(&1));
        assert_eq!(map.get(&4), Some(&-2));

        assert_eq!(map.get(&0), None);
        map.insert(0, 44);
        assert_eq!(map.get(&3), Some(&1));
        assert_eq!(map.get(&4), Some(&-2));
        assert_eq!(map.get(&0), Some(&44));
    }

    #[test]
    fn test_map_insert_duplicate() {
        let mut map = SimpleBSTMap::new();

        map.insert(3, 1);
        map.insert(3, 933);
        map.insert(3, 11);

        // The first entry stays closest to the root
        assert_eq!(map.get(&3), Some(&1));
        assert_eq!(map.len(), 3);

        assert_eq!(map.remove(&3), Some(1));
        assert_eq!(map.get(&3), Some(&933));
        assert_eq!(map.remove(&3), Some(933));
        assert_eq!(map.remove(&3), Some(11));
        assert_eq!(map.remove(&3), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_map_insert_get_borrow() {
        let mut map: SimpleBSTMap<String, _> = SimpleBSTMap::new();

        assert_eq!(map.get("abc"), None);
        map.insert("abc".to_string(), 1);
        assert_eq!(map.get("abc"), Some(&1));

        assert_eq!(map.get("COOL"), None);
        map.insert("COOL".to_string(), 3);
        assert_eq!(map.get("abc"), Some(&1));
        assert_eq!(map.get("COOL"), Some(&3));

        assert_eq!(map.remove("abc"), Some(1));
        assert!(!map.contains_key("abc"));
        assert!(map.contains_key("COOL"));
    }

    #[test]
    fn remove_each_shape() {
        //        20
        //     10    30
        //   5   15    40
        //            35
        let mut map: SimpleBSTMap<_, _> = [20, 10, 30, 5, 15, 40, 35].iter()
            .map(|&k| (k, k))
            .collect();

        // Leaf
        assert_eq!(map.remove(&5), Some(5));
        assert_eq!(keys(&map), [10, 15, 20, 30, 35, 40]);
        // Only a right child
        assert_eq!(map.remove(&30), Some(30));
        assert_eq!(map.root().and_then(|root| root.right()).map(|node| *node.key()), Some(40));
        // Two children, successor is deeper than the right child
        map.insert(45, 45);
        assert_eq!(map.remove(&20), Some(20));
        assert_eq!(map.root().map(|root| *root.key()), Some(35));
        assert_eq!(keys(&map), [10, 15, 35, 40, 45]);
        // Two children, successor is the right child
        assert_eq!(map.remove(&35), Some(35));
        assert_eq!(map.root().map(|root| *root.key()), Some(40));
        assert_eq!(keys(&map), [10, 15, 40, 45]);

        assert_eq!(map.len(), 4);
        assert_eq!(map.remove(&99), None);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn min_max_neighbours() {
        let mut map = SimpleBSTMap::new();
        assert_eq!(map.min(), None);
        assert_eq!(map.max(), None);
        assert_eq!(map.predecessor(&1), None);

        for &key in &[12, 10, 20, 40, 33, 5, 0, 30] {
            map.insert(key, key * 10);
        }

        assert_eq!(map.min(), Some((&0, &0)));
        assert_eq!(map.max(), Some((&40, &400)));

        assert_eq!(map.predecessor(&12), Some((&10, &100)));
        assert_eq!(map.successor(&12), Some((&20, &200)));
        // Neighbours found through the descent rather than a subtree
        assert_eq!(map.predecessor(&30), Some((&20, &200)));
        assert_eq!(map.successor(&10), Some((&12, &120)));
        assert_eq!(map.successor(&40), None);
        assert_eq!(map.predecessor(&0), None);
        // Absent keys have no neighbours
        assert_eq!(map.successor(&11), None);
    }

    #[test]
    fn test_random_operations() {
        cfg_if::cfg_if! {
            if #[cfg(miri)] {
                const TEST_CASES: usize = 16;
                const OPERATIONS: usize = 24;

                (0..TEST_CASES).into_iter().for_each(|_| test_case());

            } else {
                use rayon::prelude::*;

                const TEST_CASES: usize = 1024;
                const OPERATIONS: usize = 128;

                (0..TEST_CASES).into_par_iter().for_each(|_| test_case());
            }
        }

        fn test_case() {
            let mut map = SimpleBSTMap::new();
            // Compare against a BTreeMap of how many times each key is present. Values are
            // derived from the key so that duplicates are interchangeable.
            let mut expected: BTreeMap<i32, usize> = BTreeMap::new();

            let mut rng = rand::thread_rng();
            for _ in 0..rng.gen_range(OPERATIONS..=OPERATIONS*2) {
                assert_eq!(map.is_empty(), expected.is_empty());
                assert_eq!(map.len(), expected.values().sum::<usize>());

                let key = rng.gen_range(0..=64);
                match rng.gen_range(1..=100) {
                    // Look up a key
                    1..=20 => {
                        let value = expected.get(&key).map(|_| key + 100);
                        assert_eq!(map.get(&key).copied(), value);
                        assert_eq!(map.contains_key(&key), value.is_some());
                    },

                    // Remove a key
                    21..=50 => {
                        let removed = map.remove(&key);
                        match expected.get_mut(&key) {
                            Some(count) => {
                                assert_eq!(removed, Some(key + 100));
                                *count -= 1;
                                if *count == 0 {
                                    expected.remove(&key);
                                }
                            },
                            None => assert_eq!(removed, None),
                        }
                    },

                    // Insert a key
                    51..=100 => {
                        map.insert(key, key + 100);
                        *expected.entry(key).or_insert(0) += 1;
                    },

                    _ => unreachable!(),
                }
            }

            let expected_keys: Vec<_> = expected.iter()
                .flat_map(|(&key, &count)| std::iter::repeat(key).take(count))
                .collect();
            assert_eq!(keys(&map), expected_keys);
            assert_eq!(map.min().map(|(&k, _)| k), expected_keys.first().copied());
            assert_eq!(map.max().map(|(&k, _)| k), expected_keys.last().copied());

            map.clear();
            assert!(map.is_empty());
            assert_eq!(map.len(), 0);
        }
    }

    #[test]
    fn traversal() {
        let mut map = SimpleBSTMap::new();
        // Create the following tree:
        //      4
        //   2     5
        // 1   3
        map.insert(4, 4);
        map.insert(5, 5);
        map.insert(2, 2);
        map.insert(3, 3);
        map.insert(1, 1);

        let root = map.root().unwrap();
        assert_eq!(*root.key(), 4);
        assert_eq!(root.left().map(|node| *node.key()), Some(2));
        assert_eq!(root.right().map(|node| *node.key()), Some(5));

        assert_eq!(keys(&map), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_custom_traversal() {
        #[derive(Debug, PartialEq, Eq)]
        struct Stats {
            pub score: u32,
        }

        // Custom traversal through the values in the map
        fn find_score(node: Option<&Node<i32, Stats>>, target_score: u32) -> Option<&Node<i32, Stats>> {
            let node = node?;
            if node.value().score == target_score {
                Some(node)
            } else {
                find_score(node.left(), target_score)
                    .or_else(|| find_score(node.right(), target_score))
            }
        }

        let mut map = SimpleBSTMap::new();

        map.insert(1, Stats {
            score: 39382,
        });
        map.insert(0, Stats {
            score: 400,
        });
        map.insert(40, Stats {
            score: 999,
        });
        map.insert(42, Stats {
            score: 33,
        });

        assert_eq!(find_score(map.root(), 500), None);
        assert_eq!(find_score(map.root(), 39382).map(|node| *node.key()), Some(1));
        assert_eq!(find_score(map.root(), 999).map(|node| *node.key()), Some(40));
        assert_eq!(find_score(map.root(), 33).map(|node| *node.key()), Some(42));
    }

    #[test]
    fn test_eq() {
        let map1: SimpleBSTMap<_, _> = (0..10).map(|i| (i, i)).collect();
        let map2: SimpleBSTMap<_, _> = (0..10).rev().map(|i| (i, i)).collect();

        // Reflexivity
        assert_eq!(map1, map1);
        // Symmetry
        assert_eq!(map1, map2);
        assert_eq!(map2, map1);

        let map3: SimpleBSTMap<_, _> = (10..20).map(|i| (i, i)).collect();
        let map4: SimpleBSTMap<_, _> = (10..20).map(|i| (i, i * 10)).collect();

        // Completely different maps, same lengths
        assert_eq!(map1.len(), map3.len());
        assert_ne!(map1, map3);
        // Same keys, different values
        assert_ne!(map3, map4);

        let map5 = SimpleBSTMap::new();
        assert_ne!(map1, map5);
        assert_eq!(map5, SimpleBSTMap::default());
    }

    #[test]
    fn test_clone_eq() {
        let mut map = SimpleBSTMap::new();

        for i in 0..10 {
            map.insert(i, -i * 25);
        }

        map.remove(&0);
        map.remove(&1);
        map.remove(&5);

        assert_eq!(map, map.clone());
        assert_eq!(format!("{:?}", map).matches(':').count(), 7);
    }

    #[test]
    fn debug_without_ord() {
        // Formatting and traversal only need the keys to be `Debug`
        let empty: SimpleBSTMap<f64, ()> = SimpleBSTMap::default();
        assert_eq!(format!("{:?}", empty), "{}");
        assert_eq!(empty.iter_inorder().count(), 0);
        assert!(empty.root().is_none());

        let map: SimpleBSTMap<_, _> = vec![(2, "b"), (1, "a")].into_iter().collect();
        assert_eq!(format!("{:?}", map), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn drop_degenerate_tree() {
        cfg_if::cfg_if! {
            if #[cfg(miri)] {
                const LEN: i32 = 64;
            } else {
                const LEN: i32 = 10_000;
            }
        }

        // Every node is the right child of the one before it
        let map: SimpleBSTMap<_, _> = (0..LEN).map(|i| (i, i)).collect();
        assert_eq!(map.len(), LEN as usize);
        assert_eq!(map.max(), Some((&(LEN - 1), &(LEN - 1))));
        drop(map);
    }
}
