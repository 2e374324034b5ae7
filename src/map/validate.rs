use thiserror::Error;

use crate::slab::Ptr;

use super::{Color, RBTreeMap};

/// A broken structural rule found by [`RBTreeMap::check_invariants`]
///
/// Nodes are identified by their slot in the map's node storage. None of these can happen through
/// the public API; seeing one means the tree implementation has a bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("the root node is red")]
    RootNotBlack,
    #[error("the root node has a parent")]
    RootHasParent,
    #[error("node {node} is not the parent of its child")]
    BrokenParentLink { node: usize },
    #[error("red node {node} has a red child")]
    DoubleRed { node: usize },
    #[error("key at in-order position {position} is smaller than the key before it")]
    OutOfOrder { position: usize },
    #[error("black-height mismatch: expected {expected}, found {found}")]
    BlackHeightMismatch { expected: usize, found: usize },
    #[error("{reachable} nodes reachable from the root, but the map holds {stored}")]
    LengthMismatch { reachable: usize, stored: usize },
}

impl<K: Ord, V> RBTreeMap<K, V> {
    /// Walks the whole tree and verifies every structural invariant
    ///
    /// Checks that keys are in order, that parent links agree with child links, that the root is
    /// black, that no red node has a red child, and that every path from the root to a missing
    /// child passes through the same number of black nodes. On success, returns that number
    /// (counting the root, so an empty map returns 0).
    ///
    /// This is a debugging aid for tests and runs in `O(n log n)`. The operations on the map keep
    /// these invariants on their own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbmap::RBTreeMap;
    ///
    /// let map: RBTreeMap<_, _> = (0..100).map(|i| (i, i)).collect();
    /// assert!(map.check_invariants().is_ok());
    /// ```
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        let root = match self.root {
            Some(root) => root,
            None => {
                return match self.len() {
                    0 => Ok(0),
                    stored => Err(InvariantViolation::LengthMismatch {reachable: 0, stored}),
                };
            },
        };

        if self.nodes[root].parent.is_some() {
            return Err(InvariantViolation::RootHasParent);
        }
        if self.nodes[root].color != Color::Black {
            return Err(InvariantViolation::RootNotBlack);
        }

        let reachable = self.check_links(root)?;
        if reachable != self.len() {
            return Err(InvariantViolation::LengthMismatch {reachable, stored: self.len()});
        }

        self.check_order()?;
        self.check_black_height(root)
    }

    /// Checks parent links and red children, returning the number of nodes visited
    fn check_links(&self, root: Ptr) -> Result<usize, InvariantViolation> {
        let mut visited = 0;
        let mut stack = vec![root];
        while let Some(ptr) = stack.pop() {
            visited += 1;
            // A cycle would otherwise never end
            if visited > self.len() {
                break;
            }

            let node = &self.nodes[ptr];
            for child in node.left.into_iter().chain(node.right) {
                if self.nodes[child].parent != Some(ptr) {
                    return Err(InvariantViolation::BrokenParentLink {node: ptr.index()});
                }
                if node.color == Color::Red && self.nodes[child].color == Color::Red {
                    return Err(InvariantViolation::DoubleRed {node: ptr.index()});
                }

                stack.push(child);
            }
        }

        Ok(visited)
    }

    fn check_order(&self) -> Result<(), InvariantViolation> {
        let mut prev = None;
        for (position, (key, _)) in self.iter().enumerate() {
            if let Some(prev) = prev {
                // Equal neighbours are duplicates, which is fine
                if key < prev {
                    return Err(InvariantViolation::OutOfOrder {position});
                }
            }
            prev = Some(key);
        }

        Ok(())
    }

    /// Counts black nodes from every node with a missing child up to the root
    ///
    /// If every root-to-"no node" path has the same count, then so does every path starting
    /// further down, since those paths share the part above their start.
    fn check_black_height(&self, root: Ptr) -> Result<usize, InvariantViolation> {
        let mut expected = None;
        let mut stack = vec![root];
        while let Some(ptr) = stack.pop() {
            let node = &self.nodes[ptr];
            stack.extend(node.left);
            stack.extend(node.right);

            if node.left.is_some() && node.right.is_some() {
                continue;
            }

            let mut found = 0;
            let mut current = Some(ptr);
            while let Some(current_ptr) = current {
                if self.nodes[current_ptr].color == Color::Black {
                    found += 1;
                }
                current = self.nodes[current_ptr].parent;
            }

            match expected {
                None => expected = Some(found),
                Some(expected) if expected != found => {
                    return Err(InvariantViolation::BlackHeightMismatch {expected, found});
                },
                Some(_) => {},
            }
        }

        // The root has at least one missing child somewhere below it
        Ok(expected.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RBTreeMap<i32, ()> {
        (1..=7).map(|i| (i, ())).collect()
    }

    #[test]
    fn valid_trees() {
        let empty: RBTreeMap<i32, ()> = RBTreeMap::new();
        assert_eq!(empty.check_invariants(), Ok(0));

        let map: RBTreeMap<_, _> = vec![(1, ())].into_iter().collect();
        assert_eq!(map.check_invariants(), Ok(1));

        let map = sample();
        assert!(map.check_invariants().is_ok());
    }

    #[test]
    fn detects_red_root() {
        let mut map = sample();
        let root = map.root.unwrap();
        map.nodes[root].color = Color::Red;
        assert_eq!(map.check_invariants(), Err(InvariantViolation::RootNotBlack));
    }

    #[test]
    fn detects_double_red() {
        let mut map = sample();
        // Paint every node red except the root
        let root = map.root.unwrap();
        let ptrs: Vec<_> = {
            let mut ptrs = Vec::new();
            let mut stack = vec![root];
            while let Some(ptr) = stack.pop() {
                ptrs.push(ptr);
                stack.extend(map.nodes[ptr].left);
                stack.extend(map.nodes[ptr].right);
            }
            ptrs
        };
        for &ptr in &ptrs[1..] {
            map.nodes[ptr].color = Color::Red;
        }

        match map.check_invariants() {
            Err(InvariantViolation::DoubleRed {..}) => {},
            other => panic!("expected a double red, got {:?}", other),
        }
    }

    #[test]
    fn detects_black_height_mismatch() {
        let mut map = sample();
        let root = map.root.unwrap();
        let left = map.nodes[root].left.unwrap();
        let color = map.nodes[left].color;
        map.nodes[left].color = match color {
            Color::Black => Color::Red,
            Color::Red => Color::Black,
        };

        match map.check_invariants() {
            Err(InvariantViolation::BlackHeightMismatch {..}) | Err(InvariantViolation::DoubleRed {..}) => {},
            other => panic!("expected a coloring error, got {:?}", other),
        }
    }

    #[test]
    fn detects_broken_parent_link() {
        let mut map = sample();
        let root = map.root.unwrap();
        let left = map.nodes[root].left.unwrap();
        let right = map.nodes[root].right.unwrap();
        map.nodes[left].parent = Some(right);

        assert_eq!(
            map.check_invariants(),
            Err(InvariantViolation::BrokenParentLink {node: root.index()}),
        );
    }

    #[test]
    fn detects_out_of_order_keys() {
        let mut map = sample();
        let min = map.min_from(map.root.unwrap());
        map.nodes[min].key = 100;

        assert_eq!(map.check_invariants(), Err(InvariantViolation::OutOfOrder {position: 1}));
    }

    #[test]
    fn error_messages() {
        assert_eq!(InvariantViolation::RootNotBlack.to_string(), "the root node is red");
        assert_eq!(
            InvariantViolation::BlackHeightMismatch {expected: 3, found: 2}.to_string(),
            "black-height mismatch: expected 3, found 2",
        );
    }
}
