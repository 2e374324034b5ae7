//! Restoring the red-black properties after a mutation
//!
//! Both fixups are written once in terms of [`Side`]. The mirror-image cases fall out of flipping
//! which side the interesting node hangs off of.

use log::trace;

use crate::slab::Ptr;

use super::{Color, RBTreeMap, Side};

impl<K, V> RBTreeMap<K, V> {
    /// Treats "no node" as black
    pub(super) fn is_red(&self, ptr: Option<Ptr>) -> bool {
        match ptr {
            Some(ptr) => self.nodes[ptr].color == Color::Red,
            None => false,
        }
    }

    fn set_color(&mut self, ptr: Option<Ptr>, color: Color) {
        if let Some(ptr) = ptr {
            self.nodes[ptr].color = color;
        }
    }

    /// Fixes the double-red violation that inserting the red leaf `z` may have created
    ///
    /// The only property that can be broken is "a red node never has a red child", and only
    /// between `z` and its parent. Each iteration either resolves it with at most two rotations or
    /// moves it two levels up the tree.
    pub(super) fn insert_fixup(&mut self, mut z: Ptr) {
        while let Some(parent) = self.nodes[z].parent {
            if self.nodes[parent].color == Color::Black {
                break;
            }

            // A red node is never the root, so a red parent always has a parent of its own
            let grandparent = match self.nodes[parent].parent {
                Some(grandparent) => grandparent,
                None => break,
            };
            let parent_side = match self.side_of(parent) {
                Some(side) => side,
                None => break,
            };
            let uncle = self.nodes[grandparent].child(parent_side.opposite());

            if self.is_red(uncle) {
                trace!("insert fixup at {:?}: red uncle, recoloring", z);
                self.set_color(Some(parent), Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(Some(grandparent), Color::Red);
                z = grandparent;
                continue;
            }

            let mut parent = parent;
            if self.nodes[parent].child(parent_side.opposite()) == Some(z) {
                // `z` is an inner grandchild. Rotate it outward so both cases end the same way.
                trace!("insert fixup at {:?}: black uncle, inner child", z);
                self.rotate(parent, parent_side);
                z = parent;
                parent = match self.nodes[z].parent {
                    Some(parent) => parent,
                    None => break,
                };
            }

            trace!("insert fixup at {:?}: black uncle, outer child", z);
            self.set_color(Some(parent), Color::Black);
            self.set_color(Some(grandparent), Color::Red);
            self.rotate(grandparent, parent_side.opposite());
        }

        // Recoloring may have pushed red all the way up to the root
        self.set_color(self.root, Color::Black);
    }

    /// Restores black-height after a black node was removed from the position now held by `x`
    ///
    /// `x` carries an "extra black". Since `x` may be "no node", its parent is passed in
    /// separately. Each iteration either pushes the extra black one level up or absorbs it with at
    /// most three rotations.
    pub(super) fn delete_fixup(&mut self, mut x: Option<Ptr>, mut parent: Option<Ptr>) {
        while x != self.root && !self.is_red(x) {
            let parent_ptr = match parent {
                Some(parent_ptr) => parent_ptr,
                None => break,
            };

            let side = if self.nodes[parent_ptr].left == x { Side::Left } else { Side::Right };

            // `x` is short one black, so its sibling's subtree holds at least one black node
            let mut sibling = match self.nodes[parent_ptr].child(side.opposite()) {
                Some(sibling) => sibling,
                None => break,
            };

            if self.nodes[sibling].color == Color::Red {
                trace!("delete fixup under {:?}: red sibling", parent_ptr);
                self.set_color(Some(sibling), Color::Black);
                self.set_color(Some(parent_ptr), Color::Red);
                self.rotate(parent_ptr, side);
                sibling = match self.nodes[parent_ptr].child(side.opposite()) {
                    Some(sibling) => sibling,
                    None => break,
                };
            }

            let near = self.nodes[sibling].child(side);
            let far = self.nodes[sibling].child(side.opposite());

            if !self.is_red(near) && !self.is_red(far) {
                trace!("delete fixup under {:?}: black nephews, moving up", parent_ptr);
                self.set_color(Some(sibling), Color::Red);
                x = Some(parent_ptr);
                parent = self.nodes[parent_ptr].parent;
                continue;
            }

            if !self.is_red(far) {
                trace!("delete fixup under {:?}: red near nephew", parent_ptr);
                self.set_color(near, Color::Black);
                self.set_color(Some(sibling), Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = match self.nodes[parent_ptr].child(side.opposite()) {
                    Some(sibling) => sibling,
                    None => break,
                };
            }

            trace!("delete fixup under {:?}: red far nephew", parent_ptr);
            let parent_color = self.nodes[parent_ptr].color;
            self.set_color(Some(sibling), parent_color);
            self.set_color(Some(parent_ptr), Color::Black);
            let far = self.nodes[sibling].child(side.opposite());
            self.set_color(far, Color::Black);
            self.rotate(parent_ptr, side);

            x = self.root;
            parent = None;
        }

        self.set_color(x, Color::Black);
    }
}
