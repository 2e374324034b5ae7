#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K, V> {
    key: K,
    value: V,
    left: Option<Box<Node<K, V>>>,
    right: Option<Box<Node<K, V>>>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
        }
    }

    pub(crate) fn into_inner(self) -> (K, V) {
        (self.key, self.value)
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn entry(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    pub fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    /// Returns the node with the smallest key in this subtree
    pub fn leftmost(&self) -> &Self {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// Returns the node with the largest key in this subtree
    pub fn rightmost(&self) -> &Self {
        let mut node = self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// The link that owns the left subtree. Anything stored here MUST maintain the BST property.
    pub(crate) fn left_link_mut(&mut self) -> &mut Option<Box<Self>> {
        &mut self.left
    }

    /// The link that owns the right subtree. Anything stored here MUST maintain the BST property.
    pub(crate) fn right_link_mut(&mut self) -> &mut Option<Box<Self>> {
        &mut self.right
    }

    pub(crate) fn take_left(&mut self) -> Option<Box<Self>> {
        self.left.take()
    }

    pub(crate) fn take_right(&mut self) -> Option<Box<Self>> {
        self.right.take()
    }
}
