use std::mem;
use std::num::NonZeroUsize;
use std::ops::{Index, IndexMut};

#[cfg(test)]
use static_assertions::const_assert_eq;

/// A handle to an occupied entry of a slab
///
/// The index is stored offset by one so that `Option<Ptr>` has the same size as `Ptr`. Tree links
/// are `Option<Ptr>` everywhere, so this keeps every node three words of links and no more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Ptr(NonZeroUsize);

// We've designed `Ptr` to use as little space as possible to help with cache
#[cfg(test)]
const_assert_eq!(mem::size_of::<Ptr>(), 8);
// The niche in `NonZeroUsize` is what makes "no node" free
#[cfg(test)]
const_assert_eq!(mem::size_of::<Option<Ptr>>(), 8);

impl Ptr {
    #[inline(always)]
    fn new(index: usize) -> Self {
        // `index + 1` cannot overflow because a `Vec` never holds `usize::MAX` entries
        match NonZeroUsize::new(index + 1) {
            Some(value) => Ptr(value),
            None => unreachable!("slab index overflowed"),
        }
    }

    /// Returns the position of this entry in the slab
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0.get() - 1
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Occupied(T),
    /// An entry in the free list, pointing at the next free entry (if any)
    Vacant(Option<Ptr>),
}

/// An allocation primitive similar to `Vec`, but implemented to reuse space from removed entries.
///
/// Items are kept contiguously in memory, but indexes are not shifted when an individual item is
/// removed. Instead of always pushing items after the previously pushed item, this data structure
/// will reuse space from previously removed entries when possible. This makes removal cheaper than
/// a standard `Vec<T>` and keeps every other `Ptr` valid.
///
/// Indexing with a `Ptr` whose entry has been removed panics, just like indexing a `Vec` out of
/// bounds. Only pointers returned from `push` and not yet passed to `remove` are valid.
#[derive(Debug, Clone)]
pub struct Slab<T> {
    entries: Vec<Entry<T>>,
    /// The first entry of the free list or `None` if the free list is empty
    ///
    /// The free list is a linked list stored in `entries` that is used as a stack to track which
    /// entries have space that can be reused in calls to `push`.
    free_list_head: Option<Ptr>,
    /// The length of the free list
    free_len: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self {
            entries: Vec::default(),
            free_list_head: None,
            free_len: 0,
        }
    }
}

impl<T> Slab<T> {
    /// Creates an empty slab
    ///
    /// The slab is initially created with a capacity of 0, so it will not allocate until it is
    /// first inserted into.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty slab with the specified capacity.
    ///
    /// The slab will be able to hold at least `capacity` elements without reallocating. If
    /// `capacity` is 0, the slab will not allocate.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the number of entries in the slab that contain values
    ///
    /// This is the number of items pushed minus the number of items removed
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_len
    }

    /// Returns true if the slab is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements the slab can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Returns a reference to the value behind `ptr`, or `None` if that entry was removed
    pub fn get(&self, ptr: Ptr) -> Option<&T> {
        match self.entries.get(ptr.index())? {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value behind `ptr`, or `None` if that entry was removed
    pub fn get_mut(&mut self, ptr: Ptr) -> Option<&mut T> {
        match self.entries.get_mut(ptr.index())? {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    /// Pushes a value into the slab and returns a pointer to it
    ///
    /// The item may be inserted at the end of the list, or in the space from an item was previously
    /// removed.
    pub fn push(&mut self, value: T) -> Ptr {
        // Check if we can reuse some space from the free list
        if let Some(head) = self.free_list_head {
            let entry = &mut self.entries[head.index()];
            let next_free = match entry {
                Entry::Vacant(next_free) => *next_free,
                Entry::Occupied(_) => unreachable!("free list pointed at an occupied entry"),
            };

            *entry = Entry::Occupied(value);
            self.free_list_head = next_free;
            self.free_len -= 1;

            return head;
        }

        let ptr = Ptr::new(self.entries.len());
        self.entries.push(Entry::Occupied(value));

        ptr
    }

    /// Removes an item from the slab, returning its value, or `None` if the entry was already
    /// removed.
    ///
    /// The space for the item will be reused in future calls to `push`. This does not move or
    /// modify any other entries in the slab. Their pointers remain the same and can still be used.
    pub fn remove(&mut self, ptr: Ptr) -> Option<T> {
        let entry = self.entries.get_mut(ptr.index())?;
        if let Entry::Vacant(_) = entry {
            return None;
        }

        let prev = mem::replace(entry, Entry::Vacant(self.free_list_head));
        self.free_list_head = Some(ptr);
        self.free_len += 1;

        match prev {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    /// Clears the slab, removing all values.
    ///
    /// Note that this method has no effect on the allocated capacity of the slab. Every remaining
    /// value is dropped exactly once, in storage order.
    ///
    /// This invalidates all previous pointers returned from `push`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.free_list_head = None;
        self.free_len = 0;
    }
}

impl<T> Index<Ptr> for Slab<T> {
    type Output = T;

    fn index(&self, ptr: Ptr) -> &T {
        match self.get(ptr) {
            Some(value) => value,
            None => panic!("slab entry {} is not occupied", ptr.index()),
        }
    }
}

impl<T> IndexMut<Ptr> for Slab<T> {
    fn index_mut(&mut self, ptr: Ptr) -> &mut T {
        match self.get_mut(ptr) {
            Some(value) => value,
            None => panic!("slab entry {} is not occupied", ptr.index()),
        }
    }
}
