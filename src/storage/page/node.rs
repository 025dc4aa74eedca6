//! Node - the in-memory working copy of one page.
//!
//! A [`Node`] owns its pointer and entry arrays and knows its own
//! [`PageAddress`]. It has no link back to the backend that produced it;
//! tree operations pass the backend explicitly.

use crate::common::config::{FANOUT, KEY_SLOTS};
use crate::common::PageAddress;

use super::entry::IndexEntry;

/// Where a key belongs relative to a node's slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The key is stored at this slot.
    Found(usize),
    /// The key is not here; it belongs under `pointers[i]` (or, in a leaf,
    /// at slot `i`).
    Descend(usize),
}

/// One B-tree node.
///
/// # Layout
/// ```text
///   pointers: [p0] [p1] [p2] ... [p31]
///   data:        [k0]  [k1]  ... [k30]
/// ```
/// `p_i` roots the keys below `k_i`; `p_size` roots the keys above the
/// last used key. Unused slots hold [`IndexEntry::EMPTY`] and unused
/// pointers hold [`PageAddress::NULL`]. A leaf has every pointer null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Where this node lives in the store.
    pub address: PageAddress,
    /// Child page addresses.
    pub pointers: [PageAddress; FANOUT],
    /// Sorted entries, sentinel-terminated.
    pub data: [IndexEntry; KEY_SLOTS],
}

impl Node {
    /// Create a zeroed node bound to `address`.
    pub fn new(address: PageAddress) -> Self {
        Self {
            address,
            pointers: [PageAddress::NULL; FANOUT],
            data: [IndexEntry::EMPTY; KEY_SLOTS],
        }
    }

    /// Whether every pointer and every key is zero.
    pub fn is_empty(&self) -> bool {
        self.pointers.iter().all(PageAddress::is_null) && self.data.iter().all(IndexEntry::is_empty)
    }

    /// Whether the last key slot is in use.
    #[inline]
    pub fn is_full(&self) -> bool {
        !self.data[KEY_SLOTS - 1].is_empty()
    }

    /// Number of leading used slots.
    pub fn size(&self) -> usize {
        self.data
            .iter()
            .position(IndexEntry::is_empty)
            .unwrap_or(KEY_SLOTS)
    }

    /// Whether this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.pointers[0].is_null()
    }

    /// The used prefix of the entry array.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.data[..self.size()]
    }

    /// The child pointers paired with the used entries (`size + 1` of them).
    pub fn children(&self) -> &[PageAddress] {
        &self.pointers[..self.size() + 1]
    }

    /// Scan the used slots left to right for `key`.
    pub fn locate(&self, key: u64) -> Slot {
        for (i, entry) in self.entries().iter().enumerate() {
            if key < entry.key() {
                return Slot::Descend(i);
            }
            if key == entry.key() {
                return Slot::Found(i);
            }
        }
        Slot::Descend(self.size())
    }

    /// Zero every slot and pointer, keeping the address.
    pub fn clear(&mut self) {
        self.pointers = [PageAddress::NULL; FANOUT];
        self.data = [IndexEntry::EMPTY; KEY_SLOTS];
    }

    /// Insert `entry` at slot `i` with `right` as the child just after it.
    ///
    /// Slots `i..` and pointers `i+1..` move one place right. The node must
    /// not be full.
    pub fn insert_at(&mut self, i: usize, entry: IndexEntry, right: PageAddress) {
        let size = self.size();
        debug_assert!(size < KEY_SLOTS, "insert into full node {}", self.address);
        debug_assert!(i <= size);

        self.data.copy_within(i..size, i + 1);
        self.pointers.copy_within(i + 1..size + 1, i + 2);
        self.data[i] = entry;
        self.pointers[i + 1] = right;
    }

    /// Insert `entry` at slot 0 with `left` as the new leftmost child.
    pub fn push_front(&mut self, entry: IndexEntry, left: PageAddress) {
        let size = self.size();
        debug_assert!(size < KEY_SLOTS, "push into full node {}", self.address);

        self.data.copy_within(0..size, 1);
        self.pointers.copy_within(0..size + 1, 1);
        self.data[0] = entry;
        self.pointers[0] = left;
    }

    /// Append `entry` with `right` as the new rightmost child.
    pub fn push_back(&mut self, entry: IndexEntry, right: PageAddress) {
        let size = self.size();
        self.insert_at(size, entry, right);
    }

    /// Remove slot `i` together with the child to its right.
    pub fn remove_at(&mut self, i: usize) -> (IndexEntry, PageAddress) {
        let size = self.size();
        debug_assert!(i < size);

        let entry = self.data[i];
        let right = self.pointers[i + 1];
        self.data.copy_within(i + 1..size, i);
        self.pointers.copy_within(i + 2..size + 1, i + 1);
        self.data[size - 1] = IndexEntry::EMPTY;
        self.pointers[size] = PageAddress::NULL;
        (entry, right)
    }

    /// Remove slot 0 together with the leftmost child.
    pub fn pop_front(&mut self) -> (IndexEntry, PageAddress) {
        let size = self.size();
        debug_assert!(size > 0);

        let entry = self.data[0];
        let left = self.pointers[0];
        self.data.copy_within(1..size, 0);
        self.pointers.copy_within(1..size + 1, 0);
        self.data[size - 1] = IndexEntry::EMPTY;
        self.pointers[size] = PageAddress::NULL;
        (entry, left)
    }

    /// Remove the last used slot together with the rightmost child.
    pub fn pop_back(&mut self) -> (IndexEntry, PageAddress) {
        let size = self.size();
        self.remove_at(size - 1)
    }

    /// Copy slots and pointers from `other`, keeping this node's address.
    pub fn copy_contents(&mut self, other: &Node) {
        self.pointers = other.pointers;
        self.data = other.data;
    }
}
