//! Index entry - the key/pointer pair stored in a node slot.

use std::fmt;

/// An immutable key → record pointer pair.
///
/// Key 0 is the "slot unused" sentinel, so [`IndexEntry::EMPTY`] is what
/// every unused slot holds. The pointer is opaque to the tree; callers
/// typically store an offset into a separate data file.
///
/// # Example
/// ```
/// use pagedex::IndexEntry;
///
/// let entry = IndexEntry::new(42, 4096);
/// assert_eq!(entry.key(), 42);
/// assert_eq!(entry.pointer(), 4096);
/// assert!(!entry.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IndexEntry {
    key: u64,
    pointer: i64,
}

impl IndexEntry {
    /// The unused-slot value.
    pub const EMPTY: IndexEntry = IndexEntry { key: 0, pointer: 0 };

    /// Create a new entry.
    #[inline]
    pub const fn new(key: u64, pointer: i64) -> Self {
        Self { key, pointer }
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn pointer(&self) -> i64 {
        self.pointer
    }

    /// Whether this slot holds the sentinel key.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key == 0
    }

    /// Whether both fields are zero, i.e. the slot was never written.
    #[inline]
    pub fn is_zeroed(&self) -> bool {
        self.key == 0 && self.pointer == 0
    }
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.key, self.pointer)
    }
}
