//! Configuration for pagedex.
//!
//! Layout constants are fixed at compile time: every page in every store
//! has the same fanout. Runtime knobs live in [`TreeConfig`].

/// Maximum number of child pointers per node (the order P of the tree).
pub const FANOUT: usize = 32;

/// Number of key slots per node (P - 1).
pub const KEY_SLOTS: usize = FANOUT - 1;

/// Size of one encoded child pointer.
pub const POINTER_SIZE: usize = 8;

/// Size of one encoded index entry (u64 key + i64 pointer).
pub const ENTRY_SIZE: usize = 16;

/// Size of a page in bytes.
///
/// # Layout
/// ```text
/// ┌──────────────────────────┬─────────────────────────────────┐
/// │ pointers[0..P]  (8 B ea) │ data[0..P-1] (16 B ea)          │
/// └──────────────────────────┴─────────────────────────────────┘
/// 8 × 32 + 16 × 31 = 752 bytes
/// ```
pub const PAGE_SIZE: usize = POINTER_SIZE * FANOUT + ENTRY_SIZE * KEY_SLOTS;

/// Minimum number of keys in a non-root node once an operation completes.
///
/// A non-root node keeps at least `ceil(P / 2)` children, which is
/// `ceil(P / 2) - 1` keys. Two minimal siblings plus their separator always
/// fit in one page.
pub const MIN_KEYS: usize = FANOUT.div_ceil(2) - 1;

/// Upper bound on the number of levels a traversal will descend.
///
/// A balanced tree with this fanout never gets close; hitting it means the
/// child pointers form a cycle.
pub const MAX_DEPTH: usize = 64;

/// Runtime options used when opening a tree.
///
/// # Example
/// ```
/// use pagedex::TreeConfig;
///
/// let config = TreeConfig::default().truncate_existing(true);
/// assert!(config.truncate_existing);
/// assert!(!config.sync_on_write);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeConfig {
    /// Discard any existing content at the store path when opening.
    pub truncate_existing: bool,
    /// Call `fsync()` after every page write.
    pub sync_on_write: bool,
}

impl TreeConfig {
    /// Set whether existing content is discarded on open.
    pub fn truncate_existing(mut self, truncate: bool) -> Self {
        self.truncate_existing = truncate;
        self
    }

    /// Set whether every page write is followed by `fsync()`.
    pub fn sync_on_write(mut self, sync: bool) -> Self {
        self.sync_on_write = sync;
        self
    }
}
