//! Coarse-grained shared access to a tree.

use std::path::Path;

use parking_lot::Mutex;

use crate::common::{Result, TreeConfig};
use crate::storage::{Backend, DiskBackend, StatsSnapshot};

use super::tree::BTree;
use super::verify::TreeSummary;

/// A [`BTree`] behind one exclusive lock.
///
/// Tree operations are not safe to interleave, so every call takes the
/// lock for its whole duration. Readers are serialized too: a lookup moves
/// the backend's file cursor.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use pagedex::{BTree, SharedBTree};
///
/// let tree = Arc::new(SharedBTree::new(BTree::in_memory()?));
/// let handles: Vec<_> = (0..4u64)
///     .map(|t| {
///         let tree = Arc::clone(&tree);
///         std::thread::spawn(move || {
///             for i in 1..=50u64 {
///                 tree.insert(t * 1000 + i, i as i64).unwrap();
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert_eq!(tree.verify()?.keys, 200);
/// # Ok::<(), pagedex::Error>(())
/// ```
pub struct SharedBTree<B: Backend = DiskBackend> {
    inner: Mutex<BTree<B>>,
}

impl SharedBTree<DiskBackend> {
    /// Open the index file at `path` as `config` describes.
    pub fn open_with<P: AsRef<Path>>(path: P, config: TreeConfig) -> Result<Self> {
        Ok(Self::new(BTree::open_with(path, config)?))
    }
}

impl<B: Backend> SharedBTree<B> {
    pub fn new(tree: BTree<B>) -> Self {
        Self {
            inner: Mutex::new(tree),
        }
    }

    pub fn insert(&self, key: u64, pointer: i64) -> Result<()> {
        self.inner.lock().insert(key, pointer)
    }

    pub fn query(&self, key: u64) -> Result<i64> {
        self.inner.lock().query(key)
    }

    pub fn contains(&self, key: u64) -> Result<bool> {
        self.inner.lock().contains(key)
    }

    pub fn remove(&self, key: u64) -> Result<i64> {
        self.inner.lock().remove(key)
    }

    pub fn rebuild_free_list(&self) -> Result<()> {
        self.inner.lock().rebuild_free_list()
    }

    pub fn verify(&self) -> Result<TreeSummary> {
        self.inner.lock().verify()
    }

    /// Snapshot of the backend's I/O counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.lock().backend().stats().snapshot()
    }

    /// Run `f` with exclusive access to the tree, e.g. to batch several
    /// operations under one lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut BTree<B>) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    pub fn into_inner(self) -> BTree<B> {
        self.inner.into_inner()
    }
}
