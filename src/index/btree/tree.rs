//! Tree facade - key-level operations over a backend.

use std::path::Path;

use crate::common::{Error, PageAddress, Result, TreeConfig};
use crate::storage::page::{IndexEntry, Node};
use crate::storage::{Backend, DiskBackend, MemoryBackend, Pager};

use super::verify::TreeSummary;

/// A B-tree index from `u64` keys to `i64` record pointers.
///
/// Every operation starts from the root page at address 0. The tree owns
/// its backend; nodes only carry their own address.
///
/// # Example
/// ```
/// use pagedex::BTree;
///
/// let mut tree = BTree::in_memory()?;
/// tree.insert(42, 4096)?;
/// assert_eq!(tree.query(42)?, 4096);
///
/// tree.remove(42)?;
/// assert!(tree.query(42).is_err());
/// # Ok::<(), pagedex::Error>(())
/// ```
pub struct BTree<B: Backend = DiskBackend> {
    backend: B,
}

impl BTree<DiskBackend> {
    /// Open the index file at `path`, creating it if absent.
    ///
    /// **Warning:** an existing file at `path` is truncated and everything
    /// in it is lost. Use [`BTree::open_with`] with the default
    /// [`TreeConfig`] to keep existing content.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, TreeConfig::default().truncate_existing(true))
    }

    /// Open the index file at `path` as `config` describes.
    ///
    /// The free list starts empty. Call
    /// [`rebuild_free_list`](BTree::rebuild_free_list) to reuse pages
    /// freed in earlier sessions.
    pub fn open_with<P: AsRef<Path>>(path: P, config: TreeConfig) -> Result<Self> {
        let backend = Pager::open(&path, &config)?;
        tracing::info!(
            path = %path.as_ref().display(),
            pages = backend.store().page_count(),
            truncated = config.truncate_existing,
            "opened index"
        );
        Self::with_backend(backend)
    }

    /// Flush the index file to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.backend.sync()
    }
}

impl BTree<MemoryBackend> {
    /// A tree over a fresh in-memory store.
    pub fn in_memory() -> Result<Self> {
        Self::with_backend(MemoryBackend::in_memory())
    }
}

impl<B: Backend> BTree<B> {
    /// Wrap `backend`, writing an empty root if the store has no pages.
    pub fn with_backend(mut backend: B) -> Result<Self> {
        if backend.extent() == 0 {
            let root = backend.new_node()?;
            if root.address != PageAddress::ROOT {
                return Err(Error::corrupt(
                    root.address.0,
                    "empty store allocated the root away from address 0",
                ));
            }
            if let Err(e) = backend.write_node(&root) {
                backend.discard_node(root.address);
                return Err(e);
            }
        }
        Ok(Self { backend })
    }

    fn root(&mut self) -> Result<Node> {
        self.backend.read_node(PageAddress::ROOT)
    }

    /// Store `pointer` under `key`.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if `key` is already stored
    /// - `Error::ReservedKey` if `key` is 0
    pub fn insert(&mut self, key: u64, pointer: i64) -> Result<()> {
        let root = self.root()?;
        super::insert(&mut self.backend, root, IndexEntry::new(key, pointer))
    }

    /// Look up the pointer stored under `key`.
    ///
    /// # Errors
    /// `Error::KeyNotFound` if `key` is not stored.
    pub fn query(&mut self, key: u64) -> Result<i64> {
        let root = self.root()?;
        super::query(&mut self.backend, root, key).map(|entry| entry.pointer())
    }

    /// Whether `key` is stored.
    pub fn contains(&mut self, key: u64) -> Result<bool> {
        match self.query(key) {
            Ok(_) => Ok(true),
            Err(Error::KeyNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove `key`, returning the pointer that was stored under it.
    ///
    /// # Errors
    /// `Error::KeyNotFound` if `key` is not stored.
    pub fn remove(&mut self, key: u64) -> Result<i64> {
        let root = self.root()?;
        super::remove(&mut self.backend, root, key).map(|entry| entry.pointer())
    }

    /// Queue every empty page in the store for reuse.
    ///
    /// Scans the whole store; only needed after reopening a store that had
    /// pages freed in an earlier session.
    pub fn rebuild_free_list(&mut self) -> Result<()> {
        self.backend.rebuild_free_list()
    }

    /// Check every structural invariant and report the tree's shape.
    pub fn verify(&mut self) -> Result<TreeSummary> {
        super::verify(&mut self.backend)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
