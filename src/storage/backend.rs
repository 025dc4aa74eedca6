//! Backend - node-level access to a page store.
//!
//! The [`Backend`] trait is the contract tree operations are written
//! against. [`Pager`] implements it once for any [`PageStore`], so the disk
//! and memory variants share addressing, the codec and allocation policy.

use std::path::Path;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageAddress, Result, TreeConfig};
use crate::storage::page::{Node, Page};
use crate::storage::{FileStore, FreeList, IoStats, MemoryStore, PageStore};

/// Page allocation, read, write and reclaim for one open tree.
pub trait Backend {
    /// Hand out a zeroed node bound to a reusable or fresh address.
    ///
    /// The node is not persisted until [`write_node`](Backend::write_node).
    fn new_node(&mut self) -> Result<Node>;

    /// Encode `node` and write the full page at its address.
    fn write_node(&mut self, node: &Node) -> Result<()>;

    /// Read and decode the page at `address`.
    fn read_node(&mut self, address: PageAddress) -> Result<Node>;

    /// Zero-fill the page at `address` and queue it for reuse.
    fn remove_node(&mut self, address: PageAddress) -> Result<()>;

    /// Hand back an address from [`new_node`](Backend::new_node) that no
    /// tree page points to, without touching the store.
    ///
    /// The most recent fresh address past the end of the store is simply
    /// un-reserved; anything else is queued for reuse. Discard in reverse
    /// allocation order to leave no gap at the end of the store.
    fn discard_node(&mut self, address: PageAddress);

    /// Scan the whole store and queue every empty page not already queued.
    ///
    /// O(store size). Never called implicitly.
    fn rebuild_free_list(&mut self) -> Result<()>;

    /// Current size of the store in bytes.
    fn extent(&self) -> u64;

    /// Addresses waiting to be reused.
    fn free_list(&self) -> &FreeList;

    /// I/O counters.
    fn stats(&self) -> &IoStats;
}

/// Backend over a single index file.
pub type DiskBackend = Pager<FileStore>;

/// Backend over an in-memory buffer.
pub type MemoryBackend = Pager<MemoryStore>;

/// The [`Backend`] implementation shared by every storage medium.
///
/// # State
/// - `store`: the medium, opened once for the pager's lifetime
/// - `free_list`: reclaimed addresses, empty on every open
/// - `reserved_end`: end of the highest address handed out but possibly not
///   yet written, so back-to-back `new_node` calls never collide
pub struct Pager<S: PageStore> {
    store: S,
    free_list: FreeList,
    reserved_end: u64,
    stats: IoStats,
}

impl<S: PageStore> Pager<S> {
    /// Wrap a store. The free list starts empty.
    pub fn new(store: S) -> Self {
        Self {
            store,
            free_list: FreeList::new(),
            reserved_end: 0,
            stats: IoStats::new(),
        }
    }

    /// The underlying medium.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The underlying medium, e.g. to adjust a store setting mid-session.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the pager, returning the medium. The free list is dropped.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Flush the store.
    pub fn sync(&mut self) -> Result<()> {
        self.store.sync()
    }

    fn checked_offset(address: PageAddress) -> Result<u64> {
        address.offset().ok_or(Error::InvalidAddress(address.0))
    }
}

impl Pager<FileStore> {
    /// Open the index file at `path` as `config` describes.
    pub fn open<P: AsRef<Path>>(path: P, config: &TreeConfig) -> Result<Self> {
        let store = FileStore::open_with(path, config)?;
        Ok(Self::new(store))
    }
}

impl Pager<MemoryStore> {
    /// A pager over a fresh, empty memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: PageStore> Backend for Pager<S> {
    fn new_node(&mut self) -> Result<Node> {
        if let Some(address) = self.free_list.pop() {
            IoStats::bump(&self.stats.pages_allocated);
            IoStats::bump(&self.stats.pages_reused);
            tracing::trace!(%address, "reusing reclaimed page");
            return Ok(Node::new(address));
        }

        let extent = self.store.extent();
        if extent % PAGE_SIZE as u64 != 0 {
            return Err(Error::Allocation { extent });
        }

        let offset = extent.max(self.reserved_end);
        self.reserved_end = offset + PAGE_SIZE as u64;
        IoStats::bump(&self.stats.pages_allocated);
        Ok(Node::new(PageAddress(offset as i64)))
    }

    fn write_node(&mut self, node: &Node) -> Result<()> {
        let offset = Self::checked_offset(node.address)?;
        self.store.write_page(offset, &node.to_page())?;
        IoStats::bump(&self.stats.pages_written);
        Ok(())
    }

    fn read_node(&mut self, address: PageAddress) -> Result<Node> {
        let offset = Self::checked_offset(address)?;

        let mut page = Page::new();
        let n = self.store.read_page(offset, &mut page)?;
        if n < PAGE_SIZE {
            return Err(Error::corrupt(
                address.0,
                format!("short read: {} of {} bytes", n, PAGE_SIZE),
            ));
        }

        IoStats::bump(&self.stats.pages_read);
        Ok(Node::from_page(address, &page))
    }

    fn remove_node(&mut self, address: PageAddress) -> Result<()> {
        let offset = Self::checked_offset(address)?;
        if offset >= self.store.extent() {
            return Err(Error::InvalidAddress(address.0));
        }

        self.store.write_page(offset, &Page::new())?;
        IoStats::bump(&self.stats.pages_written);
        IoStats::bump(&self.stats.pages_reclaimed);

        if self.free_list.push(address) {
            tracing::trace!(%address, "page reclaimed");
        }
        Ok(())
    }

    fn discard_node(&mut self, address: PageAddress) {
        let Some(offset) = address.offset() else {
            return;
        };

        let end = offset + PAGE_SIZE as u64;
        if offset >= self.store.extent() && end == self.reserved_end {
            self.reserved_end = offset;
            tracing::trace!(%address, "released unwritten page");
        } else if self.free_list.push(address) {
            tracing::trace!(%address, "queued discarded page");
        }
    }

    /// The root page is owned by the tree for its whole life, so it is never
    /// queued even when it is empty.
    fn rebuild_free_list(&mut self) -> Result<()> {
        let pages = self.store.extent() / PAGE_SIZE as u64;
        let mut added = 0usize;

        for index in 1..pages {
            let address = PageAddress::from_index(index);
            if self.free_list.contains(address) {
                continue;
            }
            if self.read_node(address)?.is_empty() && self.free_list.push(address) {
                added += 1;
            }
        }

        tracing::debug!(
            pages,
            added,
            free = self.free_list.len(),
            "rebuilt free list"
        );
        Ok(())
    }

    #[inline]
    fn extent(&self) -> u64 {
        self.store.extent()
    }

    fn free_list(&self) -> &FreeList {
        &self.free_list
    }

    fn stats(&self) -> &IoStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::page::IndexEntry;
    use tempfile::tempdir;

    const PAGE: i64 = PAGE_SIZE as i64;

    #[test]
    fn test_allocation_order() {
        let mut pager = MemoryBackend::in_memory();

        let first = pager.new_node().unwrap();
        pager.write_node(&first).unwrap();
        let second = pager.new_node().unwrap();
        pager.write_node(&second).unwrap();

        assert_eq!(first.address.0, 0);
        assert_eq!(second.address.0, PAGE);

        pager.remove_node(PageAddress::ROOT).unwrap();
        assert_eq!(pager.new_node().unwrap().address.0, 0);
    }

    #[test]
    fn test_unwritten_allocations_do_not_collide() {
        let mut pager = MemoryBackend::in_memory();

        let a = pager.new_node().unwrap();
        let b = pager.new_node().unwrap();
        assert_eq!(a.address.0, 0);
        assert_eq!(b.address.0, PAGE);
    }

    #[test]
    fn test_free_list_is_fifo() {
        let mut pager = MemoryBackend::in_memory();
        for _ in 0..4 {
            let node = pager.new_node().unwrap();
            pager.write_node(&node).unwrap();
        }

        pager.remove_node(PageAddress::new(3 * PAGE)).unwrap();
        pager.remove_node(PageAddress::new(PAGE)).unwrap();

        assert_eq!(pager.new_node().unwrap().address.0, 3 * PAGE);
        assert_eq!(pager.new_node().unwrap().address.0, PAGE);
        assert_eq!(pager.new_node().unwrap().address.0, 4 * PAGE);
        assert_eq!(pager.stats().snapshot().pages_reused, 2);
    }

    #[test]
    fn test_write_and_read_node() {
        let mut pager = MemoryBackend::in_memory();
        let mut node = pager.new_node().unwrap();
        node.pointers[0] = PageAddress::new(PAGE);
        node.pointers[1] = PageAddress::new(2 * PAGE);
        node.data[0] = IndexEntry::new(423, 9);
        pager.write_node(&node).unwrap();

        let read = pager.read_node(node.address).unwrap();
        assert_eq!(read, node);
    }

    #[test]
    fn test_invalid_addresses_rejected() {
        let mut pager = MemoryBackend::in_memory();
        let node = Node::new(PageAddress::new(10));

        assert!(matches!(
            pager.write_node(&node),
            Err(Error::InvalidAddress(10))
        ));
        assert!(matches!(
            pager.read_node(PageAddress::new(-PAGE)),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            pager.remove_node(PageAddress::new(7)),
            Err(Error::InvalidAddress(7))
        ));
    }

    #[test]
    fn test_remove_beyond_extent_fails() {
        let mut pager = MemoryBackend::in_memory();
        let node = pager.new_node().unwrap();
        pager.write_node(&node).unwrap();

        assert!(matches!(
            pager.remove_node(PageAddress::new(PAGE)),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_short_read_is_corrupt() {
        let mut pager = Pager::new(MemoryStore::from_bytes(vec![0; PAGE_SIZE + 100]));

        assert!(pager.read_node(PageAddress::ROOT).is_ok());
        assert!(matches!(
            pager.read_node(PageAddress::new(PAGE)),
            Err(Error::CorruptTree { address, .. }) if address == PAGE
        ));
    }

    #[test]
    fn test_misaligned_extent_blocks_allocation() {
        let mut pager = Pager::new(MemoryStore::from_bytes(vec![0; PAGE_SIZE + 1]));
        assert!(matches!(
            pager.new_node(),
            Err(Error::Allocation { extent }) if extent == PAGE_SIZE as u64 + 1
        ));
    }

    #[test]
    fn test_remove_zero_fills() {
        let mut pager = MemoryBackend::in_memory();
        let mut node = pager.new_node().unwrap();
        node.data[0] = IndexEntry::new(5, 5);
        pager.write_node(&node).unwrap();

        pager.remove_node(node.address).unwrap();
        assert!(pager.read_node(node.address).unwrap().is_empty());
        assert!(pager.store().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rebuild_free_list_once() {
        let mut pager = MemoryBackend::in_memory();
        for key in 1..=3u64 {
            let mut node = pager.new_node().unwrap();
            node.data[0] = IndexEntry::new(key, 0);
            pager.write_node(&node).unwrap();
        }

        pager.remove_node(PageAddress::new(PAGE)).unwrap();
        pager.rebuild_free_list().unwrap();
        pager.rebuild_free_list().unwrap();

        let free: Vec<_> = pager.free_list().iter().collect();
        assert_eq!(free, vec![PageAddress::new(PAGE)]);
    }

    #[test]
    fn test_rebuild_finds_empty_pages_after_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.idx");

        {
            let mut pager = DiskBackend::open(&path, &TreeConfig::default()).unwrap();
            for key in 1..=4u64 {
                let mut node = pager.new_node().unwrap();
                node.data[0] = IndexEntry::new(key, 0);
                pager.write_node(&node).unwrap();
            }
            pager.remove_node(PageAddress::new(2 * PAGE)).unwrap();
        }

        let mut pager = DiskBackend::open(&path, &TreeConfig::default()).unwrap();
        assert!(pager.free_list().is_empty());

        pager.rebuild_free_list().unwrap();
        let free: Vec<_> = pager.free_list().iter().collect();
        assert_eq!(free, vec![PageAddress::new(2 * PAGE)]);
        assert_eq!(pager.new_node().unwrap().address.0, 2 * PAGE);
    }

    #[test]
    fn test_discard_rewinds_unwritten_pages() {
        let mut pager = MemoryBackend::in_memory();
        let root = pager.new_node().unwrap();
        pager.write_node(&root).unwrap();

        let a = pager.new_node().unwrap();
        let b = pager.new_node().unwrap();
        pager.discard_node(b.address);
        pager.discard_node(a.address);

        assert!(pager.free_list().is_empty());
        assert_eq!(pager.new_node().unwrap().address.0, PAGE);
    }

    #[test]
    fn test_discard_written_or_out_of_order_is_queued() {
        let mut pager = MemoryBackend::in_memory();
        let root = pager.new_node().unwrap();
        pager.write_node(&root).unwrap();

        let written = pager.new_node().unwrap();
        pager.write_node(&written).unwrap();
        let a = pager.new_node().unwrap();
        let b = pager.new_node().unwrap();

        // `a` is not the last reservation, so it cannot be un-reserved.
        pager.discard_node(a.address);
        pager.discard_node(written.address);
        let free: Vec<_> = pager.free_list().iter().collect();
        assert_eq!(free, vec![a.address, written.address]);

        pager.discard_node(b.address);
        assert_eq!(pager.free_list().len(), 2);
        assert_eq!(pager.new_node().unwrap().address, a.address);
    }

    #[test]
    fn test_failed_allocation_is_not_counted() {
        let mut pager = Pager::new(MemoryStore::from_bytes(vec![0; 3]));
        assert!(pager.new_node().is_err());
        assert_eq!(pager.stats().snapshot().pages_allocated, 0);
    }

    #[test]
    fn test_store_mut_reaches_the_medium() {
        let mut pager = MemoryBackend::in_memory();
        let node = pager.new_node().unwrap();
        pager.write_node(&node).unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[0] = 7;
        pager.store_mut().write_page(0, &page).unwrap();

        assert_eq!(pager.read_node(PageAddress::ROOT).unwrap().pointers[0].0, 7);
    }

    #[test]
    fn test_rebuild_skips_empty_root() {
        let mut pager = MemoryBackend::in_memory();
        let root = pager.new_node().unwrap();
        pager.write_node(&root).unwrap();

        pager.rebuild_free_list().unwrap();
        assert!(pager.free_list().is_empty());
    }
}
