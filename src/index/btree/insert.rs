//! Insertion.

use crate::common::config::MAX_DEPTH;
use crate::common::{Error, PageAddress, Result};
use crate::storage::page::{IndexEntry, Node, Slot};
use crate::storage::Backend;

use super::batch::{atomically, Batch};
use super::split::{split_child, split_in};

/// Insert `entry` into the subtree rooted at `node`.
///
/// Splitting is top-down so an insert never has to walk back up:
/// - a full `node` is split in place first (see [`split`](fn@super::split));
/// - a full child met on the way down is split before entering it, its
///   median moving into the current node, which has room because it was
///   itself checked on the way in.
///
/// The entry always lands in a leaf, shifted into sorted position. All
/// page writes, splits included, are applied together at the end; on any
/// error the store is left as it was.
///
/// # Errors
/// - `Error::ReservedKey` for key 0
/// - `Error::DuplicateKey` if the key is already stored
pub fn insert<B: Backend>(backend: &mut B, node: Node, entry: IndexEntry) -> Result<()> {
    if entry.is_empty() {
        return Err(Error::ReservedKey);
    }

    atomically(backend, |batch, backend| {
        batch.track(&node);
        insert_in(batch, backend, node, entry)
    })
}

fn insert_in<B: Backend>(
    batch: &mut Batch,
    backend: &mut B,
    node: Node,
    entry: IndexEntry,
) -> Result<()> {
    let mut node = node;
    if node.is_full() {
        split_in(batch, backend, &mut node)?;
    }

    if node.is_empty() {
        node.data[0] = entry;
        batch.stage(&node);
        return Ok(());
    }

    let key = entry.key();
    let mut depth = 0;
    loop {
        match node.locate(key) {
            Slot::Found(_) => return Err(Error::DuplicateKey(key)),
            Slot::Descend(i) => {
                let child_address = node.pointers[i];
                if child_address.is_null() {
                    node.insert_at(i, entry, PageAddress::NULL);
                    tracing::trace!(key, address = %node.address, slot = i, "inserted entry");
                    batch.stage(&node);
                    return Ok(());
                }

                let child = batch.read(backend, child_address)?;
                if child.is_full() {
                    // The median now sits at slot i; pick a side again.
                    split_child(batch, backend, &mut node, i, &child)?;
                    continue;
                }

                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(Error::corrupt(
                        child.address.0,
                        format!("insert exceeded {} levels", MAX_DEPTH),
                    ));
                }
                node = child;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::KEY_SLOTS;
    use crate::index::btree::query::query;
    use crate::storage::MemoryBackend;

    fn fresh() -> MemoryBackend {
        let mut backend = MemoryBackend::in_memory();
        let root = backend.new_node().unwrap();
        backend.write_node(&root).unwrap();
        backend
    }

    fn put(backend: &mut MemoryBackend, key: u64) -> Result<()> {
        let root = backend.read_node(PageAddress::ROOT).unwrap();
        insert(backend, root, IndexEntry::new(key, key as i64 * 2))
    }

    fn root_keys(backend: &mut MemoryBackend) -> Vec<u64> {
        let root = backend.read_node(PageAddress::ROOT).unwrap();
        root.entries().iter().map(IndexEntry::key).collect()
    }

    #[test]
    fn test_insert_into_empty_root() {
        let mut backend = fresh();
        put(&mut backend, 42).unwrap();
        assert_eq!(root_keys(&mut backend), vec![42]);
    }

    #[test]
    fn test_insert_keeps_slots_sorted() {
        let mut backend = fresh();
        for key in [2, 89, 4, 67, 5, 10, 8] {
            put(&mut backend, key).unwrap();
        }

        assert_eq!(root_keys(&mut backend), vec![2, 4, 5, 8, 10, 67, 89]);
        let root = backend.read_node(PageAddress::ROOT).unwrap();
        assert_eq!(root.size(), 7);
        assert!(root.is_leaf());
    }

    #[test]
    fn test_insert_duplicate() {
        let mut backend = fresh();
        put(&mut backend, 7).unwrap();

        assert!(matches!(put(&mut backend, 7), Err(Error::DuplicateKey(7))));
        assert_eq!(root_keys(&mut backend), vec![7]);
    }

    #[test]
    fn test_duplicate_rolls_back_splits() {
        let mut backend = fresh();
        for key in 1..=KEY_SLOTS as u64 {
            put(&mut backend, key).unwrap();
        }
        let extent = backend.extent();

        assert!(matches!(put(&mut backend, 16), Err(Error::DuplicateKey(16))));

        let root = backend.read_node(PageAddress::ROOT).unwrap();
        assert!(root.is_full() && root.is_leaf());
        assert_eq!(backend.extent(), extent);
        assert!(backend.free_list().is_empty());
        assert_eq!(backend.new_node().unwrap().address.0 as u64, extent);
    }

    #[test]
    fn test_insert_reserved_key() {
        let mut backend = fresh();
        assert!(matches!(put(&mut backend, 0), Err(Error::ReservedKey)));
    }

    #[test]
    fn test_insert_splits_full_root() {
        let mut backend = fresh();
        for key in 1..=KEY_SLOTS as u64 {
            put(&mut backend, key).unwrap();
        }
        let root = backend.read_node(PageAddress::ROOT).unwrap();
        assert!(root.is_full());

        put(&mut backend, 100).unwrap();

        let root = backend.read_node(PageAddress::ROOT).unwrap();
        assert_eq!(root.size(), 1);
        assert_eq!(root.data[0].key(), 16);

        let right = backend.read_node(root.pointers[1]).unwrap();
        assert_eq!(right.size(), 16);
        assert_eq!(right.entries().last().map(IndexEntry::key), Some(100));
    }

    #[test]
    fn test_insert_many_then_query() {
        let mut backend = fresh();
        // Interleave the key order to exercise left and right descents.
        let keys: Vec<u64> = (1..=2000u64).map(|i| (i * 7919) % 2003 + 1).collect();
        for &key in &keys {
            put(&mut backend, key).unwrap();
        }

        for &key in &keys {
            let root = backend.read_node(PageAddress::ROOT).unwrap();
            let entry = query(&mut backend, root, key).unwrap();
            assert_eq!(entry.pointer(), key as i64 * 2);
        }
    }
}
