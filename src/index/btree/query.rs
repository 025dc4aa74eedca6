//! Point lookup.

use crate::common::config::MAX_DEPTH;
use crate::common::{Error, Result};
use crate::storage::page::{IndexEntry, Node, Slot};
use crate::storage::Backend;

/// Find `key` in the subtree rooted at `node`.
///
/// Walks down one page per level: a smaller key descends left of the slot,
/// a key past the last used slot descends right of it. A null child on the
/// way means the key is absent.
///
/// # Errors
/// - `Error::KeyNotFound` if the key is not stored (including an empty tree)
/// - `Error::CorruptTree` if the walk exceeds [`MAX_DEPTH`] levels
pub fn query<B: Backend>(backend: &mut B, node: Node, key: u64) -> Result<IndexEntry> {
    if key == 0 || node.is_empty() {
        return Err(Error::KeyNotFound(key));
    }

    let mut node = node;
    for _ in 0..MAX_DEPTH {
        match node.locate(key) {
            Slot::Found(i) => return Ok(node.data[i]),
            Slot::Descend(i) => {
                let child = node.pointers[i];
                if child.is_null() {
                    return Err(Error::KeyNotFound(key));
                }
                node = backend.read_node(child)?;
            }
        }
    }

    Err(Error::corrupt(
        node.address.0,
        format!("lookup exceeded {} levels", MAX_DEPTH),
    ))
}
