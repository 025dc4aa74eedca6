//! Deletion with borrow/merge rebalancing.
//!
//! The walk down records every parent together with the child slot taken,
//! so underflow can be repaired bottom-up without re-reading the path:
//!
//! ```text
//!   underflow at child c (index i in parent p)
//!     left sibling has spare  → rotate right through p.data[i-1]
//!     right sibling has spare → rotate left through p.data[i]
//!     otherwise               → merge with a sibling, p loses a key,
//!                               repeat one level up
//!   root left with no keys but one child → copy child into root, free it
//! ```
//!
//! Every change is staged and applied in one batch. Absorbed pages are
//! only zero-filled after the parents that dropped them have been written.

use crate::common::config::{MAX_DEPTH, MIN_KEYS};
use crate::common::{Error, PageAddress, Result};
use crate::storage::page::{IndexEntry, Node, Slot};
use crate::storage::Backend;

use super::batch::{atomically, Batch};

/// A node on the path from the root, with the child slot that was followed.
type Path = Vec<(Node, usize)>;

/// Remove `key` from the tree whose root is `root`.
///
/// Returns the entry that was stored. On any error the store is left as
/// it was.
///
/// # Errors
/// - `Error::KeyNotFound` if the key is not stored
/// - `Error::CorruptTree` on a path longer than [`MAX_DEPTH`] or an empty
///   non-root node
pub fn remove<B: Backend>(backend: &mut B, root: Node, key: u64) -> Result<IndexEntry> {
    if key == 0 {
        return Err(Error::KeyNotFound(key));
    }

    let removed = atomically(backend, |batch, backend| {
        batch.track(&root);
        remove_in(batch, backend, root, key)
    })?;
    tracing::trace!(key, "removed entry");
    Ok(removed)
}

fn remove_in<B: Backend>(
    batch: &mut Batch,
    backend: &mut B,
    root: Node,
    key: u64,
) -> Result<IndexEntry> {
    let mut path: Path = Vec::new();
    let mut node = root;
    let slot = loop {
        match node.locate(key) {
            Slot::Found(i) => break i,
            Slot::Descend(i) => {
                let child = node.pointers[i];
                if child.is_null() {
                    return Err(Error::KeyNotFound(key));
                }
                let next = read_below(batch, backend, child, path.len())?;
                path.push((node, i));
                node = next;
            }
        }
    };

    let removed = node.data[slot];
    let leaf = if node.is_leaf() {
        node.remove_at(slot);
        node
    } else {
        take_predecessor(batch, backend, &mut path, node, slot)?
    };

    rebalance(batch, backend, path, leaf)?;
    Ok(removed)
}

/// Replace `node.data[slot]` with the largest key of its left subtree and
/// return the leaf that key was taken from.
fn take_predecessor<B: Backend>(
    batch: &mut Batch,
    backend: &mut B,
    path: &mut Path,
    node: Node,
    slot: usize,
) -> Result<Node> {
    let holder = path.len();
    let mut next = read_below(batch, backend, node.pointers[slot], path.len())?;
    path.push((node, slot));

    while !next.is_leaf() {
        let last = next.size();
        let child = read_below(batch, backend, next.pointers[last], path.len())?;
        path.push((next, last));
        next = child;
    }

    if next.size() == 0 {
        return Err(Error::corrupt(next.address.0, "empty leaf below an internal node"));
    }

    let (predecessor, _) = next.pop_back();
    let owner = &mut path[holder].0;
    owner.data[slot] = predecessor;
    batch.stage(owner);
    Ok(next)
}

fn read_below<B: Backend>(
    batch: &mut Batch,
    backend: &mut B,
    address: PageAddress,
    depth: usize,
) -> Result<Node> {
    if depth >= MAX_DEPTH {
        return Err(Error::corrupt(
            address.0,
            format!("delete path exceeded {} levels", MAX_DEPTH),
        ));
    }
    batch.read(backend, address)
}

/// Stage `node` and repair any underflow on the way back to the root.
fn rebalance<B: Backend>(
    batch: &mut Batch,
    backend: &mut B,
    mut path: Path,
    mut node: Node,
) -> Result<()> {

    while let Some((mut parent, i)) = path.pop() {
        if node.size() >= MIN_KEYS {
            batch.stage(&node);
            return Ok(());
        }

        let mut left = None;
        if i > 0 {
            let mut sibling = batch.read(backend, parent.pointers[i - 1])?;
            if sibling.size() > MIN_KEYS {
                let (entry, child) = sibling.pop_back();
                node.push_front(parent.data[i - 1], child);
                parent.data[i - 1] = entry;
                stage_rotation(batch, &sibling, &node, &parent);
                return Ok(());
            }
            left = Some(sibling);
        }

        let mut right = None;
        if i < parent.size() {
            let mut sibling = batch.read(backend, parent.pointers[i + 1])?;
            if sibling.size() > MIN_KEYS {
                let (entry, child) = sibling.pop_front();
                node.push_back(parent.data[i], child);
                parent.data[i] = entry;
                stage_rotation(batch, &sibling, &node, &parent);
                return Ok(());
            }
            right = Some(sibling);
        }

        match (left, right) {
            (Some(mut left), _) => {
                let (separator, _) = parent.remove_at(i - 1);
                merge(&mut left, separator, &node);
                batch.stage(&left);
                batch.free(node.address);
                tracing::debug!(
                    into = %left.address,
                    freed = %node.address,
                    "merged with left sibling"
                );
            }
            (None, Some(right)) => {
                let (separator, _) = parent.remove_at(i);
                merge(&mut node, separator, &right);
                batch.stage(&node);
                batch.free(right.address);
                tracing::debug!(
                    into = %node.address,
                    freed = %right.address,
                    "merged with right sibling"
                );
            }
            (None, None) => {
                return Err(Error::corrupt(parent.address.0, "internal node without children"));
            }
        }

        node = parent;
    }

    // `node` is the root.
    if node.size() == 0 && !node.is_leaf() {
        let child = batch.read(backend, node.pointers[0])?;
        node.copy_contents(&child);
        batch.stage(&node);
        batch.free(child.address);
        tracing::debug!(freed = %child.address, "collapsed root, tree height reduced");
        return Ok(());
    }

    batch.stage(&node);
    Ok(())
}

/// Append `separator` and all of `right` to `left`.
fn merge(left: &mut Node, separator: IndexEntry, right: &Node) {
    left.push_back(separator, right.pointers[0]);
    for (entry, &child) in right.entries().iter().zip(&right.pointers[1..]) {
        left.push_back(*entry, child);
    }
}

fn stage_rotation(batch: &mut Batch, sibling: &Node, node: &Node, parent: &Node) {
    batch.stage(sibling);
    batch.stage(node);
    batch.stage(parent);
    tracing::trace!(address = %node.address, "borrowed from sibling");
}
