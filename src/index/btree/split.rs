//! Median split.
//!
//! Two flavours share the same division rule:
//! - [`split`] rewrites a node in place as a one-key parent over two fresh
//!   pages. This is how the root grows, since it must stay at address 0.
//! - [`split_child`] keeps the lower half in the child's page, moves the
//!   upper half to one fresh page and promotes the median into the parent.

use crate::common::{Error, Result};
use crate::storage::page::{IndexEntry, Node};
use crate::storage::Backend;

use super::batch::{atomically, Batch};

/// Smallest node that has a median with something on both sides.
const MIN_SPLIT_SIZE: usize = 3;

/// Split `node` in place.
///
/// With `median = size / 2`: slots `[0, median)` and pointers `[0, median]`
/// go to a fresh left page; slots `(median, size)` and pointers
/// `[median + 1, size]` go to a fresh right page; `node` is cleared to hold
/// only the median entry over those two pages. Left and right are
/// persisted before `node`.
///
/// # Errors
/// - `Error::UnsplittableNode` if `node` has fewer than three keys
/// - I/O errors from allocation or writes. The store is then left as it
///   was, though `node` may already hold its new contents in memory.
pub fn split<B: Backend>(backend: &mut B, node: &mut Node) -> Result<()> {
    atomically(backend, |batch, backend| {
        batch.track(node);
        split_in(batch, backend, node)
    })
}

/// Stage an in-place split of `node` into `batch`.
pub(crate) fn split_in<B: Backend>(
    batch: &mut Batch,
    backend: &mut B,
    node: &mut Node,
) -> Result<()> {
    check_splittable(node)?;

    let mut left = batch.allocate(backend)?;
    let mut right = batch.allocate(backend)?;
    let median = divide(node, &mut left, &mut right);
    batch.stage(&left);
    batch.stage(&right);

    node.clear();
    node.data[0] = median;
    node.pointers[0] = left.address;
    node.pointers[1] = right.address;
    batch.stage(node);

    tracing::debug!(
        address = %node.address,
        left = %left.address,
        right = %right.address,
        separator = median.key(),
        "split node in place"
    );
    Ok(())
}

/// Stage a split of `child`, found at `parent.pointers[i]`, promoting its
/// median into `parent` at slot `i`.
///
/// `parent` must have a free slot. The upper half goes to a fresh page,
/// which is written before `parent`; the child's own page is rewritten
/// last.
pub(crate) fn split_child<B: Backend>(
    batch: &mut Batch,
    backend: &mut B,
    parent: &mut Node,
    i: usize,
    child: &Node,
) -> Result<()> {
    check_splittable(child)?;
    batch.track(child);

    let mut lower = Node::new(child.address);
    let mut upper = batch.allocate(backend)?;
    let median = divide(child, &mut lower, &mut upper);
    parent.insert_at(i, median, upper.address);

    batch.stage(&upper);
    batch.stage(parent);
    batch.stage(&lower);

    tracing::debug!(
        parent = %parent.address,
        lower = %lower.address,
        upper = %upper.address,
        separator = median.key(),
        "split child"
    );
    Ok(())
}

fn check_splittable(node: &Node) -> Result<()> {
    let size = node.size();
    if size < MIN_SPLIT_SIZE {
        return Err(Error::UnsplittableNode {
            address: node.address.0,
            size,
        });
    }
    Ok(())
}

/// Copy the halves of `node` around its median into the zeroed `left` and
/// `right`, returning the median entry.
fn divide(node: &Node, left: &mut Node, right: &mut Node) -> IndexEntry {
    let size = node.size();
    let median = size / 2;
    let upper = size - median - 1;

    left.data[..median].copy_from_slice(&node.data[..median]);
    left.pointers[..=median].copy_from_slice(&node.pointers[..=median]);

    right.data[..upper].copy_from_slice(&node.data[median + 1..size]);
    right.pointers[..=upper].copy_from_slice(&node.pointers[median + 1..=size]);

    node.data[median]
}
