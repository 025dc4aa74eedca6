//! Structural verification.

use std::collections::HashSet;

use crate::common::config::{MAX_DEPTH, MIN_KEYS};
use crate::common::{Error, PageAddress, Result};
use crate::storage::page::{IndexEntry, Node};
use crate::storage::Backend;

/// Shape of a tree that passed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeSummary {
    /// Number of stored entries.
    pub keys: u64,
    /// Number of pages reachable from the root.
    pub pages: u64,
    /// Number of levels, counting the root.
    pub height: usize,
}

/// One page still to visit, with the open key interval it must fall in.
struct Pending {
    address: PageAddress,
    lower: Option<u64>,
    upper: Option<u64>,
    depth: usize,
}

/// Walk every page reachable from the root and check the tree invariants.
///
/// Checked per page:
/// - keys strictly ascending and inside the bounds set by the parent
/// - nothing stored after the first unused slot
/// - a leaf has no children; an internal node has `size + 1` of them
/// - every non-root node holds at least [`MIN_KEYS`] keys
/// - no page is reachable twice
///
/// and across pages, that every leaf sits at the same depth.
///
/// # Errors
/// `Error::CorruptTree` naming the first offending page.
pub fn verify<B: Backend>(backend: &mut B) -> Result<TreeSummary> {
    let mut summary = TreeSummary::default();
    let mut leaf_depth = None;
    let mut seen = HashSet::new();
    let mut stack = vec![Pending {
        address: PageAddress::ROOT,
        lower: None,
        upper: None,
        depth: 1,
    }];

    while let Some(pending) = stack.pop() {
        let address = pending.address;
        if pending.depth > MAX_DEPTH {
            return Err(Error::corrupt(address.0, "tree deeper than the depth limit"));
        }
        if !seen.insert(address) {
            return Err(Error::corrupt(address.0, "page reachable from two parents"));
        }

        let node = backend.read_node(address)?;
        check_slots(&node, &pending)?;

        let size = node.size();
        let is_root = address == PageAddress::ROOT;
        if !is_root && size < MIN_KEYS {
            return Err(Error::corrupt(
                address.0,
                format!("{} keys, below the minimum of {}", size, MIN_KEYS),
            ));
        }

        summary.keys += size as u64;
        summary.pages += 1;
        summary.height = summary.height.max(pending.depth);

        if node.is_leaf() {
            if node.pointers.iter().any(|p| !p.is_null()) {
                return Err(Error::corrupt(address.0, "leaf with a child pointer"));
            }
            match leaf_depth {
                None => leaf_depth = Some(pending.depth),
                Some(depth) if depth != pending.depth => {
                    return Err(Error::corrupt(
                        address.0,
                        format!("leaf at depth {}, expected {}", pending.depth, depth),
                    ));
                }
                Some(_) => {}
            }
            continue;
        }

        if size == 0 {
            return Err(Error::corrupt(address.0, "internal node without keys"));
        }
        if node.children().iter().any(PageAddress::is_null)
            || node.pointers[size + 1..].iter().any(|p| !p.is_null())
        {
            return Err(Error::corrupt(
                address.0,
                format!("internal node with {} keys needs exactly {} children", size, size + 1),
            ));
        }

        for (i, &child) in node.children().iter().enumerate() {
            let lower = if i == 0 { pending.lower } else { Some(node.data[i - 1].key()) };
            let upper = if i == size { pending.upper } else { Some(node.data[i].key()) };
            stack.push(Pending {
                address: child,
                lower,
                upper,
                depth: pending.depth + 1,
            });
        }
    }

    Ok(summary)
}

fn check_slots(node: &Node, pending: &Pending) -> Result<()> {
    let address = node.address.0;
    let entries = node.entries();

    if node.data[entries.len()..].iter().any(|e| !e.is_zeroed()) {
        return Err(Error::corrupt(address, "entry stored after an unused slot"));
    }

    for pair in entries.windows(2) {
        if pair[0].key() >= pair[1].key() {
            return Err(Error::corrupt(
                address,
                format!("keys {} and {} out of order", pair[0].key(), pair[1].key()),
            ));
        }
    }

    let out_of_bounds = |entry: &IndexEntry| {
        pending.lower.is_some_and(|lo| entry.key() <= lo)
            || pending.upper.is_some_and(|hi| entry.key() >= hi)
    };
    if let Some(entry) = entries.iter().find(|e| out_of_bounds(*e)) {
        return Err(Error::corrupt(
            address,
            format!("key {} outside the range its parent allows", entry.key()),
        ));
    }
    Ok(())
}
