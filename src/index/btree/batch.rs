//! Staged page writes for one tree operation.
//!
//! An operation reads through a [`Batch`], edits nodes in memory and stages
//! them. Nothing reaches the store until [`atomically`] commits:
//!
//! ```text
//!   write fresh pages        (nothing points at them yet)
//!   write changed pages      (in staging order, parents after children)
//!   zero-fill freed pages    (only once every write above succeeded)
//! ```
//!
//! If a write fails, every page already written is restored from the
//! image first read, fresh addresses go back to the backend, and the
//! error is returned. The tree is then exactly as before the operation.

use std::collections::HashMap;

use crate::common::{PageAddress, Result};
use crate::storage::page::Node;
use crate::storage::Backend;

/// Pages one operation has read, allocated, changed and freed.
#[derive(Default)]
pub(crate) struct Batch {
    /// Images as first read, for undo.
    originals: HashMap<PageAddress, Node>,
    /// Addresses from `new_node`, in allocation order.
    fresh: Vec<PageAddress>,
    /// Latest image of each changed page, in first-staged order.
    staged: Vec<Node>,
    freed: Vec<PageAddress>,
}

/// Run `op` against a fresh batch and commit what it staged.
///
/// On an error from `op` nothing has been written; fresh addresses are
/// discarded and the error is returned.
pub(crate) fn atomically<B, T, F>(backend: &mut B, op: F) -> Result<T>
where
    B: Backend,
    F: FnOnce(&mut Batch, &mut B) -> Result<T>,
{
    let mut batch = Batch::default();
    match op(&mut batch, backend) {
        Ok(value) => {
            batch.commit(backend)?;
            Ok(value)
        }
        Err(e) => {
            batch.discard_fresh(backend);
            Err(e)
        }
    }
}

impl Batch {
    /// Remember `node` as read from the store.
    pub(crate) fn track(&mut self, node: &Node) {
        self.originals
            .entry(node.address)
            .or_insert_with(|| node.clone());
    }

    /// Read a page, seeing this operation's own staged changes.
    pub(crate) fn read<B: Backend>(
        &mut self,
        backend: &mut B,
        address: PageAddress,
    ) -> Result<Node> {
        if let Some(node) = self.staged.iter().find(|n| n.address == address) {
            return Ok(node.clone());
        }
        let node = backend.read_node(address)?;
        self.track(&node);
        Ok(node)
    }

    pub(crate) fn allocate<B: Backend>(&mut self, backend: &mut B) -> Result<Node> {
        let node = backend.new_node()?;
        self.fresh.push(node.address);
        Ok(node)
    }

    /// Queue the current image of `node` for writing.
    pub(crate) fn stage(&mut self, node: &Node) {
        match self.staged.iter_mut().find(|n| n.address == node.address) {
            Some(slot) => *slot = node.clone(),
            None => self.staged.push(node.clone()),
        }
    }

    /// Reclaim `address` once the batch has committed.
    pub(crate) fn free(&mut self, address: PageAddress) {
        self.staged.retain(|n| n.address != address);
        self.freed.push(address);
    }

    fn commit<B: Backend>(self, backend: &mut B) -> Result<()> {
        let (mut order, rest): (Vec<&Node>, Vec<&Node>) = self
            .staged
            .iter()
            .partition(|n| self.fresh.contains(&n.address));
        order.extend(rest);

        for (done, node) in order.iter().enumerate() {
            if let Err(e) = backend.write_node(node) {
                // The failed page may be torn, so it is restored too.
                self.undo(backend, &order[..=done]);
                return Err(e);
            }
        }

        for &address in &self.freed {
            if let Err(e) = backend.remove_node(address) {
                tracing::warn!(%address, error = %e, "could not reclaim page");
            }
        }
        Ok(())
    }

    fn undo<B: Backend>(&self, backend: &mut B, written: &[&Node]) {
        for node in written.iter().rev() {
            let Some(before) = self.originals.get(&node.address) else {
                continue;
            };
            if let Err(e) = backend.write_node(before) {
                tracing::warn!(address = %node.address, error = %e, "could not restore page");
            }
        }
        self.discard_fresh(backend);
        tracing::debug!(pages = written.len(), "rolled back failed write");
    }

    fn discard_fresh<B: Backend>(&self, backend: &mut B) {
        for &address in self.fresh.iter().rev() {
            backend.discard_node(address);
        }
    }
}
