//! Storage medium abstraction.

use crate::common::Result;
use crate::storage::page::Page;

/// A byte-addressed medium that holds fixed-size pages.
///
/// Implementations only move bytes. Address validation, the node codec and
/// allocation policy live in [`Pager`](crate::storage::Pager), so every
/// medium behaves identically above this trait.
pub trait PageStore {
    /// Read up to one page starting at `offset` into `page`.
    ///
    /// Returns the number of bytes read; fewer than
    /// [`PAGE_SIZE`](crate::PAGE_SIZE) means the store ended early.
    fn read_page(&mut self, offset: u64, page: &mut Page) -> Result<usize>;

    /// Write a whole page at `offset`, growing the store if needed.
    fn write_page(&mut self, offset: u64, page: &Page) -> Result<()>;

    /// Current size of the store in bytes.
    fn extent(&self) -> u64;

    /// Flush buffered writes to durable storage.
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}
