//! In-memory page storage, mostly for tests.

use crate::common::config::PAGE_SIZE;
use crate::common::Result;
use crate::storage::page::Page;
use crate::storage::PageStore;

/// Page storage backed by a growable byte buffer.
///
/// Behaves like a file that was just created: reads past the end come back
/// short, writes past the end grow the buffer and zero-fill any gap.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Vec<u8>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Wrap existing bytes, e.g. a copy of an index file.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Raw contents of the store.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl PageStore for MemoryStore {
    fn read_page(&mut self, offset: u64, page: &mut Page) -> Result<usize> {
        let start = offset as usize;
        if start >= self.data.len() {
            return Ok(0);
        }

        let end = (start + PAGE_SIZE).min(self.data.len());
        let n = end - start;
        page.as_mut_slice()[..n].copy_from_slice(&self.data[start..end]);
        Ok(n)
    }

    fn write_page(&mut self, offset: u64, page: &Page) -> Result<()> {
        let start = offset as usize;
        let end = start + PAGE_SIZE;
        if self.data.len() < end {
            self.data.resize(end, 0);
        }

        self.data[start..end].copy_from_slice(page.as_slice());
        Ok(())
    }

    #[inline]
    fn extent(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_grows_and_zero_fills() {
        let mut store = MemoryStore::new();
        let mut page = Page::new();
        page.as_mut_slice()[3] = 0x11;

        store.write_page(2 * PAGE_SIZE as u64, &page).unwrap();
        assert_eq!(store.extent(), 3 * PAGE_SIZE as u64);
        assert!(store.as_bytes()[..2 * PAGE_SIZE].iter().all(|&b| b == 0));
        assert_eq!(store.as_bytes()[2 * PAGE_SIZE + 3], 0x11);
    }

    #[test]
    fn test_short_reads() {
        let mut store = MemoryStore::from_bytes(vec![0xAA; PAGE_SIZE + 10]);
        let mut page = Page::new();

        assert_eq!(store.read_page(0, &mut page).unwrap(), PAGE_SIZE);
        assert_eq!(store.read_page(PAGE_SIZE as u64, &mut page).unwrap(), 10);
        assert_eq!(store.read_page(4 * PAGE_SIZE as u64, &mut page).unwrap(), 0);
    }
}
