//! Node codec - fixed binary layout of a node page.
//!
//! # Layout (752 bytes, little-endian)
//! ```text
//! Offset  Size      Field
//! ------  --------  -----
//! 0       8 × 32    pointers[0..32]   (i64 each)
//! 256     16 × 31   data[0..31]       (u64 key, i64 pointer)
//! ```
//!
//! There is no header, checksum or version tag. Encoding and decoding are
//! exact inverses.

use crate::common::config::{ENTRY_SIZE, FANOUT, KEY_SLOTS, PAGE_SIZE, POINTER_SIZE};
use crate::common::PageAddress;

use super::entry::IndexEntry;
use super::node::Node;
use super::page::Page;

/// Offset of the entry array within a page.
pub const OFFSET_DATA: usize = POINTER_SIZE * FANOUT;

const _: () = assert!(OFFSET_DATA + ENTRY_SIZE * KEY_SLOTS == PAGE_SIZE);

impl Node {
    /// Encode this node into a fresh page.
    pub fn to_page(&self) -> Page {
        let mut page = Page::new();
        self.write_to(page.as_mut_slice());
        page
    }

    /// Encode this node into the first [`PAGE_SIZE`] bytes of `buf`.
    ///
    /// # Panics
    /// Panics if `buf.len() < PAGE_SIZE`.
    pub fn write_to(&self, buf: &mut [u8]) {
        assert!(buf.len() >= PAGE_SIZE, "buffer too small for a node page");

        for (i, ptr) in self.pointers.iter().enumerate() {
            let at = i * POINTER_SIZE;
            buf[at..at + 8].copy_from_slice(&ptr.0.to_le_bytes());
        }

        for (i, entry) in self.data.iter().enumerate() {
            let at = OFFSET_DATA + i * ENTRY_SIZE;
            buf[at..at + 8].copy_from_slice(&entry.key().to_le_bytes());
            buf[at + 8..at + 16].copy_from_slice(&entry.pointer().to_le_bytes());
        }
    }

    /// Decode the node stored in `page`, binding it to `address`.
    pub fn from_page(address: PageAddress, page: &Page) -> Self {
        Self::from_bytes(address, page.as_slice())
    }

    /// Decode a node from the first [`PAGE_SIZE`] bytes of `buf`.
    ///
    /// # Panics
    /// Panics if `buf.len() < PAGE_SIZE`.
    pub fn from_bytes(address: PageAddress, buf: &[u8]) -> Self {
        assert!(buf.len() >= PAGE_SIZE, "buffer too small for a node page");

        let mut node = Node::new(address);
        for (i, ptr) in node.pointers.iter_mut().enumerate() {
            *ptr = PageAddress(read_i64(buf, i * POINTER_SIZE));
        }
        for (i, entry) in node.data.iter_mut().enumerate() {
            let at = OFFSET_DATA + i * ENTRY_SIZE;
            *entry = IndexEntry::new(read_u64(buf, at), read_i64(buf, at + 8));
        }
        node
    }
}

#[inline]
fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

#[inline]
fn read_i64(buf: &[u8], at: usize) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    i64::from_le_bytes(bytes)
}

// ============================================================================
// TESTS
// ============================================================================
