//! Page - the fixed-size unit of storage.
//!
//! A [`Page`] is the raw image of one node: [`PAGE_SIZE`] bytes moved as a
//! whole between a [`PageStore`](crate::storage::PageStore) and the node
//! codec.

use crate::common::config::PAGE_SIZE;

/// The on-disk image of a single node.
///
/// Stores read and write pages whole. A page that is entirely zero is an
/// empty node, which is how reclaimed pages are recognised after a reopen.
///
/// # Example
/// ```
/// use pagedex::storage::page::Page;
///
/// let mut page = Page::new();
/// assert!(page.is_zeroed());
///
/// page.as_mut_slice()[256] = 0x2A;
/// assert!(!page.is_zeroed());
/// ```
#[repr(align(8))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// A zeroed page, i.e. the image of an empty node.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Whether every byte is zero.
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
