//! Page address type.

use std::fmt;

use crate::common::config::PAGE_SIZE;

/// Byte offset of a page in the backing store.
///
/// Page `n` lives at `n × PAGE_SIZE`. The same type doubles as a child
/// pointer inside a node, where [`PageAddress::NULL`] means "no child".
/// The root always sits at offset 0 and is never a child, so the two uses
/// of zero never collide.
///
/// # Example
/// ```
/// use pagedex::{PageAddress, PAGE_SIZE};
///
/// let addr = PageAddress::from_index(3);
/// assert!(addr.is_valid());
/// assert_eq!(addr.0, 3 * PAGE_SIZE as i64);
/// assert_eq!(addr.index(), Some(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PageAddress(pub i64);

impl PageAddress {
    /// The root page.
    pub const ROOT: PageAddress = PageAddress(0);

    /// Child pointer value meaning "no child".
    pub const NULL: PageAddress = PageAddress(0);

    /// Create a new PageAddress from a raw byte offset.
    #[inline]
    pub fn new(offset: i64) -> Self {
        PageAddress(offset)
    }

    /// Address of the `index`-th page.
    #[inline]
    pub fn from_index(index: u64) -> Self {
        PageAddress((index * PAGE_SIZE as u64) as i64)
    }

    /// Check that this is a non-negative multiple of the page size.
    #[inline]
    pub fn is_valid(&self) -> bool {
        is_valid_address(self.0)
    }

    /// Whether this is the "no child" pointer.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Page number for a valid address.
    pub fn index(&self) -> Option<u64> {
        self.is_valid().then(|| self.0 as u64 / PAGE_SIZE as u64)
    }

    /// Byte offset for a valid address.
    pub fn offset(&self) -> Option<u64> {
        self.is_valid().then_some(self.0 as u64)
    }
}

/// `true` iff `address >= 0` and `address` is a multiple of [`PAGE_SIZE`].
#[inline]
pub fn is_valid_address(address: i64) -> bool {
    address >= 0 && address % PAGE_SIZE as i64 == 0
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "Page({} @ {})", index, self.0),
            None => write!(f, "Page(INVALID @ {})", self.0),
        }
    }
}
